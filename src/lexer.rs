//! Tokenizes input into a flat stream the reader consumes.

use crate::error::LispError;

/// One lexical token. Whitespace is consumed but never emitted; `;` comments
/// run to end-of-line and are dropped entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `'`, handled structurally by the reader rather than carrying a value.
    Quote,
    /// A `"..."` literal with its surrounding quotes stripped and escapes resolved.
    String(String),
    /// A maximal run of non-whitespace, non-paren, non-quote characters.
    Atom(String),
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '"' | ';')
}

/// Turn a source string into a vector of tokens.
///
/// The only failure mode is an unterminated string literal.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LispError> {
    let mut chars = input.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '\'' => {
                chars.next();
                tokens.push(Token::Quote);
            }
            '"' => {
                chars.next();
                tokens.push(Token::String(read_string_body(&mut chars)?));
            }
            _ => {
                let mut atom = String::new();
                while let Some(&c) = chars.peek() {
                    if is_delimiter(c) {
                        break;
                    }
                    atom.push(c);
                    chars.next();
                }
                tokens.push(Token::Atom(atom));
            }
        }
    }

    Ok(tokens)
}

/// Consumes characters up to and including the closing `"`, resolving
/// `\x` escapes by dropping the backslash and keeping `x` verbatim.
fn read_string_body(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<String, LispError> {
    let mut s = String::new();
    loop {
        match chars.next() {
            Some('"') => return Ok(s),
            Some('\\') => match chars.next() {
                Some(escaped) => s.push(escaped),
                None => return Err(LispError::UnterminatedString),
            },
            Some(c) => s.push(c),
            None => return Err(LispError::UnterminatedString),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_s_expr() {
        let toks = tokenize("(+ a b-c)").expect("lex failed");
        assert_eq!(
            toks,
            vec![
                Token::LParen,
                Token::Atom("+".into()),
                Token::Atom("a".into()),
                Token::Atom("b-c".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn lex_comment_is_dropped() {
        let toks = tokenize("1 ; this is a comment\n2").expect("lex failed");
        assert_eq!(toks, vec![Token::Atom("1".into()), Token::Atom("2".into())]);
    }

    #[test]
    fn lex_string_with_escape() {
        let toks = tokenize(r#""str\"ing""#).expect("lex failed");
        assert_eq!(toks, vec![Token::String("str\"ing".into())]);
    }

    #[test]
    fn unterminated_string_errors() {
        assert_eq!(tokenize("\"abc"), Err(LispError::UnterminatedString));
    }

    #[test]
    fn quote_is_its_own_token() {
        let toks = tokenize("'(1 2)").unwrap();
        assert_eq!(toks[0], Token::Quote);
    }
}
