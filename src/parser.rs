//! The reader: consumes the lexer's token stream and produces one [`Value`]
//! AST node per top-level form. The AST alphabet is the same [`Value`] type
//! the evaluator manipulates.

use nom::branch::alt;
use nom::character::complete::{char, digit1};
use nom::combinator::{opt, recognize};
use nom::sequence::tuple;
use nom::IResult;

use crate::error::LispError;
use crate::lexer::Token;
use crate::value::{new_list, Value};

/// Reads successive top-level forms from a flat token stream, one at a time.
pub struct Reader<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Reader { tokens, pos: 0 }
    }

    /// True once every token has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    /// Read one top-level form, or `None` if the stream is exhausted.
    pub fn read(&mut self) -> Result<Option<Value>, LispError> {
        if self.at_end() {
            return Ok(None);
        }
        self.read_form().map(Some)
    }

    fn read_form(&mut self) -> Result<Value, LispError> {
        match self.advance() {
            Some(Token::Quote) => {
                let inner = self.read_form()?;
                Ok(Value::List(new_list(vec![
                    Value::Symbol("quote".to_string()),
                    inner,
                ])))
            }
            Some(Token::LParen) => self.read_list(),
            Some(Token::RParen) => Err(LispError::UnexpectedCloseParen),
            Some(Token::String(s)) => Ok(Value::Str(s)),
            Some(Token::Atom(atom)) => Ok(atom_to_value(&atom)),
            None => Err(LispError::UnexpectedEof),
        }
    }

    fn read_list(&mut self) -> Result<Value, LispError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RParen) => {
                    self.advance();
                    return Ok(Value::List(new_list(items)));
                }
                None => return Err(LispError::MissingCloseParen),
                _ => items.push(self.read_form()?),
            }
        }
    }
}

/// Every top-level form in a token stream, read eagerly. A convenience for
/// tests and for embedders that want the whole program parsed up front.
pub fn read_all(tokens: &[Token]) -> Result<Vec<Value>, LispError> {
    let mut reader = Reader::new(tokens);
    let mut forms = Vec::new();
    while let Some(form) = reader.read()? {
        forms.push(form);
    }
    Ok(forms)
}

fn atom_to_value(atom: &str) -> Value {
    match atom {
        "nil" => Value::nil(),
        "t" => Value::Bool(true),
        _ => match parse_number(atom) {
            Some(n) => Value::Number(n),
            None => Value::Symbol(atom.to_string()),
        },
    }
}

/// Recognizes a numeric literal with `nom`, the same combinator family the
/// original string-based reader used for its float/int recognizers,
/// collapsed onto this crate's single `f64` numeric tower.
fn recognize_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(alt((char('+'), char('-')))),
        digit1,
        opt(tuple((char('.'), digit1))),
    )))(input)
}

fn parse_number(input: &str) -> Option<f64> {
    let (remaining, text) = recognize_number(input).ok()?;
    if !remaining.is_empty() {
        return None;
    }
    text.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn read_one(src: &str) -> Value {
        let tokens = tokenize(src).expect("lex failed");
        Reader::new(&tokens).read().expect("read failed").expect("no form")
    }

    #[test]
    fn reads_numbers_and_symbols() {
        assert_eq!(read_one("42"), Value::Number(42.0));
        assert_eq!(read_one("-3.5"), Value::Number(-3.5));
        assert_eq!(read_one("foo-bar"), Value::Symbol("foo-bar".to_string()));
    }

    #[test]
    fn reads_nil_and_t() {
        assert_eq!(read_one("nil"), Value::nil());
        assert_eq!(read_one("t"), Value::Bool(true));
    }

    #[test]
    fn reads_nested_list() {
        let v = read_one("(one two (f 3))");
        match v {
            Value::List(items) => {
                let items = items.borrow();
                assert_eq!(items.len(), 3);
                assert_eq!(items[0], Value::Symbol("one".to_string()));
                match &items[2] {
                    Value::List(inner) => assert_eq!(inner.borrow().len(), 2),
                    _ => panic!("expected nested list"),
                }
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn quote_sugar_expands() {
        let v = read_one("'a");
        match v {
            Value::List(items) => {
                let items = items.borrow();
                assert_eq!(items[0], Value::Symbol("quote".to_string()));
                assert_eq!(items[1], Value::Symbol("a".to_string()));
            }
            _ => panic!("expected (quote a)"),
        }
    }

    #[test]
    fn missing_close_paren_errors() {
        let tokens = tokenize("(1 2").unwrap();
        assert_eq!(read_all(&tokens), Err(LispError::MissingCloseParen));
    }

    #[test]
    fn unexpected_close_paren_errors() {
        let tokens = tokenize(")").unwrap();
        assert_eq!(read_all(&tokens), Err(LispError::UnexpectedCloseParen));
    }
}
