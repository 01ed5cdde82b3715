//! Contains [`Environment`], the chained-frame binding store for the interpreter.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::builtins;
use crate::error::LispError;
use crate::value::Value;

#[derive(Debug)]
struct Frame {
    bindings: HashMap<String, Value>,
    parent: Option<Environment>,
}

/// The output buffer and host-supplied `read-line` callback.
///
/// Shared by every frame in one environment chain (one `evaluate()` call),
/// not per-frame: `print`/`prin1`/`format` append to the same buffer no
/// matter how deep the active scope is, and `read-line` always calls the
/// one callback the embedder installed on the root.
struct IoState {
    output: RefCell<Vec<String>>,
    input: RefCell<Option<Box<dyn FnMut() -> String>>>,
}

impl fmt::Debug for IoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoState")
            .field("output_lines", &self.output.borrow().len())
            .field("has_input_provider", &self.input.borrow().is_some())
            .finish()
    }
}

/// A reference-counted handle to one frame in the environment chain.
///
/// Cloning an `Environment` is cheap — it shares the same frame and the same
/// I/O state — which is how a [`crate::value::Lambda`] closes over the scope
/// active when it was created, independent of whichever frame happens to be
/// executing later.
#[derive(Debug, Clone)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
    io: Rc<IoState>,
}

impl Environment {
    /// Build the root environment: the builtins library plus an empty user layer,
    /// with a fresh (empty) output buffer and no input provider configured.
    pub fn root() -> Self {
        Environment {
            frame: Rc::new(RefCell::new(Frame {
                bindings: builtins::builtins_table(),
                parent: None,
            })),
            io: Rc::new(IoState {
                output: RefCell::new(Vec::new()),
                input: RefCell::new(None),
            }),
        }
    }

    /// Install the host-supplied `read-line` callback for this environment chain.
    pub fn set_input_provider(&self, provider: Box<dyn FnMut() -> String>) {
        *self.io.input.borrow_mut() = Some(provider);
    }

    /// Call the installed `read-line` callback, or error if none is configured.
    pub fn read_line(&self) -> Result<String, LispError> {
        match self.io.input.borrow_mut().as_mut() {
            Some(provider) => Ok(provider()),
            None => Err(LispError::NoInputProvider),
        }
    }

    /// Append one line to the output buffer (one call = one line, even if
    /// the line itself contains embedded newlines).
    pub fn emit(&self, line: String) {
        self.io.output.borrow_mut().push(line);
    }

    /// The output buffer joined by newlines, for a successful `evaluate()` call.
    pub fn output(&self) -> String {
        self.io.output.borrow().join("\n")
    }

    /// Remove and return every line emitted since the last drain. Used by the
    /// REPL to print output incrementally, form by form.
    pub fn drain_output(&self) -> Vec<String> {
        self.io.output.borrow_mut().drain(..).collect()
    }

    /// Create a child frame with the given initial bindings, chained to `self`.
    pub fn child(&self, bindings: HashMap<String, Value>) -> Self {
        Environment {
            frame: Rc::new(RefCell::new(Frame {
                bindings,
                parent: Some(self.clone()),
            })),
            io: Rc::clone(&self.io),
        }
    }

    /// Create an empty child frame.
    pub fn child_empty(&self) -> Self {
        self.child(HashMap::new())
    }

    /// Look up a symbol, walking outward through ancestor frames.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.frame.borrow().bindings.get(name) {
            return Some(v.clone());
        }
        let parent = self.frame.borrow().parent.clone();
        parent.and_then(|p| p.get(name))
    }

    /// Bind `name` in this frame, overwriting any existing binding here.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.frame.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Mirror a binding into the root frame, in addition to wherever else it
    /// was bound. `defun`, `setq`, and `setf`-on-symbol all do this — a
    /// lambda captured in a nested frame can later call a helper that was
    /// `defun`-ed globally mid-execution.
    pub fn define_global(&self, name: impl Into<String>, value: Value) {
        self.root_frame().define(name, value);
    }

    /// Look a symbol up starting at the root frame only, bypassing any local
    /// shadowing. Used by `funcall`/`mapcar` to resolve a function passed by
    /// name, per the spec's "a symbol naming one in the root environment".
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.root_frame().get(name)
    }

    fn root_frame(&self) -> Environment {
        let mut frame = self.clone();
        loop {
            let parent = frame.frame.borrow().parent.clone();
            match parent {
                Some(p) => frame = p,
                None => return frame,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_sees_parent_bindings() {
        let root = Environment::root();
        root.define("x", Value::Number(1.0));
        let child = root.child_empty();
        assert_eq!(child.get("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn child_shadows_without_mutating_parent() {
        let root = Environment::root();
        root.define("x", Value::Number(1.0));
        let child = root.child_empty();
        child.define("x", Value::Number(2.0));
        assert_eq!(child.get("x"), Some(Value::Number(2.0)));
        assert_eq!(root.get("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn define_global_mirrors_into_root() {
        let root = Environment::root();
        let child = root.child_empty();
        child.define_global("y", Value::Number(3.0));
        assert_eq!(root.get("y"), Some(Value::Number(3.0)));
    }

    #[test]
    fn closure_survives_defining_frame() {
        // A lambda captured inside a child frame keeps working even though
        // nothing in the child frame itself is still "active".
        let root = Environment::root();
        let child = root.child_empty();
        child.define("captured", Value::Number(42.0));
        let closed_over = child.clone();
        drop(child);
        assert_eq!(closed_over.get("captured"), Some(Value::Number(42.0)));
    }

    #[test]
    fn output_buffer_is_shared_across_child_frames() {
        let root = Environment::root();
        let child = root.child_empty();
        child.emit("line one".to_string());
        root.emit("line two".to_string());
        assert_eq!(root.output(), "line one\nline two");
    }

    #[test]
    fn read_line_without_provider_errors() {
        let root = Environment::root();
        assert_eq!(root.read_line(), Err(LispError::NoInputProvider));
    }
}
