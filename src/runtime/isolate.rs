/*!
 * Isolate Runtime
 * Small in-process interpreter implementing the runtime seam
 *
 * Values are plain data plus procs backed by Rust closures. Each `Isolate`
 * holds at most one uncaught exception, like an embedded interpreter state.
 */

use super::{Interpreter, ScriptRuntime};
use crate::core::errors::{SignalError, SignalResult};
use crate::signals::SigInfoSnapshot;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

static NEXT_ISOLATE_ID: AtomicU64 = AtomicU64::new(1);

/// Body of a proc. `Err` carries the raised exception value.
pub type ProcFn = Arc<dyn Fn(&mut Isolate, &[Value]) -> Result<Value, Value> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcKind {
    /// User-level block
    Block,
    /// Native function pointer
    Native,
}

#[derive(Clone)]
pub struct Proc {
    kind: ProcKind,
    body: ProcFn,
}

impl Proc {
    pub fn kind(&self) -> ProcKind {
        self.kind
    }
}

impl fmt::Debug for Proc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Proc {:?}>", self.kind)
    }
}

impl PartialEq for Proc {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && Arc::ptr_eq(&self.body, &other.body)
    }
}

/// Isolate value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    Symbol(String),
    Array(Vec<Value>),
    Exception { class: String, message: String },
    SigInfo(SigInfoSnapshot),
    Proc(Proc),
}

impl Value {
    /// Block proc; return `Err(exception)` to raise
    pub fn block<F>(body: F) -> Self
    where
        F: Fn(&mut Isolate, &[Value]) -> Result<Value, Value> + Send + Sync + 'static,
    {
        Value::Proc(Proc {
            kind: ProcKind::Block,
            body: Arc::new(body),
        })
    }

    pub fn native(f: fn(&[Value]) -> Value) -> Self {
        Value::Proc(Proc {
            kind: ProcKind::Native,
            body: Arc::new(move |_, args| Ok(f(args))),
        })
    }

    pub fn exception(class: &str, message: impl Into<String>) -> Self {
        Value::Exception {
            class: class.to_string(),
            message: message.into(),
        }
    }

    pub fn symbol(name: &str) -> Self {
        Value::Symbol(name.to_string())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_siginfo(&self) -> Option<&SigInfoSnapshot> {
        match self {
            Value::SigInfo(info) => Some(info),
            _ => None,
        }
    }

    /// Class and message of an exception value
    pub fn as_exception(&self) -> Option<(&str, &str)> {
        match self {
            Value::Exception { class, message } => Some((class, message)),
            _ => None,
        }
    }
}

/// One interpreter instance
#[derive(Debug)]
pub struct Isolate {
    id: u64,
    exception: Option<Value>,
}

impl Isolate {
    pub fn new() -> Self {
        Self {
            id: NEXT_ISOLATE_ID.fetch_add(1, Ordering::Relaxed),
            exception: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn take_exception(&mut self) -> Option<Value> {
        self.exception.take()
    }

    /// Turn a crate error into the exception a block should raise
    ///
    /// `Raised` hands back the exception already held by this isolate.
    pub fn rescue(&mut self, error: SignalError) -> Value {
        if error == SignalError::Raised {
            if let Some(exception) = self.exception.take() {
                return exception;
            }
        }
        exception_for(&error)
    }
}

impl Default for Isolate {
    fn default() -> Self {
        Self::new()
    }
}

fn exception_for(error: &SignalError) -> Value {
    let class = match error {
        SignalError::InvalidArgument(_) => "ArgumentError",
        SignalError::Runtime { .. } | SignalError::Raised => "RuntimeError",
    };
    let message = match error {
        SignalError::InvalidArgument(msg) => msg.clone(),
        other => other.to_string(),
    };
    Value::exception(class, message)
}

impl Interpreter for Isolate {
    type Value = Value;

    fn call(&mut self, callable: &Value, args: &[Value]) -> Option<Value> {
        self.exception = None;
        let body = match callable {
            Value::Proc(proc) => Arc::clone(&proc.body),
            other => {
                self.exception = Some(Value::exception(
                    "NoMethodError",
                    format!("undefined method 'call' for {:?}", other),
                ));
                return None;
            }
        };

        match body(self, args) {
            Ok(value) => Some(value),
            Err(exception) => {
                trace!(isolate = self.id, ?exception, "Callable raised");
                self.exception = Some(exception);
                None
            }
        }
    }

    fn is_block(&self, callable: &Value) -> bool {
        matches!(callable, Value::Proc(proc) if proc.kind == ProcKind::Block)
    }

    fn exception(&self) -> Option<&Value> {
        self.exception.as_ref()
    }

    fn raise(&mut self, error: &SignalError) {
        self.exception = Some(exception_for(error));
    }

    fn migrate(&self, value: &Value, target: &mut Isolate) -> Value {
        trace!(from = self.id, to = target.id, "Migrating value");
        value.clone()
    }

    fn symbol(&mut self, name: &str) -> Value {
        Value::symbol(name)
    }

    fn siginfo(&mut self, info: SigInfoSnapshot) -> Value {
        Value::SigInfo(info)
    }

    fn close(self) {
        trace!(isolate = self.id, "Closing isolate");
    }
}

/// Opens a fresh `Isolate` per worker
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolateRuntime;

impl ScriptRuntime for IsolateRuntime {
    type Interpreter = Isolate;

    fn open(&self) -> SignalResult<Isolate> {
        Ok(Isolate::new())
    }
}
