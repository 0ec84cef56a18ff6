/*!
 * Script Runtime Seam
 * What the signal threads need from the embedding interpreter
 */

pub mod isolate;

use crate::core::errors::{SignalError, SignalResult};
use crate::signals::SigInfoSnapshot;

pub use isolate::{Isolate, IsolateRuntime, Proc, ProcKind, Value};

/// One isolated interpreter instance
///
/// Instances never share state. A value produced by one instance reaches
/// another only through [`Interpreter::migrate`].
pub trait Interpreter: Send + 'static {
    type Value: Send + 'static;

    /// Run `callable(args...)`; `None` means it raised and the exception is
    /// now held by this instance.
    fn call(&mut self, callable: &Self::Value, args: &[Self::Value]) -> Option<Self::Value>;

    /// Whether `callable` is a user-level block that can be preempted at safe
    /// points, as opposed to a native function.
    fn is_block(&self, callable: &Self::Value) -> bool;

    /// Uncaught exception currently held by this instance
    fn exception(&self) -> Option<&Self::Value>;

    /// Record a crate error as this instance's pending exception
    fn raise(&mut self, error: &SignalError);

    /// Copy `value`, owned by `self`, into `target`
    fn migrate(&self, value: &Self::Value, target: &mut Self) -> Self::Value;

    fn symbol(&mut self, name: &str) -> Self::Value;

    /// Wrap a delivered signal's metadata for a callback
    fn siginfo(&mut self, info: SigInfoSnapshot) -> Self::Value;

    /// Release the instance
    fn close(self)
    where
        Self: Sized;
}

/// Factory for isolated interpreter instances
pub trait ScriptRuntime: Send + Sync {
    type Interpreter: Interpreter;

    fn open(&self) -> SignalResult<Self::Interpreter>;
}
