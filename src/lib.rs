/*!
 * Signal Thread Library
 * OS threads that wait on POSIX signals and run script callbacks, plus
 * controller-side lifecycle handles (kill, cancel, join, exception handoff)
 *
 * Each worker owns an isolated interpreter opened through the
 * [`runtime::ScriptRuntime`] seam; values cross between interpreters only by
 * explicit migration.
 */

pub mod core;
pub mod monitoring;
pub mod runtime;
pub mod signals;
pub mod thread;

// Re-exports
pub use crate::core::errors::{SignalError, SignalResult};
pub use crate::core::types::{Pid, RawThreadId, SignalNumber};
pub use monitoring::init_tracing;
pub use runtime::{Interpreter, Isolate, IsolateRuntime, ScriptRuntime, Value};
pub use signals::{
    mask, resolve, stats, wait, waitinfo, MaskController, SigInfoSnapshot, SignalId, SignalStats,
    SignalTable, WaitEngine,
};
pub use thread::{kill_by_thread_id, queue, SignalThread, SignalThreadBuilder, ThreadConfig};
