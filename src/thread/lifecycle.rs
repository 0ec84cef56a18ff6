/*!
 * Lifecycle Controller
 * Controller-side handle over a spawned worker
 *
 * Every accessor takes the context lock, checks the phase and acts while still
 * holding it, so a handle never signals a thread id that cancel or join is
 * about to invalidate. The only exception is `cancel` itself, which must
 * release the lock before joining.
 */

use super::builder::SignalThreadBuilder;
use super::context::{Outcome, Phase, ThreadContext};
use crate::core::errors::{check_libc, check_pthread, SignalError, SignalResult};
use crate::core::limits::CANCELED_SYMBOL;
use crate::core::types::{Pid, RawThread, RawThreadId, SignalNumber};
use crate::runtime::{Interpreter, ScriptRuntime};
use crate::signals::{ffi, resolve, MaskController, SignalId, SignalTable, STATS};
use nix::errno::Errno;
use std::ptr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handle to a worker thread running in its own interpreter
///
/// Handles are cheap to clone; all clones share one context. The worker's
/// interpreter is closed by `cancel`, or when the last handle is dropped after
/// the worker finished.
pub struct SignalThread<I: Interpreter> {
    context: Arc<ThreadContext<I>>,
}

impl<I: Interpreter> Clone for SignalThread<I> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
        }
    }
}

impl<I: Interpreter> std::fmt::Debug for SignalThread<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.context.lock();
        f.debug_struct("SignalThread")
            .field("context", &self.context.id())
            .field("phase", &state.phase)
            .finish()
    }
}

impl<I: Interpreter> SignalThread<I> {
    pub(crate) fn from_context(context: Arc<ThreadContext<I>>) -> Self {
        Self { context }
    }

    /// Builder for configured spawns
    pub fn builder() -> SignalThreadBuilder {
        SignalThreadBuilder::new()
    }

    /// Run `callable(args...)` on a new worker with default settings
    pub fn spawn<R>(
        runtime: &R,
        host: &I,
        callable: &I::Value,
        args: &[I::Value],
    ) -> SignalResult<Self>
    where
        R: ScriptRuntime<Interpreter = I>,
    {
        SignalThreadBuilder::new().spawn(runtime, host, callable, args)
    }

    /// Run `callback(args...)` on a new worker for every delivery of `signal`
    pub fn trap<R>(
        runtime: &R,
        host: &I,
        signal: impl Into<SignalId>,
        callback: &I::Value,
        args: &[I::Value],
    ) -> SignalResult<Self>
    where
        R: ScriptRuntime<Interpreter = I>,
    {
        SignalThreadBuilder::new().trap(runtime, host, signal, callback, args)
    }

    /// Identifier of the shared context, stable for the handle's lifetime
    pub fn context_id(&self) -> u64 {
        self.context.id()
    }

    /// Send `signal` to the worker and return its current result
    ///
    /// The result is read right after sending, so it does not reflect what
    /// the signal causes. `None` once the worker is torn down or joined.
    pub fn kill(
        &self,
        host: &mut I,
        signal: impl Into<SignalId>,
    ) -> SignalResult<Option<I::Value>> {
        let signal = resolve(signal)?;
        let state = self.context.lock();
        let thread = match (state.phase, state.thread) {
            (Phase::Running | Phase::Finished, Some(thread)) => thread,
            _ => return Ok(None),
        };

        match unsafe { libc::pthread_kill(thread.0, signal) } {
            0 => {}
            // Exited but not yet joined
            libc::ESRCH => warn!(context = self.context.id(), "Worker already exited"),
            rc => return Err(SignalError::os("pthread_kill", Errno::from_raw(rc))),
        }
        STATS.inc_kills();
        debug!(
            context = self.context.id(),
            signal = %SignalTable::describe(signal),
            "Signal sent to worker"
        );

        Ok(state.outcome_in(host))
    }

    /// Opaque OS thread token for [`kill_by_thread_id`]
    pub fn thread_id(&self) -> Option<RawThreadId> {
        let state = self.context.lock();
        match state.phase {
            Phase::Running | Phase::Finished => state.thread.map(RawThread::as_raw_id),
            Phase::Canceling | Phase::Closed => None,
        }
    }

    /// Whether the worker holds an uncaught exception
    pub fn failed(&self) -> Option<bool> {
        let state = self.context.lock();
        match state.phase {
            Phase::Closed => None,
            Phase::Running | Phase::Canceling => Some(false),
            Phase::Finished => Some(
                state
                    .interpreter
                    .as_ref()
                    .is_some_and(|worker| worker.exception().is_some()),
            ),
        }
    }

    /// The worker's uncaught exception, migrated into `host`
    pub fn exception(&self, host: &mut I) -> Option<I::Value> {
        let state = self.context.lock();
        if state.phase != Phase::Finished {
            return None;
        }
        let worker = state.interpreter.as_ref()?;
        worker
            .exception()
            .map(|exception| worker.migrate(exception, host))
    }

    /// Whether the worker thread is still executing
    pub fn is_alive(&self) -> bool {
        self.context.lock().is_alive()
    }

    /// Forcibly terminate a running worker and close its interpreter
    ///
    /// Returns the `canceled` symbol, or `None` when there is nothing left
    /// to cancel. A worker blocked in a signal wait is terminated at once;
    /// otherwise at its next cancellation point.
    ///
    /// The calling thread's whole signal mask is cleared, not only the signal
    /// this worker trapped. Masks installed for other traps on the same
    /// thread are lost, though those workers keep running.
    pub fn cancel(&self, host: &mut I) -> SignalResult<Option<I::Value>> {
        let thread = {
            let mut state = self.context.lock();
            let thread = match (state.phase, state.thread) {
                (Phase::Running, Some(thread)) => thread,
                _ => return Ok(None),
            };
            state.phase = Phase::Canceling;
            thread
        };
        self.context.notify_settled();

        let unmasked = MaskController::current().and_then(|blocked| {
            MaskController::reset()?;
            Ok(blocked)
        });
        match unmasked {
            Ok(blocked) if !blocked.is_empty() => warn!(
                context = self.context.id(),
                signals = ?blocked,
                "Cancel unblocked the caller's signals"
            ),
            Ok(_) => {}
            Err(err) => {
                self.context.lock().phase = Phase::Running;
                return Err(err);
            }
        }

        match unsafe { ffi::pthread_cancel(thread.0) } {
            // Already exiting; the join below still reaps it
            0 | libc::ESRCH => {}
            rc => {
                self.context.lock().phase = Phase::Running;
                return Err(SignalError::os("pthread_cancel", Errno::from_raw(rc)));
            }
        }

        // Leaves the phase at Canceling: the thread's state is unknown
        check_pthread("pthread_join", unsafe {
            libc::pthread_join(thread.0, ptr::null_mut())
        })?;

        let mut state = self.context.lock();
        state.thread = None;
        state.outcome = Outcome::Canceled;
        state.teardown();
        drop(state);

        STATS.inc_canceled();
        info!(context = self.context.id(), "Signal thread canceled");
        Ok(Some(host.symbol(CANCELED_SYMBOL)))
    }

    /// Wait for the worker to finish and return its result
    ///
    /// `None` if it raised. A canceled worker yields the `canceled` symbol.
    pub fn join(&self, host: &mut I) -> SignalResult<Option<I::Value>> {
        let mut state = self.context.lock();
        self.context.wait_settled(&mut state);

        match state.phase {
            Phase::Canceling => return Ok(None),
            Phase::Closed => return Ok(state.outcome_in(host)),
            Phase::Running | Phase::Finished => {}
        }

        // Past `park` the worker never takes the lock again
        if let Some(thread) = state.thread.take() {
            check_pthread("pthread_join", unsafe {
                libc::pthread_join(thread.0, ptr::null_mut())
            })?;
            debug!(context = self.context.id(), "Worker joined");
        }

        Ok(state.outcome_in(host))
    }
}

/// Send `signal` to a raw thread token taken from [`SignalThread::thread_id`]
///
/// Returns the `pthread_kill` status code.
///
/// # Safety
///
/// `raw` must name a thread that has not been joined or detached-and-exited;
/// signaling a stale pthread id is undefined behavior.
pub unsafe fn kill_by_thread_id(
    raw: RawThreadId,
    signal: impl Into<SignalId>,
) -> SignalResult<i32> {
    let signal = resolve(signal)?;
    let rc = libc::pthread_kill(RawThread::from_raw_id(raw).0, signal);
    if rc == 0 {
        STATS.inc_kills();
    }
    Ok(rc)
}

/// Queue `signal` to process `pid`, returning the signal number
pub fn queue(pid: Pid, signal: impl Into<SignalId>) -> SignalResult<SignalNumber> {
    let signal = resolve(signal)?;
    send_queued(pid, signal)?;
    STATS.inc_queued();
    debug!(pid, signal = %SignalTable::describe(signal), "Signal queued");
    Ok(signal)
}

#[cfg(target_os = "linux")]
fn send_queued(pid: Pid, signal: SignalNumber) -> SignalResult<()> {
    let value = libc::sigval {
        sival_ptr: ptr::null_mut(),
    };
    check_libc("sigqueue", unsafe { ffi::sigqueue(pid, signal, value) }).map(drop)
}

/// No sigqueue: plain delivery, no value attached
#[cfg(not(target_os = "linux"))]
fn send_queued(pid: Pid, signal: SignalNumber) -> SignalResult<()> {
    check_libc("kill", unsafe { libc::kill(pid, signal) }).map(drop)
}
