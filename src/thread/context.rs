/*!
 * Thread Context
 * State shared between a worker thread and its controlling handles
 */

use crate::core::limits::CANCELED_SYMBOL;
use crate::core::types::RawThread;
use crate::runtime::Interpreter;
use crate::signals::ffi;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Worker lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Worker is executing; its interpreter lives on the worker's stack
    Running,
    /// Worker returned or raised; its interpreter is parked in the context
    Finished,
    /// A controller is terminating the worker; the thread id must not be reused
    Canceling,
    /// Interpreter torn down; every accessor answers `None`
    Closed,
}

/// Terminal value of the worker
pub(crate) enum Outcome<V> {
    Pending,
    /// Return value, still owned by the worker's interpreter
    Returned(V),
    Canceled,
}

pub(crate) struct ContextState<I: Interpreter> {
    pub phase: Phase,
    /// Present from spawn until some handle joins the thread
    pub thread: Option<RawThread>,
    pub interpreter: Option<I>,
    pub outcome: Outcome<I::Value>,
}

impl<I: Interpreter> ContextState<I> {
    pub fn is_alive(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Canceling)
    }

    /// Current outcome as a value of `host`
    pub fn outcome_in(&self, host: &mut I) -> Option<I::Value> {
        match &self.outcome {
            Outcome::Pending => None,
            Outcome::Canceled => Some(host.symbol(CANCELED_SYMBOL)),
            Outcome::Returned(value) => self
                .interpreter
                .as_ref()
                .map(|worker| worker.migrate(value, host)),
        }
    }

    /// Drop the outcome and close the interpreter
    pub fn teardown(&mut self) {
        if let Outcome::Returned(_) = self.outcome {
            self.outcome = Outcome::Pending;
        }
        if let Some(interpreter) = self.interpreter.take() {
            interpreter.close();
        }
        self.phase = Phase::Closed;
    }
}

/// Shared worker state; every read-modify sequence runs under one lock
pub struct ThreadContext<I: Interpreter> {
    id: u64,
    state: Mutex<ContextState<I>>,
    /// Signaled whenever the phase leaves `Running`
    settled: Condvar,
}

impl<I: Interpreter> ThreadContext<I> {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            state: Mutex::new(ContextState {
                phase: Phase::Running,
                thread: None,
                interpreter: None,
                outcome: Outcome::Pending,
            }),
            settled: Condvar::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ContextState<I>> {
        self.state.lock()
    }

    /// Block until the worker leaves `Running`
    pub(crate) fn wait_settled(&self, state: &mut MutexGuard<'_, ContextState<I>>) {
        while state.phase == Phase::Running {
            self.settled.wait(state);
        }
    }

    pub(crate) fn notify_settled(&self) {
        self.settled.notify_all();
    }

    /// Record the OS thread once pthread_create returns
    pub(crate) fn attach(&self, thread: RawThread) {
        self.state.lock().thread = Some(thread);
    }

    /// Worker side: hand the interpreter back when the callable returns or raises
    pub(crate) fn park(&self, interpreter: I, value: Option<I::Value>) {
        // A pending cancel now waits for the worker to exit instead of
        // unwinding it while it holds the lock
        let rc = ffi::disable_cancellation();
        if rc != 0 {
            warn!(context = self.id, rc, "pthread_setcancelstate failed");
        }

        let mut state = self.state.lock();
        match state.phase {
            Phase::Running => {
                state.phase = Phase::Finished;
                if let Some(value) = value {
                    state.outcome = Outcome::Returned(value);
                }
                state.interpreter = Some(interpreter);
                debug!(context = self.id, "Worker finished");
                self.settled.notify_all();
            }
            // The canceling controller closes it after the join
            Phase::Canceling => state.interpreter = Some(interpreter),
            Phase::Finished | Phase::Closed => {
                warn!(context = self.id, phase = ?state.phase, "Worker parked twice");
                interpreter.close();
            }
        }
    }
}

impl<I: Interpreter> Drop for ThreadContext<I> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Some(interpreter) = state.interpreter.take() {
            interpreter.close();
        }
        // Nobody joined: let the OS reclaim the thread when it exits
        if let Some(thread) = state.thread.take() {
            let rc = unsafe { libc::pthread_detach(thread.0) };
            if rc != 0 {
                warn!(context = self.id, rc, "pthread_detach failed");
            }
        }
    }
}
