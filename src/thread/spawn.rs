/*!
 * Worker Spawning
 * Raw pthread creation and the worker entry point
 *
 * Workers are raw pthreads rather than std threads: cancellation unwinds the
 * worker with a forced unwind, which must travel straight back into libc's
 * thread start routine. Nothing on the worker path may catch unwinds.
 */

use super::config::ThreadConfig;
use super::context::ThreadContext;
use crate::core::errors::{check_pthread, SignalError, SignalResult};
use crate::core::types::{RawThread, SignalNumber};
use crate::runtime::Interpreter;
use crate::signals::{WaitEngine, STATS};
use std::ffi::c_void;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the worker runs inside its own interpreter
pub(crate) enum WorkerBody<V> {
    /// `callable(args...)`
    Call { callable: V, args: Vec<V> },
    /// Dispatch `callback(args...)` for every delivery of `signal`
    Trap {
        signal: SignalNumber,
        callback: V,
        args: Vec<V>,
    },
}

pub(crate) struct WorkerStart<I: Interpreter> {
    pub context: Arc<ThreadContext<I>>,
    pub interpreter: I,
    pub body: WorkerBody<I::Value>,
}

impl<I: Interpreter> WorkerStart<I> {
    fn run(self) {
        let WorkerStart {
            context,
            mut interpreter,
            body,
        } = self;

        let value = match body {
            WorkerBody::Call { callable, args } => interpreter.call(&callable, &args),
            WorkerBody::Trap {
                signal,
                callback,
                args,
            } => {
                let err = match WaitEngine::dispatch_loop(signal, false, |_| {
                    interpreter
                        .call(&callback, &args)
                        .map(drop)
                        .ok_or(SignalError::Raised)
                }) {
                    Err(err) => err,
                    Ok(never) => match never {},
                };
                if err != SignalError::Raised {
                    warn!(context = context.id(), error = %err, "Trap loop failed");
                    interpreter.raise(&err);
                }
                None
            }
        };

        context.park(interpreter, value);
    }
}

type StartRoutine = extern "C" fn(*mut c_void) -> *mut c_void;

// Declared C-unwind so the forced unwind of pthread_cancel may pass through
extern "C-unwind" fn worker_main<I: Interpreter>(arg: *mut c_void) -> *mut c_void {
    // SAFETY: `arg` is the Box leaked by `start_worker`, handed over exactly once
    let start = unsafe { Box::from_raw(arg as *mut WorkerStart<I>) };
    start.run();
    ptr::null_mut()
}

/// Create the worker pthread and record it on the context
pub(crate) fn start_worker<I: Interpreter>(
    config: &ThreadConfig,
    start: WorkerStart<I>,
) -> SignalResult<RawThread> {
    let context = Arc::clone(&start.context);
    let mut attr = MaybeUninit::<libc::pthread_attr_t>::uninit();
    check_pthread("pthread_attr_init", unsafe {
        libc::pthread_attr_init(attr.as_mut_ptr())
    })?;

    if let Some(size) = config.effective_stack_size() {
        let rc = unsafe { libc::pthread_attr_setstacksize(attr.as_mut_ptr(), size) };
        if let Err(err) = check_pthread("pthread_attr_setstacksize", rc) {
            unsafe { libc::pthread_attr_destroy(attr.as_mut_ptr()) };
            return Err(err);
        }
    }

    let arg = Box::into_raw(Box::new(start)) as *mut c_void;
    let mut thread = MaybeUninit::<libc::pthread_t>::uninit();
    let rc = unsafe {
        // Same calling convention; only the unwind contract differs
        let routine = std::mem::transmute::<
            extern "C-unwind" fn(*mut c_void) -> *mut c_void,
            StartRoutine,
        >(worker_main::<I>);
        libc::pthread_create(thread.as_mut_ptr(), attr.as_ptr(), routine, arg)
    };
    unsafe { libc::pthread_attr_destroy(attr.as_mut_ptr()) };

    if let Err(err) = check_pthread("pthread_create", rc) {
        // The worker never started, so the box is still ours
        drop(unsafe { Box::from_raw(arg as *mut WorkerStart<I>) });
        return Err(err);
    }

    let thread = RawThread(unsafe { thread.assume_init() });
    context.attach(thread);
    name_thread(thread, &config.thread_name(context.id()));
    STATS.inc_spawned();
    info!(
        context = context.id(),
        thread_id = thread.as_raw_id(),
        "Spawned signal thread"
    );
    Ok(thread)
}

#[cfg(target_os = "linux")]
fn name_thread(thread: RawThread, name: &str) {
    let Ok(name) = std::ffi::CString::new(name) else {
        return;
    };
    let rc = unsafe { libc::pthread_setname_np(thread.0, name.as_ptr()) };
    if rc != 0 {
        debug!(rc, "pthread_setname_np failed");
    }
}

#[cfg(not(target_os = "linux"))]
fn name_thread(_thread: RawThread, name: &str) {
    debug!(name, "Thread naming from the controller is not supported here");
}
