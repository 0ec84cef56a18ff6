/*!
 * Wait Engine
 * Blocking signal waits and the wait-and-dispatch loops
 *
 * IDLE -> MASKED -> WAITING -> (DISPATCHING -> WAITING)* -> RETURNED | LOOPING
 *
 * Every entry point masks the calling thread before it blocks. A loop only
 * returns with an error; otherwise it runs until the thread is canceled or
 * the process exits.
 */

use super::atomic_stats::STATS;
use super::ffi;
use super::mask::{MaskController, SigSet};
use super::siginfo::SigInfoSnapshot;
use super::table::SignalTable;
use crate::core::errors::{check_pthread, SignalError, SignalResult};
use crate::core::types::SignalNumber;
use crate::monitoring::DispatchSpan;
use crate::runtime::Interpreter;
use std::convert::Infallible;
use tracing::{debug, trace};

/// Blocking wait primitives
pub struct WaitEngine;

impl WaitEngine {
    /// Block until one instance of `signal` is delivered and consume it
    pub fn wait_once(signal: SignalNumber) -> SignalResult<SignalNumber> {
        let set = Self::prepare(signal)?;
        Self::sigwait(&set)
    }

    /// Block until `signal` is delivered and return its metadata
    pub fn wait_info_once(signal: SignalNumber) -> SignalResult<SigInfoSnapshot> {
        let set = Self::prepare(signal)?;
        Self::sigwaitinfo(&set)
    }

    /// Call `callback()` once per delivery of `signal`, forever
    pub fn wait_loop<I: Interpreter>(
        interp: &mut I,
        signal: SignalNumber,
        callback: &I::Value,
    ) -> SignalResult<Infallible> {
        Self::require_block(interp, callback)?;
        Self::dispatch_loop(signal, false, |_| {
            interp.call(callback, &[]).map(drop).ok_or(SignalError::Raised)
        })
    }

    /// Call `callback(info)` once per delivery of `signal`, forever
    pub fn wait_info_loop<I: Interpreter>(
        interp: &mut I,
        signal: SignalNumber,
        callback: &I::Value,
    ) -> SignalResult<Infallible> {
        Self::require_block(interp, callback)?;
        Self::dispatch_loop(signal, true, |info| {
            let arg = interp.siginfo(info);
            interp
                .call(callback, std::slice::from_ref(&arg))
                .map(drop)
                .ok_or(SignalError::Raised)
        })
    }

    /// Shared loop: mask once, then wait and hand each delivery to `dispatch`
    pub(crate) fn dispatch_loop<F>(
        signal: SignalNumber,
        with_info: bool,
        mut dispatch: F,
    ) -> SignalResult<Infallible>
    where
        F: FnMut(SigInfoSnapshot) -> SignalResult<()>,
    {
        let set = Self::prepare(signal)?;
        let _span = tracing::debug_span!("wait_loop", signal = %SignalTable::describe(signal))
            .entered();

        loop {
            let info = if with_info {
                Self::sigwaitinfo(&set)?
            } else {
                SigInfoSnapshot::from_signo(Self::sigwait(&set)?)
            };

            let span = DispatchSpan::new(signal, info.pid);
            let result = {
                let _entered = span.enter();
                trace!("Dispatching signal");
                dispatch(info)
            };
            span.record_result(result.is_ok());
            drop(span);
            result?;
            STATS.inc_dispatched();
        }
    }

    /// Loop callbacks must be blocks; native functions cannot be preempted
    /// safely mid-dispatch.
    fn require_block<I: Interpreter>(interp: &I, callback: &I::Value) -> SignalResult<()> {
        if interp.is_block(callback) {
            Ok(())
        } else {
            Err(SignalError::runtime("wait", "require defined block"))
        }
    }

    /// Mask the calling thread, then build the one-signal wait set
    fn prepare(signal: SignalNumber) -> SignalResult<SigSet> {
        MaskController::isolate_for_wait(signal)?;
        let set = SigSet::of(signal)?;
        STATS.inc_waits();
        debug!(signal = %SignalTable::describe(signal), "Waiting for signal");
        Ok(set)
    }

    fn sigwait(set: &SigSet) -> SignalResult<SignalNumber> {
        let mut delivered: libc::c_int = 0;
        check_pthread("sigwait", unsafe { ffi::sigwait(set.as_ptr(), &mut delivered) })?;
        STATS.inc_received();
        Ok(delivered)
    }

    #[cfg(target_os = "linux")]
    fn sigwaitinfo(set: &SigSet) -> SignalResult<SigInfoSnapshot> {
        use nix::errno::Errno;
        use std::mem::MaybeUninit;

        let mut info = MaybeUninit::<libc::siginfo_t>::zeroed();
        loop {
            let rc = unsafe { ffi::sigwaitinfo(set.as_ptr(), info.as_mut_ptr()) };
            if rc >= 0 {
                break;
            }
            match Errno::last() {
                // A handler for some other signal ran; the wait itself did not fail
                Errno::EINTR => continue,
                errno => return Err(SignalError::os("sigwaitinfo", errno)),
            }
        }
        STATS.inc_received();
        Ok(SigInfoSnapshot::capture(unsafe { info.assume_init_ref() }))
    }

    /// No sigwaitinfo here: only the signal number is known
    #[cfg(not(target_os = "linux"))]
    fn sigwaitinfo(set: &SigSet) -> SignalResult<SigInfoSnapshot> {
        Self::sigwait(set).map(SigInfoSnapshot::from_signo)
    }
}
