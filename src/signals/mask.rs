/*!
 * Signal Mask Controller
 * Per-thread blocked-signal set operations
 *
 * Every operation applies to the calling thread only (pthread_sigmask), so
 * no cross-thread serialization is needed.
 */

use super::table::SignalTable;
use crate::core::errors::{check_libc, check_pthread, SignalResult};
use crate::core::types::SignalNumber;
use std::mem::MaybeUninit;
use std::ptr;
use tracing::debug;

/// Thin owned wrapper over `sigset_t`
#[derive(Clone, Copy)]
pub(crate) struct SigSet(libc::sigset_t);

impl SigSet {
    pub fn empty() -> Self {
        let mut set = MaybeUninit::<libc::sigset_t>::uninit();
        unsafe {
            libc::sigemptyset(set.as_mut_ptr());
            SigSet(set.assume_init())
        }
    }

    /// Every signal libc lets a thread block
    pub fn full() -> Self {
        let mut set = MaybeUninit::<libc::sigset_t>::uninit();
        unsafe {
            libc::sigfillset(set.as_mut_ptr());
            SigSet(set.assume_init())
        }
    }

    pub fn of(signal: SignalNumber) -> SignalResult<Self> {
        let mut set = Self::empty();
        set.add(signal)?;
        Ok(set)
    }

    pub fn add(&mut self, signal: SignalNumber) -> SignalResult<()> {
        check_libc("sigaddset", unsafe { libc::sigaddset(&mut self.0, signal) })?;
        Ok(())
    }

    pub fn contains(&self, signal: SignalNumber) -> bool {
        unsafe { libc::sigismember(&self.0, signal) == 1 }
    }

    pub fn as_ptr(&self) -> *const libc::sigset_t {
        &self.0
    }
}

/// Per-thread mask operations
pub struct MaskController;

impl MaskController {
    /// Add `signal` to the calling thread's blocked set, keeping the rest
    pub fn block(signal: SignalNumber) -> SignalResult<()> {
        let set = SigSet::of(signal)?;
        Self::apply(libc::SIG_BLOCK, &set)?;
        debug!(signal = %SignalTable::describe(signal), "Blocked signal on calling thread");
        Ok(())
    }

    /// Prepare the calling thread to wait on `signal`
    ///
    /// No signal is handled asynchronously on this thread afterwards. The
    /// awaited one is blocked too: sigwait only consumes blocked signals, and
    /// a delivery that races ahead of the wait stays pending.
    pub fn isolate_for_wait(signal: SignalNumber) -> SignalResult<()> {
        // Rejects numbers the OS cannot mask, EXIT included
        SigSet::of(signal)?;
        Self::apply(libc::SIG_SETMASK, &SigSet::full())?;
        debug!(signal = %SignalTable::describe(signal), "Isolated mask for wait");
        Ok(())
    }

    /// Clear the calling thread's mask entirely
    pub fn reset() -> SignalResult<()> {
        Self::apply(libc::SIG_SETMASK, &SigSet::empty())?;
        debug!("Reset signal mask on calling thread");
        Ok(())
    }

    /// Signals currently blocked on the calling thread
    pub fn current() -> SignalResult<Vec<SignalNumber>> {
        let set = Self::current_set()?;
        Ok((1..SignalTable::signal_limit())
            .filter(|sig| set.contains(*sig))
            .collect())
    }

    /// Whether `signal` is blocked on the calling thread
    pub fn is_blocked(signal: SignalNumber) -> SignalResult<bool> {
        Ok(Self::current_set()?.contains(signal))
    }

    fn current_set() -> SignalResult<SigSet> {
        let mut old = SigSet::empty();
        check_pthread("pthread_sigmask", unsafe {
            libc::pthread_sigmask(libc::SIG_BLOCK, ptr::null(), &mut old.0)
        })?;
        Ok(old)
    }

    fn apply(how: libc::c_int, set: &SigSet) -> SignalResult<()> {
        check_pthread("pthread_sigmask", unsafe {
            libc::pthread_sigmask(how, set.as_ptr(), ptr::null_mut())
        })
    }
}
