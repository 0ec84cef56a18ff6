/*!
 * Cancellation-Aware Bindings
 * libc entry points that must be declared by hand
 */

use libc::{c_int, pthread_t, sigset_t};

// sigwait and sigwaitinfo are cancellation points: pthread_cancel unwinds out
// of them, so they are declared with an ABI that permits unwinding.
extern "C-unwind" {
    pub fn sigwait(set: *const sigset_t, sig: *mut c_int) -> c_int;

    #[cfg(target_os = "linux")]
    pub fn sigwaitinfo(set: *const sigset_t, info: *mut libc::siginfo_t) -> c_int;
}

extern "C" {
    pub fn pthread_cancel(thread: pthread_t) -> c_int;
    pub fn pthread_setcancelstate(state: c_int, oldstate: *mut c_int) -> c_int;

    #[cfg(target_os = "linux")]
    pub fn sigqueue(pid: libc::pid_t, sig: c_int, value: libc::sigval) -> c_int;
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub const PTHREAD_CANCEL_DISABLE: c_int = 0x00;
#[cfg(not(any(target_os = "macos", target_os = "ios")))]
pub const PTHREAD_CANCEL_DISABLE: c_int = 1;

/// Stop the calling thread from acting on cancellation requests
pub fn disable_cancellation() -> c_int {
    let mut old: c_int = 0;
    unsafe { pthread_setcancelstate(PTHREAD_CANCEL_DISABLE, &mut old) }
}
