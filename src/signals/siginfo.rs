/*!
 * Signal Info Snapshot
 * Owned copy of the kernel-delivered signal metadata
 */

use crate::core::types::{Pid, SignalNumber};
use serde::{Deserialize, Serialize};

/// Metadata of one delivered signal
///
/// Copied out of the `siginfo_t` buffer at wait return; the buffer is reused
/// by the next wait, so nothing here borrows from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SigInfoSnapshot {
    pub signo: SignalNumber,
    pub code: i32,
    pub errno: i32,
    /// Sending process
    pub pid: Pid,
    /// Real user id of the sender
    pub uid: u32,
    pub status: i32,
    /// Value attached by `sigqueue`
    pub value: isize,
    /// Originating system call, for `SIGSYS` only
    pub syscall: Option<i32>,
}

impl SigInfoSnapshot {
    /// Snapshot that only knows the delivered signal number
    pub fn from_signo(signo: SignalNumber) -> Self {
        Self {
            signo,
            ..Self::default()
        }
    }

    #[cfg(target_os = "linux")]
    pub(crate) fn capture(info: &libc::siginfo_t) -> Self {
        unsafe {
            Self {
                signo: info.si_signo,
                code: info.si_code,
                errno: info.si_errno,
                pid: info.si_pid(),
                uid: info.si_uid(),
                status: info.si_status(),
                value: info.si_value().sival_ptr as isize,
                syscall: syscall_of(info),
            }
        }
    }
}

/// Linux lays out `_sigsys { void *call_addr; int syscall; unsigned arch; }`
/// right after the 16 byte siginfo header.
#[cfg(all(target_os = "linux", target_pointer_width = "64"))]
fn syscall_of(info: &libc::siginfo_t) -> Option<i32> {
    if info.si_signo != libc::SIGSYS {
        return None;
    }
    let base = info as *const libc::siginfo_t as *const u8;
    Some(unsafe { std::ptr::read_unaligned(base.add(24) as *const i32) })
}

#[cfg(all(target_os = "linux", not(target_pointer_width = "64")))]
fn syscall_of(_info: &libc::siginfo_t) -> Option<i32> {
    None
}
