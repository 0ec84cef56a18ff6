/*!
 * Core Types
 * Common types used across the crate
 */

/// Validated signal number (0 is the EXIT sentinel)
pub type SignalNumber = i32;

/// Process ID type
pub type Pid = i32;

/// Opaque numeric token for an OS thread, see `SignalThread::thread_id`
pub type RawThreadId = u64;

/// Raw pthread handle that may cross threads
///
/// `pthread_t` is a pointer on some platforms, which would make every
/// structure holding it `!Send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawThread(pub libc::pthread_t);

// A pthread_t is an identifier, never dereferenced by this crate.
unsafe impl Send for RawThread {}
unsafe impl Sync for RawThread {}

impl RawThread {
    pub fn as_raw_id(self) -> RawThreadId {
        self.0 as usize as RawThreadId
    }

    pub fn from_raw_id(raw: RawThreadId) -> Self {
        RawThread(raw as usize as libc::pthread_t)
    }
}
