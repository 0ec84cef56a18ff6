/*!
 * Signal Table
 * Static name/number mapping for the signals the target defines
 */

use crate::core::limits::{EXIT_SIGNAL_NAME, FALLBACK_NSIG, REALTIME_NAME_PREFIX};
use crate::core::types::SignalNumber;
use serde::Serialize;

/// One named signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalSpec {
    pub name: &'static str,
    pub number: SignalNumber,
}

const fn spec(name: &'static str, number: SignalNumber) -> SignalSpec {
    SignalSpec { name, number }
}

/// Signals every supported POSIX target defines. Canonical names come before
/// their aliases so reverse lookups return the canonical one.
static COMMON_SIGNALS: &[SignalSpec] = &[
    spec(EXIT_SIGNAL_NAME, 0),
    spec("HUP", libc::SIGHUP),
    spec("INT", libc::SIGINT),
    spec("QUIT", libc::SIGQUIT),
    spec("ILL", libc::SIGILL),
    spec("TRAP", libc::SIGTRAP),
    spec("ABRT", libc::SIGABRT),
    spec("BUS", libc::SIGBUS),
    spec("FPE", libc::SIGFPE),
    spec("KILL", libc::SIGKILL),
    spec("USR1", libc::SIGUSR1),
    spec("SEGV", libc::SIGSEGV),
    spec("USR2", libc::SIGUSR2),
    spec("PIPE", libc::SIGPIPE),
    spec("ALRM", libc::SIGALRM),
    spec("TERM", libc::SIGTERM),
    spec("CHLD", libc::SIGCHLD),
    spec("CONT", libc::SIGCONT),
    spec("STOP", libc::SIGSTOP),
    spec("TSTP", libc::SIGTSTP),
    spec("TTIN", libc::SIGTTIN),
    spec("TTOU", libc::SIGTTOU),
    spec("URG", libc::SIGURG),
    spec("XCPU", libc::SIGXCPU),
    spec("XFSZ", libc::SIGXFSZ),
    spec("VTALRM", libc::SIGVTALRM),
    spec("PROF", libc::SIGPROF),
    spec("WINCH", libc::SIGWINCH),
    spec("IO", libc::SIGIO),
    spec("SYS", libc::SIGSYS),
];

#[cfg(target_os = "linux")]
static PLATFORM_SIGNALS: &[SignalSpec] = &[
    spec("IOT", libc::SIGIOT),
    spec("STKFLT", libc::SIGSTKFLT),
    spec("PWR", libc::SIGPWR),
    spec("POLL", libc::SIGPOLL),
];

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
static PLATFORM_SIGNALS: &[SignalSpec] = &[
    spec("IOT", libc::SIGIOT),
    spec("EMT", libc::SIGEMT),
    spec("INFO", libc::SIGINFO),
];

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
)))]
static PLATFORM_SIGNALS: &[SignalSpec] = &[];

/// Name/number mapping plus the real-time range of the running system
pub struct SignalTable;

impl SignalTable {
    /// All tabulated signals, common entries first
    pub fn iter() -> impl Iterator<Item = &'static SignalSpec> {
        COMMON_SIGNALS.iter().chain(PLATFORM_SIGNALS.iter())
    }

    /// Number for a bare name (no `SIG` prefix, no `RT<n>` computation)
    pub fn lookup(name: &str) -> Option<SignalNumber> {
        Self::iter().find(|s| s.name == name).map(|s| s.number)
    }

    /// Whether this target defines a signal with the given bare name
    pub fn is_defined(name: &str) -> bool {
        Self::lookup(name).is_some()
    }

    /// Canonical tabulated name for a number
    pub fn name_of(number: SignalNumber) -> Option<&'static str> {
        Self::iter().find(|s| s.number == number).map(|s| s.name)
    }

    /// Real-time signal range `[RTMIN, RTMAX]`, if the target has one
    #[cfg(target_os = "linux")]
    #[allow(unused_unsafe)]
    pub fn realtime_range() -> Option<(SignalNumber, SignalNumber)> {
        // libc reserves the first few real-time signals for itself
        Some(unsafe { (libc::SIGRTMIN(), libc::SIGRTMAX()) })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn realtime_range() -> Option<(SignalNumber, SignalNumber)> {
        None
    }

    /// Exclusive upper bound for valid signal numbers
    pub fn signal_limit() -> SignalNumber {
        match Self::realtime_range() {
            Some((_, max)) => max + 1,
            None => FALLBACK_NSIG,
        }
    }

    /// Display form used in logs, e.g. `SIGUSR1(10)` or `RT2(36)`
    pub fn describe(number: SignalNumber) -> String {
        if let Some(name) = Self::name_of(number) {
            if number == 0 {
                return format!("{}(0)", name);
            }
            return format!("SIG{}({})", name, number);
        }
        match Self::realtime_range() {
            Some((min, max)) if (min..=max).contains(&number) => {
                format!("{}{}({})", REALTIME_NAME_PREFIX, number - min, number)
            }
            _ => format!("signal({})", number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_common() {
        assert_eq!(SignalTable::lookup("INT"), Some(libc::SIGINT));
        assert_eq!(SignalTable::lookup("USR2"), Some(libc::SIGUSR2));
        assert_eq!(SignalTable::lookup("EXIT"), Some(0));
        assert_eq!(SignalTable::lookup("SIGINT"), None);
        assert_eq!(SignalTable::lookup("int"), None);
    }

    #[test]
    fn test_canonical_name_wins_over_alias() {
        assert_eq!(SignalTable::name_of(libc::SIGABRT), Some("ABRT"));
        assert!(SignalTable::is_defined("IOT") || !cfg!(target_os = "linux"));
    }

    #[test]
    fn test_names_are_unique() {
        let names: Vec<_> = SignalTable::iter().map(|s| s.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names.len(), sorted.len());
    }

    #[test]
    fn test_limit_covers_table() {
        let limit = SignalTable::signal_limit();
        assert!(SignalTable::iter().all(|s| s.number >= 0 && s.number < limit));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_describe() {
        assert_eq!(SignalTable::describe(libc::SIGUSR1), "SIGUSR1(10)");
        assert_eq!(SignalTable::describe(0), "EXIT(0)");
        let (min, _) = SignalTable::realtime_range().unwrap();
        assert_eq!(SignalTable::describe(min + 2), format!("RT2({})", min + 2));
    }
}
