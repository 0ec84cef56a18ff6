/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for every signal and thread operation
pub type SignalResult<T> = Result<T, SignalError>;

/// Signal thread errors
///
/// Argument errors are raised before any OS state is touched. OS failures
/// carry the errno of the failing call and are never retried.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SignalError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(signal::invalid_argument),
        help("Use a signal number, a name such as \"INT\" or \"SIGINT\", \"RT<n>\", or \"EXIT\".")
    )]
    InvalidArgument(String),

    #[error("{op} failed: {reason}")]
    #[diagnostic(
        code(signal::runtime),
        help("The underlying OS call failed. Check the signal number and thread state.")
    )]
    Runtime {
        op: String,
        errno: i32,
        reason: String,
    },

    #[error("Script callable raised an exception")]
    #[diagnostic(
        code(signal::raised),
        help("The exception is held by the interpreter that ran the callable.")
    )]
    Raised,
}

impl SignalError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SignalError::InvalidArgument(msg.into())
    }

    pub fn unsupported(name: &str) -> Self {
        SignalError::InvalidArgument(format!("unsupported signal '{}'", name))
    }

    /// OS call failure with the errno it reported
    pub fn os(op: &str, errno: Errno) -> Self {
        SignalError::Runtime {
            op: op.to_string(),
            errno: errno as i32,
            reason: errno.desc().to_string(),
        }
    }

    /// Runtime failure that did not come from errno
    pub fn runtime(op: &str, reason: impl Into<String>) -> Self {
        SignalError::Runtime {
            op: op.to_string(),
            errno: 0,
            reason: reason.into(),
        }
    }

    /// Errno carried by a runtime failure, if any
    pub fn errno(&self) -> Option<Errno> {
        match self {
            SignalError::Runtime { errno, .. } if *errno != 0 => Some(Errno::from_raw(*errno)),
            _ => None,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SignalError::InvalidArgument(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, SignalError::Runtime { .. })
    }
}

/// Map a pthread-style return code (0 or an errno value) to a result
pub(crate) fn check_pthread(op: &str, rc: libc::c_int) -> SignalResult<()> {
    match rc {
        0 => Ok(()),
        err => Err(SignalError::os(op, Errno::from_raw(err))),
    }
}

/// Map a libc-style return code (-1 with errno set) to a result
pub(crate) fn check_libc(op: &str, rc: libc::c_int) -> SignalResult<libc::c_int> {
    Errno::result(rc).map_err(|errno| SignalError::os(op, errno))
}
