/*!
 * Signal Resolver
 * Turns integer or symbolic signal identifiers into validated signal numbers
 */

use super::table::SignalTable;
use crate::core::errors::{SignalError, SignalResult};
use crate::core::limits::{REALTIME_NAME_PREFIX, SIGNAL_NAME_PREFIX};
use crate::core::types::SignalNumber;
use std::fmt;

/// Signal identifier accepted by every operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignalId {
    Number(SignalNumber),
    Name(String),
}

impl From<SignalNumber> for SignalId {
    fn from(n: SignalNumber) -> Self {
        SignalId::Number(n)
    }
}

impl From<&str> for SignalId {
    fn from(name: &str) -> Self {
        SignalId::Name(name.to_string())
    }
}

impl From<String> for SignalId {
    fn from(name: String) -> Self {
        SignalId::Name(name)
    }
}

impl From<&String> for SignalId {
    fn from(name: &String) -> Self {
        SignalId::Name(name.clone())
    }
}

impl From<nix::sys::signal::Signal> for SignalId {
    fn from(signal: nix::sys::signal::Signal) -> Self {
        SignalId::Number(signal as SignalNumber)
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalId::Number(n) => write!(f, "{}", n),
            SignalId::Name(name) => f.write_str(name),
        }
    }
}

/// Resolve any identifier into a validated signal number
///
/// Never touches OS state, so callers can fail fast before masking or waiting.
pub fn resolve(id: impl Into<SignalId>) -> SignalResult<SignalNumber> {
    match id.into() {
        SignalId::Number(n) => resolve_number(n),
        SignalId::Name(name) => resolve_name(&name),
    }
}

/// Accept `0 <= n < signal_limit`
pub fn resolve_number(n: SignalNumber) -> SignalResult<SignalNumber> {
    let limit = SignalTable::signal_limit();
    if (0..limit).contains(&n) {
        Ok(n)
    } else {
        Err(SignalError::invalid_argument(format!(
            "invalid signal number ({})",
            n
        )))
    }
}

/// Resolve a case-sensitive name with an optional `SIG` prefix
pub fn resolve_name(name: &str) -> SignalResult<SignalNumber> {
    let bare = name.strip_prefix(SIGNAL_NAME_PREFIX).unwrap_or(name);

    if let Some(number) = SignalTable::lookup(bare) {
        return Ok(number);
    }

    bare.strip_prefix(REALTIME_NAME_PREFIX)
        .and_then(resolve_realtime)
        .ok_or_else(|| SignalError::unsupported(name))
}

/// `RT0` is RTMIN, `RT<n>` is RTMIN+n while it stays within RTMAX.
/// The offset must be plain digits; `RT00` and friends are rejected.
fn resolve_realtime(offset: &str) -> Option<SignalNumber> {
    let (min, max) = SignalTable::realtime_range()?;

    if offset.is_empty() || !offset.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if offset == "0" {
        return Some(min);
    }

    let n: SignalNumber = offset.parse().ok()?;
    if n == 0 {
        return None;
    }
    min.checked_add(n).filter(|sig| *sig <= max)
}
