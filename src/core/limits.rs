/*!
 * System Limits and Constants
 *
 * Centralized location for names, limits and platform fallbacks used by the
 * signal table and the thread spawner.
 *
 * - Linux-compatible values are marked with [LINUX-COMPAT]
 */

// =============================================================================
// SIGNAL NAMES
// =============================================================================

/// Optional prefix stripped from symbolic signal names
pub const SIGNAL_NAME_PREFIX: &str = "SIG";

/// Prefix of computed real-time signal names (`RT0`, `RT1`, ...)
pub const REALTIME_NAME_PREFIX: &str = "RT";

/// Synthetic no-op signal name, resolves to 0
pub const EXIT_SIGNAL_NAME: &str = "EXIT";

/// Signal count used when the platform has no real-time range
/// Matches NSIG on macOS and the BSDs
pub const FALLBACK_NSIG: i32 = 32;

// =============================================================================
// THREAD LIFECYCLE
// =============================================================================

/// Symbol a canceled worker reports as its result
pub const CANCELED_SYMBOL: &str = "canceled";

/// Default prefix of worker thread names
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "sigthread";

/// Maximum thread name length, excluding the NUL terminator
/// [LINUX-COMPAT] pthread_setname_np rejects longer names with ERANGE
pub const MAX_THREAD_NAME_LEN: usize = 15;

/// Smallest stack a worker is allowed to request
pub const MIN_STACK_SIZE: usize = libc::PTHREAD_STACK_MIN;

/// Callbacks running longer than this are logged as slow (milliseconds)
pub const SLOW_CALLBACK_MS: u128 = 100;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Overrides the worker thread name prefix
pub const ENV_THREAD_NAME: &str = "SIGNAL_THREAD_NAME";

/// Overrides the worker stack size in bytes
pub const ENV_STACK_SIZE: &str = "SIGNAL_THREAD_STACK_SIZE";

/// Enables JSON trace output when set to "1" or "true"
pub const ENV_TRACE_JSON: &str = "SIGNAL_THREAD_TRACE_JSON";
