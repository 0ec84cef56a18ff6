/*!
 * Signals Module
 * POSIX signal naming, per-thread masks and blocking waits
 */

mod atomic_stats;
pub(crate) mod ffi;
pub mod mask;
mod ops;
pub mod resolver;
mod siginfo;
pub mod table;
pub mod wait;

// Re-export public API
pub use atomic_stats::{stats, AtomicSignalStats, SignalStats};
pub(crate) use atomic_stats::STATS;
pub use mask::MaskController;
pub use ops::{mask, wait, waitinfo};
pub use resolver::{resolve, resolve_name, resolve_number, SignalId};
pub use siginfo::SigInfoSnapshot;
pub use table::{SignalSpec, SignalTable};
pub use wait::WaitEngine;
