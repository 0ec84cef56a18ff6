/*!
 * Thread Module
 * Worker threads with isolated interpreters and their controller handles
 */

pub mod builder;
pub mod config;
mod context;
pub mod lifecycle;
mod spawn;

// Re-export public API
pub use builder::SignalThreadBuilder;
pub use config::ThreadConfig;
pub use lifecycle::{kill_by_thread_id, queue, SignalThread};
