/*!
 * Monitoring Module
 * Tracing setup and spans
 */

pub mod tracer;

pub use tracer::{init_tracing, DispatchSpan};
