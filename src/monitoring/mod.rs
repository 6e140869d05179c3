/*!
 * Monitoring Module
 * Structured logging setup
 */

pub mod tracer;

pub use tracer::{call_span, generate_trace_id, init_tracing};
