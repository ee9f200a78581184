//! Lightweight in-process counters.
//!
//! Frame, decode-error and dispatch counts are stored as atomics and can be
//! rendered in Prometheus text format by embedding applications.

pub mod metrics;

pub use metrics::ClientMetrics;
