//! HTTP middleware for request processing.
//!
//! - [`tracing`] - Request/response logging

pub mod tracing;
