//! # Utility Modules
//!
//! Supporting utilities for logging and observability.
//!
//! ## Components
//! - **Logging**: tracing-subscriber configuration (stderr, env filter, optional JSON)
//! - **Metrics**: Atomic decode counters, passed explicitly to whoever needs them

pub mod logging;
pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};
