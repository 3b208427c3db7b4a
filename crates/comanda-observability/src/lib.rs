//! Observability for the Comanda ordering core.
//!
//! This crate provides:
//! - `init_logging` - Global `tracing` subscriber with human or JSON output
//! - `OrderMetrics` - Checkout and catalog refresh counters
//! - `MeteredListener` - Counts refreshes on their way to another listener

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;
