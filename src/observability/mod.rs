//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch and endpoints produce:
//!     → logging.rs (structured log events, request-scoped spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line via the request span
//! - Metrics are no-ops until the exporter is installed

pub mod logging;
pub mod metrics;
