//! Structured logging for the sample API.
//!
//! # Telemetry invariants
//!
//! - **No secrets or key material** must appear in any span attribute or log
//!   field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
