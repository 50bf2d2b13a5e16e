//! Protocol types and errors shared by the `ejson-config` binaries.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
