//! Core transfer module
//!
//! Provides the transfer service, the request type that routes a transfer
//! between two endpoints, and the statistics each transfer reports.

mod request;
mod service;

pub use request::*;
pub use service::*;
