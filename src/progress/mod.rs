//! Progress reporting module
//!
//! Byte-level progress for a single transfer, drawn by the CLI and
//! hidden when the library is used on its own.

mod reporter;

pub use reporter::*;
