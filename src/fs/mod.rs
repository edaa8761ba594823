//! File system operations module
//!
//! Local copies and the staging files that make every local write
//! all-or-nothing.

mod operations;

pub use operations::*;
