//! Network transports
//!
//! - HTTP multipart upload and GET download
//! - FTP store and retrieve over a single control connection
//! - Endpoint parsing shared by both

mod endpoint;
mod ftp;
mod http;

pub use endpoint::*;
pub use ftp::*;
pub use http::*;
