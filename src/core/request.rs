//! Transfer requests and their outcome

use crate::config::HttpTimeout;
use crate::error::Result;
use crate::network::Endpoint;
use std::fmt;
use std::time::Duration;

/// Transport that moved the bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// HTTP multipart upload or GET download
    Http,
    /// FTP store or retrieve
    Ftp,
    /// Local filesystem copy
    Local,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "http",
            Self::Ftp => "ftp",
            Self::Local => "local",
        })
    }
}

/// Statistics for one completed transfer
#[derive(Debug, Clone)]
pub struct TransferStats {
    /// Transport used
    pub transport: Transport,
    /// Bytes moved
    pub bytes: u64,
    /// Wall time of the whole operation
    pub duration: Duration,
    /// Average throughput in bytes/second
    pub throughput: f64,
}

impl TransferStats {
    /// Stats for `bytes` moved over `transport` in `duration`
    pub fn new(transport: Transport, bytes: u64, duration: Duration) -> Self {
        let secs = duration.as_secs_f64();
        let throughput = if secs > 0.0 { bytes as f64 / secs } else { 0.0 };
        Self {
            transport,
            bytes,
            duration,
            throughput,
        }
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n=== Transfer Summary ===");
        println!("Transport:       {}", self.transport);
        println!("Bytes moved:     {}", humansize::format_size(self.bytes, humansize::BINARY));
        println!("Duration:        {:.2?}", self.duration);
        println!("Throughput:      {}/s", humansize::format_size(self.throughput as u64, humansize::BINARY));
    }
}

/// One transfer between two endpoints
///
/// ```
/// use filexfer::config::HttpTimeout;
/// use filexfer::core::TransferRequest;
///
/// let request = TransferRequest::parse("report.pdf", "http://localhost:8080/upload")
///     .unwrap()
///     .with_timeout(HttpTimeout::Millis(5000))
///     .with_field_name("document");
/// assert_eq!(request.multipart_field_name.as_deref(), Some("document"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    /// Where the bytes come from
    pub source: Endpoint,
    /// Where the bytes go
    pub destination: Endpoint,
    /// HTTP timeout; `None` uses the service configuration
    pub timeout: Option<HttpTimeout>,
    /// Multipart part name for HTTP uploads; `None` uses the service configuration
    pub multipart_field_name: Option<String>,
}

impl TransferRequest {
    /// Request moving `source` to `destination`
    pub fn new(source: Endpoint, destination: Endpoint) -> Self {
        Self {
            source,
            destination,
            timeout: None,
            multipart_field_name: None,
        }
    }

    /// Parse both endpoints from their textual form
    pub fn parse(source: &str, destination: &str) -> Result<Self> {
        Ok(Self::new(Endpoint::parse(source)?, Endpoint::parse(destination)?))
    }

    /// Override the HTTP timeout
    pub fn with_timeout(mut self, timeout: HttpTimeout) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the multipart part name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.multipart_field_name = Some(name.into());
        self
    }
}

impl fmt::Display for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}
