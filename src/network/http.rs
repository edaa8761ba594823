//! HTTP transfers
//!
//! Multipart uploads and plain GET downloads over a blocking reqwest
//! client. A client is built for every transfer and dropped with it, so
//! concurrent transfers never share connections.

use crate::config::HttpTimeout;
use crate::error::{IoResultExt, Result, TransferError};
use crate::fs::{ensure_source_file, PartialFile};
use crate::progress::ProgressReporter;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use url::Url;

const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP transfer bound to one freshly built client
pub struct HttpTransfer {
    client: Client,
    progress: ProgressReporter,
}

impl HttpTransfer {
    /// Build a client with `timeout` applied to connect and read
    pub fn new(timeout: HttpTimeout) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(duration) = timeout.as_duration() {
            builder = builder.connect_timeout(duration).timeout(duration);
        }

        let client = builder
            .build()
            .map_err(|e| TransferError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            progress: ProgressReporter::disabled(),
        })
    }

    /// Report transferred bytes to `progress`
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// POST `source` as a single multipart part named `field_name`
    ///
    /// The part carries the file's base name. Only status 200 counts as
    /// success. A missing source fails before any request is sent.
    pub fn upload(&self, source: &Path, url: &Url, field_name: &str) -> Result<u64> {
        let size = ensure_source_file(source)?;
        let file = File::open(source).with_path(source)?;
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        self.progress.start(Some(size), "upload");
        let part = Part::reader_with_length(self.progress.wrap_read(file), size)
            .file_name(file_name)
            .mime_str(UPLOAD_CONTENT_TYPE)
            .map_err(|e| TransferError::config(e.to_string()))?;
        let form = Form::new().part(field_name.to_string(), part);

        tracing::debug!("POST {} ({} bytes as part '{}')", url, size, field_name);
        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .map_err(|e| request_error(url, e))?;

        check_status(url, response.status())?;
        Ok(size)
    }

    /// GET `url` and write the body to `dest`
    ///
    /// The body is staged next to `dest` and renamed into place only after
    /// it was fully received; on any failure `dest` is left untouched.
    pub fn download(&self, url: &Url, dest: &Path, buffer_size: usize) -> Result<u64> {
        tracing::debug!("GET {}", url);
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| request_error(url, e))?;

        check_status(url, response.status())?;

        let mut partial = PartialFile::create(dest)?;
        let staging_path = partial.staging_path().to_path_buf();
        self.progress.start(response.content_length(), "download");

        let bytes = {
            let mut writer = self
                .progress
                .wrap_write(BufWriter::with_capacity(buffer_size, partial.file_mut()));
            let bytes = response
                .copy_to(&mut writer)
                .map_err(|e| request_error(url, e))?;
            writer.flush().with_path(&staging_path)?;
            bytes
        };

        partial.commit()?;
        Ok(bytes)
    }
}

fn check_status(url: &Url, status: StatusCode) -> Result<()> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(TransferError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn request_error(url: &Url, e: reqwest::Error) -> TransferError {
    let message = if e.is_timeout() {
        format!("timed out: {}", e)
    } else if e.is_connect() {
        format!("connect failed: {}", e)
    } else {
        e.to_string()
    };
    TransferError::connection(url.as_str(), message)
}
