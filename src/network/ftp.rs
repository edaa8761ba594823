//! FTP transfers
//!
//! One control connection per operation. [`FtpConnection`] owns the
//! suppaftp stream and sends `QUIT` when dropped, so every exit path
//! (success, rejected login, failed store or retrieve) logs out and closes
//! the socket.

use crate::error::{Result, TransferError};
use crate::network::FtpEndpoint;
use std::io::{Read, Write};
use std::path::Path;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};

/// Authenticated FTP control connection
pub struct FtpConnection {
    stream: Option<FtpStream>,
    address: String,
}

impl FtpConnection {
    /// Connect, log in and switch to binary transfers
    pub fn connect(endpoint: &FtpEndpoint) -> Result<Self> {
        let address = endpoint.address();
        tracing::debug!("Connecting to ftp://{}", address);

        let stream = FtpStream::connect(address.as_str())
            .map_err(|e| TransferError::connection(&address, e.to_string()))?;

        // From here on Drop takes care of QUIT.
        let mut conn = Self {
            stream: Some(stream),
            address,
        };

        conn.stream_mut()?
            .login(endpoint.username.as_str(), endpoint.password.as_str())
            .map_err(|e| match e {
                FtpError::ConnectionError(io) => TransferError::connection(&endpoint.host, io.to_string()),
                other => TransferError::auth(&endpoint.username, &endpoint.host, other.to_string()),
            })?;

        let address = conn.address.clone();
        conn.stream_mut()?
            .transfer_type(FileType::Binary)
            .map_err(|e| command_error(&address, "TYPE I", e))?;

        Ok(conn)
    }

    /// Upload everything `reader` yields to `remote_path`
    pub fn store<R: Read>(&mut self, remote_path: &str, reader: &mut R) -> Result<u64> {
        let address = self.address.clone();
        self.stream_mut()?
            .put_file(remote_path, reader)
            .map_err(|e| command_error(&address, &format!("STOR {}", remote_path), e))
    }

    /// Download `remote_path` into `writer`
    ///
    /// `local` names the file behind `writer` for error messages.
    pub fn retrieve<W: Write>(&mut self, remote_path: &str, writer: &mut W, local: &Path) -> Result<u64> {
        let address = self.address.clone();
        let mut local_error: Option<std::io::Error> = None;

        let result = self.stream_mut()?.retr(remote_path, |reader| {
            let mut buffer = [0u8; 64 * 1024];
            let mut total = 0u64;
            loop {
                let n = match reader.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(FtpError::ConnectionError(e)),
                };
                if let Err(e) = writer.write_all(&buffer[..n]) {
                    local_error = Some(e);
                    return Err(local_write_failed());
                }
                total += n as u64;
            }
            if let Err(e) = writer.flush() {
                local_error = Some(e);
                return Err(local_write_failed());
            }
            Ok(total)
        });

        if let Some(e) = local_error {
            return Err(TransferError::io(local, e));
        }
        result.map_err(|e| command_error(&address, &format!("RETR {}", remote_path), e))
    }

    /// Log out explicitly; dropping the connection does the same quietly
    pub fn quit(mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .quit()
                .map_err(|e| TransferError::connection(&self.address, e.to_string()))?;
        }
        Ok(())
    }

    fn stream_mut(&mut self) -> Result<&mut FtpStream> {
        let address = &self.address;
        self.stream
            .as_mut()
            .ok_or_else(|| TransferError::connection(address, "connection already closed"))
    }
}

impl Drop for FtpConnection {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.quit() {
                tracing::debug!("QUIT to {} failed: {}", self.address, e);
            }
        }
    }
}

fn local_write_failed() -> FtpError {
    FtpError::ConnectionError(std::io::Error::new(
        std::io::ErrorKind::Other,
        "local write failed",
    ))
}

fn command_error(address: &str, command: &str, e: FtpError) -> TransferError {
    match e {
        FtpError::ConnectionError(io) => {
            TransferError::connection(address, format!("{}: {}", command, io))
        }
        // Control connection closed before a full reply arrived
        FtpError::BadResponse => {
            TransferError::connection(address, format!("{}: connection closed", command))
        }
        other => TransferError::rejected(address, format!("{}: {}", command, other)),
    }
}
