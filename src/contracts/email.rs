//! Email sending

use std::path::Path;

/// Sends email on behalf of the application
pub trait EmailHandler: Send + Sync {
    /// Send a plain-body email; `true` when the message was accepted
    fn send_email(&self, to: &str, subject: &str, body: &str) -> bool;

    /// Send an email with one file attached
    fn send_email_with_attachment(&self, to: &str, subject: &str, body: &str, attachment: &Path) -> bool;
}
