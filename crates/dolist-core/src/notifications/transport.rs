use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("recipient '{0}' rejected")]
    Rejected(String),

    #[error("mail server unavailable: {0}")]
    Unavailable(String),
}

/// Outbound mail. Implementations are synchronous and own their timeouts.
#[cfg_attr(test, mockall::automock)]
pub trait MailTransport: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), TransportError>;
}

/// Writes mails to the log instead of delivering them.
pub struct LogTransport {
    from: String,
}

impl LogTransport {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl MailTransport for LogTransport {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), TransportError> {
        info!("Mail from {} to {}: {}", self.from, to, subject);
        debug!("{}", body);
        Ok(())
    }
}
