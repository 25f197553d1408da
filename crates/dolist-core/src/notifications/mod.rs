//! Notification delivery: mail first, then the persisted feed entry.

mod dispatcher;
mod feed;
mod transport;

pub use dispatcher::{DatabaseLeg, Delivery, MailLeg, Notifiable, Notifier};
pub use feed::read_all;
pub use transport::{LogTransport, MailTransport, TransportError};

#[cfg(test)]
pub use transport::MockMailTransport;
