//! Domain core: access control over the namespace → list → task hierarchy,
//! sharing, CRUD services and notification dispatch.
//!
//! Every operation takes its store handle explicitly, either as a bare
//! `&Connection` or through a [`Ctx`] that also carries the authenticated user.

pub mod context;
pub mod error;
pub mod hierarchy;
pub mod lists;
pub mod namespaces;
pub mod notifications;
pub mod permissions;
pub mod sharing;
pub mod tasks;
pub mod teams;
pub mod users;

pub use context::Ctx;
pub use error::{Error, Result};
pub use hierarchy::{Resource, effective_right};
pub use notifications::{
    Delivery, DatabaseLeg, LogTransport, MailLeg, MailTransport, Notifiable, Notifier,
    TransportError,
};
pub use permissions::Action;
