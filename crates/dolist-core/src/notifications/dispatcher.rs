use std::sync::Arc;

use rusqlite::Connection;
use tracing::{debug, info};

use dolist_db::notifications;
use dolist_types::events::Notification;
use dolist_types::models::User;

use super::transport::MailTransport;
use crate::error::{Error, Result};

/// An entity that can receive notifications. Usually a user.
pub trait Notifiable {
    /// The address mails for this notifiable go to.
    fn route_for_mail(&self) -> Result<String>;

    /// The id persisted notifications are stored under.
    fn route_for_db(&self) -> i64;
}

impl Notifiable for User {
    fn route_for_mail(&self) -> Result<String> {
        if self.email.is_empty() {
            return Err(Error::validation("email", format!("user {} has no email", self.id)));
        }
        Ok(self.email.clone())
    }

    fn route_for_db(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailLeg {
    /// The notification has no mail rendering.
    Skipped,
    Sent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseLeg {
    /// The notification has no database rendering.
    Skipped,
    /// Id of the persisted notification row.
    Committed(i64),
}

/// Outcome of a successful [`Notifier::notify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub mail: MailLeg,
    pub database: DatabaseLeg,
}

/// Delivers notifications through the mail transport and the notification table.
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    /// Mails the notification, then persists it.
    ///
    /// The legs run in that order and stop at the first error: when the mail
    /// cannot be sent nothing is written. The database leg is atomic; a failed
    /// insert leaves no row behind. A mail that was sent is not recalled if the
    /// database leg fails afterwards.
    pub fn notify(
        &self,
        conn: &Connection,
        notifiable: &dyn Notifiable,
        notification: &Notification,
    ) -> Result<Delivery> {
        let mail = self.notify_mail(notifiable, notification)?;
        let database = notify_db(conn, notifiable, notification)?;

        debug!(
            "Notification {} for {}: mail {:?}, database {:?}",
            notification.name(),
            notifiable.route_for_db(),
            mail,
            database
        );
        Ok(Delivery { mail, database })
    }

    fn notify_mail(&self, notifiable: &dyn Notifiable, notification: &Notification) -> Result<MailLeg> {
        let Some(mail) = notification.to_mail() else {
            return Ok(MailLeg::Skipped);
        };

        let to = notifiable.route_for_mail()?;
        self.transport.send(&to, &mail.subject, &mail.body())?;

        info!("Sent {} mail to {}", notification.name(), to);
        Ok(MailLeg::Sent)
    }
}

fn notify_db(
    conn: &Connection,
    notifiable: &dyn Notifiable,
    notification: &Notification,
) -> Result<DatabaseLeg> {
    let Some(payload) = notification.database_payload() else {
        return Ok(DatabaseLeg::Skipped);
    };

    let id = dolist_db::savepoint(conn, "notify_db", |conn| -> Result<i64> {
        let content = serde_json::to_string(payload)?;
        let id = notifications::insert(
            conn,
            notifiable.route_for_db(),
            notification.name(),
            notification.subject_id(),
            &content,
        )?;
        Ok(id)
    })?;

    Ok(DatabaseLeg::Committed(id))
}
