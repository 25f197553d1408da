use rusqlite::Connection;

use dolist_types::models::User;

use crate::notifications::Notifier;

/// Per-request scope: the store handle, the authenticated user, and where
/// notifications go.
#[derive(Clone, Copy)]
pub struct Ctx<'a> {
    pub conn: &'a Connection,
    pub doer: &'a User,
    pub notifier: &'a Notifier,
}

impl<'a> Ctx<'a> {
    pub fn new(conn: &'a Connection, doer: &'a User, notifier: &'a Notifier) -> Self {
        Self {
            conn,
            doer,
            notifier,
        }
    }
}
