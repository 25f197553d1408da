//! Shared fixtures: an in-memory database, users, and a transport that records
//! every mail it is asked to send.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use dolist_core::notifications::{MailTransport, Notifier, TransportError};
use dolist_core::{Ctx, namespaces, lists, tasks};
use dolist_db::Database;
use dolist_types::api::{NewList, NewNamespace, NewTask};
use dolist_types::models::{List, Namespace, Task, User};
use rusqlite::Connection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl MailTransport for RecordingTransport {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("mail server down".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        });
        Ok(())
    }
}

pub struct Fixture {
    pub db: Database,
    pub mail: Arc<RecordingTransport>,
    pub notifier: Notifier,
}

impl Fixture {
    pub fn new() -> Self {
        let mail = Arc::new(RecordingTransport::default());
        Self {
            db: Database::open_in_memory().unwrap(),
            notifier: Notifier::new(mail.clone()),
            mail,
        }
    }

    pub fn ctx<'a>(&'a self, conn: &'a Connection, doer: &'a User) -> Ctx<'a> {
        Ctx::new(conn, doer, &self.notifier)
    }
}

/// Inserts a user directly, skipping password hashing.
pub fn user(conn: &Connection, username: &str) -> User {
    let id = dolist_db::users::insert(
        conn,
        username,
        &format!("{username}@example.com"),
        "not-a-hash",
    )
    .unwrap();
    dolist_db::users::get_by_id(conn, id).unwrap().unwrap()
}

pub fn namespace(ctx: &Ctx, title: &str) -> Namespace {
    namespaces::create(
        ctx,
        NewNamespace {
            title: title.into(),
            description: String::new(),
        },
    )
    .unwrap()
}

pub fn list(ctx: &Ctx, namespace_id: i64, title: &str) -> List {
    lists::create(
        ctx,
        namespace_id,
        NewList {
            title: title.into(),
            description: String::new(),
        },
    )
    .unwrap()
}

pub fn task(ctx: &Ctx, list_id: i64, text: &str) -> Task {
    tasks::create(
        ctx,
        list_id,
        NewTask {
            text: text.into(),
            description: String::new(),
            due_date: None,
            reminder: None,
        },
    )
    .unwrap()
}
