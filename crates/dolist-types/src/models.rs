use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_by_id: i64,
    pub members: Vec<TeamMember>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Team {
    /// Returns the membership of `user_id`, if any.
    pub fn member(&self, user_id: i64) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.user.id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user: User,
    pub admin: bool,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub namespace_id: i64,
    pub owner_id: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub description: String,
    pub done: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder: Option<DateTime<Utc>>,
    pub list_id: i64,
    pub created_by_id: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// A notification as persisted for a user's feed. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseNotification {
    pub id: i64,
    pub notifiable_id: i64,
    pub name: String,
    pub subject_id: Option<i64>,
    /// Serialized notification payload, opaque to the store.
    pub notification: serde_json::Value,
    pub created: DateTime<Utc>,
}
