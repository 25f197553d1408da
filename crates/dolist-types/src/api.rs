use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::models::{List, Namespace, Task, Team};

// -- Users --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

// -- Teams --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Partial team update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl TeamPatch {
    pub fn apply_to(self, team: &mut Team) {
        if let Some(name) = self.name {
            team.name = name;
        }
        if let Some(description) = self.description {
            team.description = description;
        }
    }
}

// -- Namespaces --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewNamespace {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NamespacePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl NamespacePatch {
    pub fn apply_to(self, namespace: &mut Namespace) {
        if let Some(title) = self.title {
            namespace.title = title;
        }
        if let Some(description) = self.description {
            namespace.description = description;
        }
    }
}

// -- Lists --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewList {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ListPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ListPatch {
    pub fn apply_to(self, list: &mut List) {
        if let Some(title) = self.title {
            list.title = title;
        }
        if let Some(description) = self.description {
            list.description = description;
        }
    }
}

// -- Tasks --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTask {
    pub text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminder: Option<DateTime<Utc>>,
}

/// Partial task update.
///
/// Every field distinguishes "absent" from "set": `done: Some(false)` reopens a
/// task, `done: None` keeps whatever is stored. Nullable columns use a nested
/// option so `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(deserialize_with = "present")]
    pub reminder: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn apply_to(self, task: &mut Task) {
        if let Some(text) = self.text {
            task.text = text;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(done) = self.done {
            task.done = done;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(reminder) = self.reminder {
            task.reminder = reminder;
        }
    }
}

/// A field that is present in the payload maps to `Some`, even when it is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
