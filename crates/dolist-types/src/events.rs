use serde::{Deserialize, Serialize};

use crate::rights::Right;

/// Domain events a user can be notified about.
///
/// Each variant decides which renderings it has: a mail, a persisted feed entry,
/// or both. Instances are built once and handed to the dispatcher read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Notification {
    /// The recipient was added to a team
    TeamMemberAdded {
        team_id: i64,
        team_name: String,
        doer: String,
    },

    /// A namespace was shared with the recipient
    NamespaceShared {
        namespace_id: i64,
        namespace_title: String,
        doer: String,
        right: Right,
    },

    /// A list was shared with the recipient
    ListShared {
        list_id: i64,
        list_title: String,
        doer: String,
        right: Right,
    },

    /// Someone else marked one of the recipient's tasks as done
    TaskDone {
        task_id: i64,
        task_text: String,
        list_id: i64,
        doer: String,
    },

    /// A password reset was requested. Mail only; the token is never persisted.
    PasswordResetRequested { username: String, token: String },
}

impl Notification {
    /// Stable type tag stored alongside persisted notifications.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TeamMemberAdded { .. } => "team.member.added",
            Self::NamespaceShared { .. } => "namespace.shared",
            Self::ListShared { .. } => "list.shared",
            Self::TaskDone { .. } => "task.done",
            Self::PasswordResetRequested { .. } => "user.password.reset.requested",
        }
    }

    /// Returns the id of the entity this notification is about, if it has one.
    pub fn subject_id(&self) -> Option<i64> {
        match self {
            Self::TeamMemberAdded { team_id, .. } => Some(*team_id),
            Self::NamespaceShared { namespace_id, .. } => Some(*namespace_id),
            Self::ListShared { list_id, .. } => Some(*list_id),
            Self::TaskDone { task_id, .. } => Some(*task_id),
            Self::PasswordResetRequested { .. } => None,
        }
    }

    /// The mail rendering, or `None` when this notification is never mailed.
    pub fn to_mail(&self) -> Option<Mail> {
        match self {
            Self::TeamMemberAdded { team_name, doer, .. } => Some(
                Mail::new(format!("{doer} added you to the {team_name} team"))
                    .line(format!("{doer} has added you to the team {team_name}."))
                    .line("You now have access to everything shared with this team."),
            ),
            Self::NamespaceShared {
                namespace_title,
                doer,
                right,
                ..
            } => Some(
                Mail::new(format!("{doer} shared the namespace {namespace_title} with you"))
                    .line(format!(
                        "{doer} gave you {right} access to the namespace {namespace_title}."
                    )),
            ),
            Self::ListShared {
                list_title,
                doer,
                right,
                ..
            } => Some(
                Mail::new(format!("{doer} shared the list {list_title} with you"))
                    .line(format!("{doer} gave you {right} access to the list {list_title}.")),
            ),
            Self::TaskDone { .. } => None,
            Self::PasswordResetRequested { username, token } => Some(
                Mail::new("Reset your password")
                    .greeting(format!("Hi {username},"))
                    .line("To reset your password, use the following token:")
                    .line(token.clone())
                    .line("If you did not request a reset, you can ignore this mail."),
            ),
        }
    }

    /// The payload persisted to the notification feed, or `None` when this
    /// notification is never stored.
    pub fn database_payload(&self) -> Option<&Self> {
        match self {
            Self::PasswordResetRequested { .. } => None,
            _ => Some(self),
        }
    }
}

/// A rendered mail. The recipient comes from the notifiable at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub subject: String,
    pub greeting: String,
    pub lines: Vec<String>,
}

impl Mail {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            greeting: "Hi,".into(),
            lines: Vec::new(),
        }
    }

    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Plain text body: greeting, then one paragraph per line.
    pub fn body(&self) -> String {
        let mut body = self.greeting.clone();
        for line in &self.lines {
            body.push_str("\n\n");
            body.push_str(line);
        }
        body
    }
}
