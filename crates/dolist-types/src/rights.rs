use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Team, User};

/// Permission level on a namespace, list or team. Ordered `Read < Write < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Right {
    Read,
    Write,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid right value {0}")]
pub struct InvalidRight(pub i64);

impl Right {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Read => 0,
            Self::Write => 1,
            Self::Admin => 2,
        }
    }
}

impl TryFrom<i64> for Right {
    type Error = InvalidRight;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Read),
            1 => Ok(Self::Write),
            2 => Ok(Self::Admin),
            other => Err(InvalidRight(other)),
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} kind '{value}'")]
pub struct UnknownKind {
    pub what: &'static str,
    pub value: String,
}

/// Who a right is granted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Subject {
    User(i64),
    Team(i64),
}

impl Subject {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Team(_) => "team",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::User(id) | Self::Team(id) => *id,
        }
    }

    pub fn from_parts(kind: &str, id: i64) -> Result<Self, UnknownKind> {
        match kind {
            "user" => Ok(Self::User(id)),
            "team" => Ok(Self::Team(id)),
            other => Err(UnknownKind {
                what: "subject",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// A resource rights can be granted on. Only containers carry grants;
/// tasks inherit from their list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ShareTarget {
    Namespace(i64),
    List(i64),
}

impl ShareTarget {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Namespace(_) => ResourceKind::Namespace,
            Self::List(_) => ResourceKind::List,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Namespace(id) | Self::List(id) => *id,
        }
    }
}

impl fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Namespace,
    List,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::List => "list",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "namespace" => Ok(Self::Namespace),
            "list" => Ok(Self::List),
            other => Err(UnknownKind {
                what: "resource",
                value: other.to_string(),
            }),
        }
    }
}

impl ResourceKind {
    pub fn target(self, id: i64) -> ShareTarget {
        match self {
            Self::Namespace => ShareTarget::Namespace(id),
            Self::List => ShareTarget::List(id),
        }
    }
}

/// A stored right association. Unique per (subject, target).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub id: i64,
    pub subject: Subject,
    pub target: ShareTarget,
    pub right: Right,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithRight {
    pub user: User,
    pub right: Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamWithRight {
    pub team: Team,
    pub right: Right,
}
