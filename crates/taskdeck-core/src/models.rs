//! Data models for taskdeck
//!
//! Wire representations of the backend's todos, users and statistics,
//! plus the create/patch bodies sent for each collection.
//! Entities are owned by the backend; the client only holds cached copies.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a todo
pub type TodoId = i64;

/// Identifier of a user
pub type UserId = i64;

/// A todo item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// User the todo is assigned to
    #[serde(default)]
    pub assigned_user_id: Option<UserId>,
    /// Denormalized name of the assigned user, for display
    #[serde(default)]
    pub assigned_user_name: Option<String>,
}

/// Body of `POST /todos`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewTodo {
    pub title: String,
    pub user_id: Option<UserId>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            user_id: None,
        }
    }

    /// Assign the new todo to a user
    pub fn assigned_to(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Partial update body of `PUT /todos/:id`
///
/// Absent fields are left untouched by the server. `user_id: Some(None)`
/// is sent as `null` and unassigns the todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub user_id: Option<Option<UserId>>,
}

impl TodoPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn assign(user_id: Option<UserId>) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }
}

/// User role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role '{}'. Use 'user' or 'admin'.", other)),
        }
    }
}

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Upper-cased first letter of the name, shown as an avatar
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('?')
    }
}

/// Body of `POST /users`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
        }
    }
}

/// Partial update body of `PUT /users/:id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }
}

/// Server statistics snapshot, recomputed by the backend on every fetch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub total_todos: u64,
    #[serde(default)]
    pub completed_todos: u64,
    #[serde(default)]
    pub pending_todos: u64,
    #[serde(default)]
    pub total_users: u64,
    /// Server uptime in seconds
    #[serde(default, alias = "serverUptimeSeconds")]
    pub server_uptime: f64,
    pub timestamp: DateTime<Utc>,
}

impl Stats {
    /// Uptime truncated to whole seconds
    pub fn uptime_secs(&self) -> u64 {
        self.server_uptime.max(0.0).floor() as u64
    }
}

/// Body of `GET /health`; every field is optional
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Health {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub uptime: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T: Deserialize<'de>, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<T>>, D::Error> {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
