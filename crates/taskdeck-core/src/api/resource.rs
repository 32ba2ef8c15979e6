//! Collection resources
//!
//! Describes each backend collection once (path, display nouns, create and
//! patch bodies) so the client and the synchronizer stay generic.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{NewTodo, NewUser, Todo, TodoPatch, User, UserPatch};

/// An entity living in a REST collection
pub trait Resource: Clone + Send + Sync + DeserializeOwned + 'static {
    /// Fields sent to create an entity
    type Draft: Serialize + Send + Sync;
    /// Partial fields sent to update an entity
    type Patch: Serialize + Send + Sync;

    /// Collection path relative to the API base URL
    const PATH: &'static str;
    /// Singular noun used in messages ("todo")
    const SINGULAR: &'static str;
    /// Plural noun used in messages ("todos")
    const PLURAL: &'static str;

    fn id(&self) -> i64;

    /// Whether every required text field of a draft is non-blank
    fn is_complete(draft: &Self::Draft) -> bool;
}

impl Resource for Todo {
    type Draft = NewTodo;
    type Patch = TodoPatch;

    const PATH: &'static str = "/todos";
    const SINGULAR: &'static str = "todo";
    const PLURAL: &'static str = "todos";

    fn id(&self) -> i64 {
        self.id
    }

    fn is_complete(draft: &NewTodo) -> bool {
        !draft.title.trim().is_empty()
    }
}

impl Resource for User {
    type Draft = NewUser;
    type Patch = UserPatch;

    const PATH: &'static str = "/users";
    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";

    fn id(&self) -> i64 {
        self.id
    }

    fn is_complete(draft: &NewUser) -> bool {
        !draft.name.trim().is_empty() && !draft.email.trim().is_empty()
    }
}
