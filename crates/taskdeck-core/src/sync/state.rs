//! Cached view state
//!
//! What a view renders: the cached items, whether a fetch is running and
//! the last failure message. Stale items stay visible next to an error.

use crate::api::Resource;

/// Where a newly created entity is placed in the cached list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertOrder {
    /// Add to the end (server list order)
    #[default]
    Append,
    /// Add to the front (newest first)
    Prepend,
}

/// Snapshot of one cached collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<R> {
    /// Cached entities in server order
    pub items: Vec<R>,
    /// Whether a refresh is in flight
    pub is_loading: bool,
    /// Fixed message of the last failed operation
    pub error: Option<String>,
    /// Whether at least one refresh has completed
    pub loaded: bool,
}

impl<R> Default for CollectionState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
            loaded: false,
        }
    }
}

impl<R: Resource> CollectionState<R> {
    /// Find a cached entity by id
    pub fn find(&self, id: i64) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.find(id).is_some()
    }

    /// Insert a server-confirmed entity
    ///
    /// An entity with the same id already in the cache is dropped first, so a
    /// create racing a refresh never leaves duplicates.
    pub(crate) fn insert(&mut self, entity: R, order: InsertOrder) {
        let id = entity.id();
        self.items.retain(|item| item.id() != id);
        match order {
            InsertOrder::Append => self.items.push(entity),
            InsertOrder::Prepend => self.items.insert(0, entity),
        }
    }

    /// Replace the entity with the same id, keeping its position
    pub(crate) fn replace(&mut self, entity: R) {
        let id = entity.id();
        if let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) {
            *slot = entity;
        }
    }

    pub(crate) fn remove(&mut self, id: i64) {
        self.items.retain(|item| item.id() != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Todo;
    use chrono::Utc;

    fn todo(id: i64, title: &str) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            completed: false,
            created_at: Utc::now(),
            assigned_user_id: None,
            assigned_user_name: None,
        }
    }

    fn ids(state: &CollectionState<Todo>) -> Vec<i64> {
        state.items.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_insert_orders() {
        let mut state = CollectionState {
            items: vec![todo(1, "A")],
            ..CollectionState::default()
        };

        state.insert(todo(2, "B"), InsertOrder::Append);
        assert_eq!(ids(&state), vec![1, 2]);

        state.insert(todo(3, "C"), InsertOrder::Prepend);
        assert_eq!(ids(&state), vec![3, 1, 2]);
    }

    #[test]
    fn test_insert_existing_id_does_not_duplicate() {
        let mut state = CollectionState {
            items: vec![todo(1, "A"), todo(2, "B")],
            ..CollectionState::default()
        };

        state.insert(todo(2, "B again"), InsertOrder::Append);

        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.find(2).unwrap().title, "B again");
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut state = CollectionState {
            items: vec![todo(1, "A"), todo(2, "B"), todo(3, "C")],
            ..CollectionState::default()
        };

        state.replace(todo(2, "B2"));
        assert_eq!(ids(&state), vec![1, 2, 3]);
        assert_eq!(state.items[1].title, "B2");

        // Unknown ids are ignored
        state.replace(todo(9, "Z"));
        assert_eq!(ids(&state), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove() {
        let mut state = CollectionState {
            items: vec![todo(1, "A"), todo(2, "B")],
            ..CollectionState::default()
        };

        state.remove(1);
        assert_eq!(ids(&state), vec![2]);
        assert!(!state.contains(1));
    }
}
