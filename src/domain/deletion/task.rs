//! Deletion requests and their per-flush grouping.

use std::collections::HashMap;

use super::DeleterError;

/// A request to soft-delete some of a user's short IDs.
///
/// Created by the delete handler and consumed exactly once by the
/// accumulator. Ownership of the IDs is not checked here; the repository
/// ignores IDs that do not belong to `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTask {
    user_id: String,
    short_ids: Vec<String>,
}

impl DeletionTask {
    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns [`DeleterError::InvalidTask`] if `user_id` or `short_ids` is empty.
    pub fn new(user_id: String, short_ids: Vec<String>) -> Result<Self, DeleterError> {
        if user_id.is_empty() {
            return Err(DeleterError::InvalidTask("user id must not be empty"));
        }
        if short_ids.is_empty() {
            return Err(DeleterError::InvalidTask("short id list must not be empty"));
        }
        Ok(Self { user_id, short_ids })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn short_ids(&self) -> &[String] {
        &self.short_ids
    }
}

/// Short IDs of a flushed batch, grouped by user.
///
/// IDs keep the order in which their tasks were buffered and are not
/// deduplicated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UserGroupedIds {
    groups: HashMap<String, Vec<String>>,
}

impl UserGroupedIds {
    /// Groups a batch by user, consuming it.
    pub fn from_tasks(tasks: impl IntoIterator<Item = DeletionTask>) -> Self {
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for task in tasks {
            groups
                .entry(task.user_id)
                .or_default()
                .extend(task.short_ids);
        }
        Self { groups }
    }

    /// Number of distinct users.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, user_id: &str) -> Option<&[String]> {
        self.groups.get(user_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(user, ids)| (user.as_str(), ids.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(user: &str, ids: &[&str]) -> DeletionTask {
        DeletionTask::new(
            user.to_string(),
            ids.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_task_rejects_empty_user() {
        let result = DeletionTask::new(String::new(), vec!["a".to_string()]);
        assert!(matches!(result, Err(DeleterError::InvalidTask(_))));
    }

    #[test]
    fn test_task_rejects_empty_ids() {
        let result = DeletionTask::new("u1".to_string(), vec![]);
        assert!(matches!(result, Err(DeleterError::InvalidTask(_))));
    }

    #[test]
    fn test_grouping_unions_ids_per_user_in_order() {
        let grouped = UserGroupedIds::from_tasks(vec![
            task("u1", &["a"]),
            task("u2", &["x"]),
            task("u1", &["b", "c"]),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.get("u1").unwrap(), ["a", "b", "c"]);
        assert_eq!(grouped.get("u2").unwrap(), ["x"]);
    }

    #[test]
    fn test_grouping_keeps_duplicates() {
        let grouped = UserGroupedIds::from_tasks(vec![task("u1", &["a"]), task("u1", &["a"])]);
        assert_eq!(grouped.get("u1").unwrap(), ["a", "a"]);
    }

    #[test]
    fn test_grouping_empty_batch() {
        let grouped = UserGroupedIds::from_tasks(Vec::new());
        assert!(grouped.is_empty());
        assert!(grouped.get("u1").is_none());
    }
}
