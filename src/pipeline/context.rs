//! Context threaded between the tasks of a pipeline

use crate::model::Project;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Shallow key/value context plus the resolved project, once a task has
/// produced one.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    values: Map<String, Value>,
    project: Option<Arc<Project>>,
}

impl TaskContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Map<String, Value>) -> Self {
        Self {
            values,
            project: None,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_project(mut self, project: Arc<Project>) -> Self {
        self.project = Some(project);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn project(&self) -> Option<&Arc<Project>> {
        self.project.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.project.is_none()
    }

    /// Overlays `newer` onto this context: its keys replace ours, keys it
    /// leaves unset are inherited, and its project wins when it has one.
    pub fn merge(mut self, newer: TaskContext) -> TaskContext {
        self.values.extend(newer.values);
        if newer.project.is_some() {
            self.project = newer.project;
        }
        self
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use serde_json::json;

    fn project(root: &str) -> Arc<Project> {
        Arc::new(Project::new(Arc::new(MockFileSystem::new()), root, true, root, vec![]).unwrap())
    }

    #[test]
    fn test_merge_is_union_with_newer_winning() {
        let older = TaskContext::new().with("a", 1).with("shared", "old");
        let newer = TaskContext::new().with("b", 2).with("shared", "new");

        let merged = older.merge(newer);
        assert_eq!(merged.to_value(), json!({"a": 1, "b": 2, "shared": "new"}));
    }

    #[test]
    fn test_merge_keeps_project_unless_replaced() {
        let older = TaskContext::new().with_project(project("/one"));

        let kept = older.clone().merge(TaskContext::new().with("x", true));
        assert_eq!(
            kept.project().map(|p| p.root_directory().to_path_buf()),
            Some("/one".into())
        );

        let replaced = older.merge(TaskContext::new().with_project(project("/two")));
        assert_eq!(
            replaced.project().map(|p| p.root_directory().to_path_buf()),
            Some("/two".into())
        );
    }

    #[test]
    fn test_empty() {
        assert!(TaskContext::default().is_empty());
        assert!(!TaskContext::new().with("a", 1).is_empty());
        assert_eq!(TaskContext::new().with("error", "boom").get_str("error"), Some("boom"));
    }
}
