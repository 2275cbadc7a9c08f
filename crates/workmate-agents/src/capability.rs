use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use workmate_core::Task;

/// The fixed set of task types an executor declares at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    task_types: BTreeSet<String>,
}

impl CapabilitySet {
    pub fn new<I, S>(task_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            task_types: task_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Membership test on `task.task_type`.
    pub fn supports(&self, task: &Task) -> bool {
        self.contains(&task.task_type)
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.task_types.contains(task_type)
    }

    /// Owned copy of the declared set; mutating it never affects `self`.
    pub fn to_set(&self) -> BTreeSet<String> {
        self.task_types.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.task_types.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.task_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.task_types.is_empty()
    }
}
