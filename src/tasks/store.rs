//! In-memory task store.
//!
//! # Responsibilities
//! - Hold tasks in insertion order
//! - Allocate identifiers from a monotonic counter seeded at 1
//! - Look up, update and remove tasks by identifier
//!
//! # Design Decisions
//! - A single `parking_lot::Mutex` guards both the list and the counter, so
//!   uniqueness and ordering hold under a multi-threaded runtime
//! - Reads hand out clones; the internal Vec is never exposed

use chrono::Utc;
use parking_lot::Mutex;

use crate::tasks::model::{Task, TaskId};

/// Ordered, thread-safe collection of tasks.
#[derive(Debug)]
pub struct TaskStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    tasks: Vec<Task>,
    next_id: u64,
}

impl StoreInner {
    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                tasks: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Append a new, not yet completed task and return it.
    pub fn append(&self, title: impl Into<String>) -> Task {
        let mut inner = self.inner.lock();
        let id = TaskId::new(inner.next_id);
        inner.next_id += 1;

        let task = Task::new(id, title.into(), Utc::now());
        inner.tasks.push(task.clone());
        task
    }

    /// Snapshot of all tasks in insertion order.
    pub fn list(&self) -> Vec<Task> {
        self.inner.lock().tasks.clone()
    }

    /// Find a task by identifier.
    pub fn find_by_id(&self, id: TaskId) -> Option<Task> {
        let inner = self.inner.lock();
        inner.position(id).map(|index| inner.tasks[index].clone())
    }

    /// Set the completion flag. Returns `None` without mutating if the id is unknown.
    pub fn update_completed(&self, id: TaskId, completed: bool) -> Option<Task> {
        let mut inner = self.inner.lock();
        let index = inner.position(id)?;
        let task = &mut inner.tasks[index];
        task.completed = completed;
        Some(task.clone())
    }

    /// Remove a task, preserving the order of the rest.
    pub fn remove(&self, id: TaskId) -> Option<Task> {
        let mut inner = self.inner.lock();
        let index = inner.position(id)?;
        Some(inner.tasks.remove(index))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
