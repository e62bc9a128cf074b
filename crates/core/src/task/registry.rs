//! In-memory live task map and active working set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::types::{Task, TaskId, TaskStatus};

/// Shared view over the current batch's tasks.
///
/// The map and active set are the aggregate collections read concurrently
/// by the aggregator and the API layer while workers write individual
/// tasks, so both live behind locks. Each `Task` itself is guarded by its
/// own lock but written by exactly one worker.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: RwLock<HashMap<TaskId, Arc<RwLock<Task>>>>,
    /// Preserves submission order for listing.
    order: RwLock<Vec<TaskId>>,
    active: RwLock<HashSet<TaskId>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, task: Task) -> Arc<RwLock<Task>> {
        let id = task.id.clone();
        let handle = Arc::new(RwLock::new(task));
        self.tasks.write().await.insert(id.clone(), handle.clone());
        self.order.write().await.push(id);
        handle
    }

    pub async fn get(&self, id: &str) -> Option<Arc<RwLock<Task>>> {
        self.tasks.read().await.get(id).cloned()
    }

    /// Cloned snapshots of every task in submission order.
    pub async fn all(&self) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        let order = self.order.read().await;
        let mut out = Vec::with_capacity(order.len());
        for id in order.iter() {
            if let Some(handle) = tasks.get(id) {
                out.push(handle.read().await.clone());
            }
        }
        out
    }

    /// Cloned snapshots of currently active tasks.
    pub async fn active_snapshots(&self) -> Vec<Task> {
        let active = self.active.read().await.clone();
        let tasks = self.tasks.read().await;
        let mut out = Vec::with_capacity(active.len());
        for id in active.iter() {
            if let Some(handle) = tasks.get(id) {
                out.push(handle.read().await.clone());
            }
        }
        out
    }

    pub async fn mark_active(&self, id: &str) {
        self.active.write().await.insert(id.to_string());
    }

    pub async fn mark_inactive(&self, id: &str) {
        self.active.write().await.remove(id);
    }

    pub async fn active_count(&self) -> usize {
        self.active.read().await.len()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Number of tasks in a terminal state.
    pub async fn terminal_count(&self) -> usize {
        let mut count = 0;
        for task in self.all().await {
            if task.status.is_terminal() {
                count += 1;
            }
        }
        count
    }

    /// Count of tasks with the given status.
    pub async fn count_status(&self, status: TaskStatus) -> usize {
        self.all()
            .await
            .iter()
            .filter(|t| t.status == status)
            .count()
    }

    /// Discard the live view. Workers holding task handles keep their
    /// clones; the discarded tasks simply stop being visible.
    pub async fn clear(&self) {
        self.tasks.write().await.clear();
        self.order.write().await.clear();
        self.active.write().await.clear();
    }
}
