//! Microtask queue.
//!
//! Microtasks run after the currently executing callback returns and before
//! the next timer or input event is processed. The queue is generic over the
//! task type and never executes anything itself.

use std::collections::VecDeque;

/// A unique identifier for a queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

struct TaskData<T> {
    id: TaskId,
    task: T,
}

/// FIFO queue of pending microtasks.
pub struct TaskQueue<T> {
    tasks: VecDeque<TaskData<T>>,
    next_id: u64,
}

impl<T> TaskQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Queue a task at the back.
    pub fn post(&mut self, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push_back(TaskData { id, task });
        id
    }

    /// Cancel a pending task.
    ///
    /// Returns `true` if the task was found and removed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(pos) = self.tasks.iter().position(|t| t.id == id) {
            self.tasks.remove(pos);
            true
        } else {
            false
        }
    }

    /// Take the oldest pending task.
    pub fn pop(&mut self) -> Option<T> {
        self.tasks.pop_front().map(|t| t.task)
    }

    /// Check if there are any pending tasks.
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Get the number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TaskQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.tasks.len())
            .finish()
    }
}
