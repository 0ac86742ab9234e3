//! Scheduler: owns running tasks by handle and advances them once per frame.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::task::{FrameTask, TaskPoll};

/// Opaque handle to a task started with [`Scheduler::run`]. Handles are never reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(pub u64);

/// Single-threaded cooperative scheduler.
///
/// Tasks are advanced in the order they were started. Killing a task removes
/// it immediately, so a task killed part-way through a frame is not advanced
/// for the rest of that frame.
#[derive(Debug)]
pub struct Scheduler<T> {
    next: u64,
    tasks: Vec<(TaskHandle, T)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next: 0,
            tasks: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a task; it is first advanced on the next frame.
    pub fn run(&mut self, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next);
        self.next = self.next.wrapping_add(1);
        self.tasks.push((handle, task));
        trace!("task {} started", handle.0);
        handle
    }

    /// Cancel a task. Returns false if it had already finished or been killed.
    pub fn kill(&mut self, handle: TaskHandle) -> bool {
        match self.tasks.iter().position(|(h, _)| *h == handle) {
            Some(idx) => {
                self.tasks.remove(idx);
                trace!("task {} killed", handle.0);
                true
            }
            None => false,
        }
    }

    /// Cancel every task; returns how many were running.
    pub fn kill_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn is_running(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|(h, _)| *h == handle)
    }

    pub fn get(&self, handle: TaskHandle) -> Option<&T> {
        self.tasks
            .iter()
            .find_map(|(h, t)| if *h == handle { Some(t) } else { None })
    }

    /// Snapshot of running handles in advance order.
    pub fn handles(&self) -> Vec<TaskHandle> {
        self.tasks.iter().map(|(h, _)| *h).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T: FrameTask> Scheduler<T> {
    /// Advance a single task. Returns None if the handle is no longer running;
    /// a task that reports `Done` is removed.
    pub fn step(&mut self, handle: TaskHandle, dt: f32) -> Option<TaskPoll<T::Output>> {
        let idx = self.tasks.iter().position(|(h, _)| *h == handle)?;
        let poll = self.tasks[idx].1.advance(dt);
        if poll.is_done() {
            self.tasks.remove(idx);
            trace!("task {} finished", handle.0);
        }
        Some(poll)
    }

    /// Advance every running task once, collecting the values they produced.
    ///
    /// Use [`Scheduler::step`] over a [`Scheduler::handles`] snapshot instead
    /// when applying a value may cancel other tasks in the same frame.
    pub fn tick(&mut self, dt: f32) -> Vec<(TaskHandle, TaskPoll<T::Output>)> {
        let mut out = Vec::new();
        for handle in self.handles() {
            if let Some(poll) = self.step(handle, dt) {
                if !matches!(poll, TaskPoll::Pending) {
                    out.push((handle, poll));
                }
            }
        }
        out
    }
}
