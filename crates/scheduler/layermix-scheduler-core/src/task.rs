//! The cooperative task contract: a task is advanced once per frame.

/// Frame-time tolerance, in seconds, for deadlines and durations.
///
/// Summing per-frame `f32` deltas drifts by a few ulps; anything closer than
/// this to a deadline counts as having reached it.
pub const TIME_EPSILON: f32 = 1e-4;

/// Result of advancing a task by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskPoll<O> {
    /// Still suspended (e.g. waiting out a delay); nothing to apply this frame.
    Pending,
    /// Produced a value and wants to be advanced again next frame.
    Yield(O),
    /// Produced its final value; the driver drops the task.
    Done(O),
}

impl<O> TaskPoll<O> {
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, TaskPoll::Done(_))
    }

    /// Value produced this frame, if any.
    #[inline]
    pub fn value(self) -> Option<O> {
        match self {
            TaskPoll::Pending => None,
            TaskPoll::Yield(v) | TaskPoll::Done(v) => Some(v),
        }
    }
}

/// A unit of cooperative, frame-driven work.
///
/// `advance` is called at most once per frame with that frame's elapsed time.
/// Tasks never observe cancellation: a cancelled task is simply never advanced
/// again.
pub trait FrameTask {
    type Output;

    fn advance(&mut self, dt: f32) -> TaskPoll<Self::Output>;
}
