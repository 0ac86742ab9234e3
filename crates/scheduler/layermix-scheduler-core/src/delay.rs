use crate::task::{FrameTask, TaskPoll, TIME_EPSILON};

/// Waits `seconds` of frame time, then runs the wrapped task.
///
/// Time left over on the frame the wait ends is handed to the wrapped task
/// on that same frame. A frame that lands on the deadline (within
/// [`TIME_EPSILON`]) starts the wrapped task on the next frame.
#[derive(Debug, Clone)]
pub struct Delayed<T> {
    remaining: f32,
    started: bool,
    inner: T,
}

impl<T> Delayed<T> {
    /// Non-finite or negative delays mean "no wait".
    pub fn new(seconds: f32, inner: T) -> Self {
        let remaining = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        Self {
            remaining,
            started: false,
            inner,
        }
    }

    /// Run `inner` starting with the next advance.
    pub fn immediate(inner: T) -> Self {
        Self::new(0.0, inner)
    }

    #[inline]
    pub fn is_waiting(&self) -> bool {
        self.remaining > 0.0
    }

    /// True once the wrapped task has been advanced at least once.
    #[inline]
    pub fn has_started(&self) -> bool {
        self.started
    }

    #[inline]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: FrameTask> FrameTask for Delayed<T> {
    type Output = T::Output;

    fn advance(&mut self, dt: f32) -> TaskPoll<T::Output> {
        if self.remaining > 0.0 {
            let left = self.remaining - dt;
            if left > TIME_EPSILON {
                self.remaining = left;
                return TaskPoll::Pending;
            }
            self.remaining = 0.0;
            if left >= -TIME_EPSILON {
                return TaskPoll::Pending;
            }
            self.started = true;
            return self.inner.advance(-left);
        }
        self.started = true;
        self.inner.advance(dt)
    }
}
