//! Crossfade task: interpolates the base-layer (input 0) weight over a fixed duration.

use layermix_scheduler_core::{FrameTask, TaskPoll, TIME_EPSILON};

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Time-driven interpolation of the input-0 weight from `from` to `to`.
///
/// Elapsed frame time is accumulated and the task completes once it is within
/// [`TIME_EPSILON`] of `duration`. The overlay weight is always the
/// complement, so one scalar drives both mixer inputs.
#[derive(Debug, Clone)]
pub struct BlendTask {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl BlendTask {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Base layer fades out, overlay fades in.
    pub fn fade_in_overlay(duration: f32) -> Self {
        Self::new(1.0, 0.0, duration)
    }

    /// Overlay fades out, base layer fades back in.
    pub fn fade_out_overlay(duration: f32) -> Self {
        Self::new(0.0, 1.0, duration)
    }

    /// Fraction of the blend covered so far, in `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 && self.duration.is_finite() {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        }
    }
}

impl FrameTask for BlendTask {
    /// Input-0 weight for this frame.
    type Output = f32;

    fn advance(&mut self, dt: f32) -> TaskPoll<f32> {
        self.elapsed += dt.max(0.0);
        let finite = self.duration > 0.0 && self.duration.is_finite();
        if !finite || self.elapsed >= self.duration - TIME_EPSILON {
            self.elapsed = if finite { self.duration } else { 0.0 };
            TaskPoll::Done(self.to)
        } else {
            TaskPoll::Yield(lerp(self.from, self.to, self.progress()))
        }
    }
}
