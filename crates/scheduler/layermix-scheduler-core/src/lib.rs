//! layermix scheduler core
//!
//! Frame-driven cooperative tasks: a [`FrameTask`] is advanced once per frame
//! with the frame's elapsed time, [`Delayed`] adds a wait-for-seconds prefix,
//! and a [`Scheduler`] owns running tasks and cancels them by [`TaskHandle`].

pub mod delay;
pub mod scheduler;
pub mod task;

pub use delay::Delayed;
pub use scheduler::{Scheduler, TaskHandle};
pub use task::{FrameTask, TaskPoll, TIME_EPSILON};
