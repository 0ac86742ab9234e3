//! Observer registration for the "one-shot finished" notification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Returned by [`OverlayAnimationMixer::on_one_shot_finished`](crate::OverlayAnimationMixer::on_one_shot_finished);
/// pass it back to remove the listener.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

/// Synchronously invoked callbacks, in registration order.
#[derive(Default)]
pub struct FinishedListeners {
    next: u32,
    listeners: Vec<(ListenerId, Box<dyn FnMut()>)>,
}

impl FinishedListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Box<dyn FnMut()>) -> ListenerId {
        let id = ListenerId(self.next);
        self.next = self.next.wrapping_add(1);
        self.listeners.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for FinishedListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinishedListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
