use std::collections::HashSet;

use super::types::{InputEvent, Key};

/// Input that arrived since the previous frame.
///
/// Held keys and pointer position live in `InputState`; this only carries the
/// transitions. The runtime clears it after every `on_frame`.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Events in arrival order.
    pub events: Vec<InputEvent>,
    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
}

impl InputFrame {
    /// `true` if `key` went down during this frame (repeats excluded).
    pub fn pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
    }
}
