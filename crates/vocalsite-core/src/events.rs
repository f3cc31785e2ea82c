//! Explicit change events
//!
//! Buffer and preview-config mutations publish events onto a bus instead of
//! relying on a hidden reactive rerun. The session drains the bus after every
//! mutation and routes events to the preview controller, which applies its
//! auto-refresh policy.

use std::collections::VecDeque;

use crate::buffers::BufferKind;

/// A state change that may interest the preview
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A source buffer was replaced or edited
    BufferEdited(BufferKind),
    /// The outline-debug overlay was toggled; the document must recompose
    OutlinesToggled,
    /// A layout-only config change (width, zoom, preset); never recomposes
    LayoutChanged,
}

/// Single-threaded publish/drain event queue
#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<ChangeEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next drain
    pub fn publish(&mut self, event: ChangeEvent) {
        self.queue.push_back(event);
    }

    /// Take all queued events in publish order
    pub fn drain(&mut self) -> impl Iterator<Item = ChangeEvent> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
