//! Canonical-path resolution over a branching swipe log.
//!
//! Each chat message may have several alternative continuations ("swipes");
//! exactly one per message is currently displayed. The event log physically
//! holds events from every branch; a [`SwipeContext`] converts that
//! multi-branch log into one linear history, like checking out a branch.
//!
//! The context is built once per query from the live transcript. The
//! [`SwipeContext::All`] sentinel disables filtering for operations that
//! intentionally look across alternate timelines (global milestone search).

use std::collections::BTreeMap;

use crate::event::{Event, EventSource};

/// Which swipe is canonical at each message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwipeContext {
    /// No filtering: every swipe of every message is on the path.
    All,
    /// `message_id ⇒ canonical swipe_id`. Messages absent from the map treat
    /// swipe 0 (the default branch) as canonical.
    Selected(BTreeMap<u32, u32>),
}

impl SwipeContext {
    /// Build a context from `(message_id, swipe_id)` selections.
    #[must_use]
    pub fn selected<I: IntoIterator<Item = (u32, u32)>>(selections: I) -> Self {
        Self::Selected(selections.into_iter().collect())
    }

    /// The canonical swipe at a message, or `None` under [`Self::All`].
    #[must_use]
    pub fn canonical_swipe(&self, message_id: u32) -> Option<u32> {
        match self {
            Self::All => None,
            Self::Selected(map) => Some(map.get(&message_id).copied().unwrap_or(0)),
        }
    }

    /// Is this source on the currently selected path?
    #[must_use]
    pub fn is_canonical(&self, source: EventSource) -> bool {
        match self.canonical_swipe(source.message_id) {
            None => true,
            Some(swipe) => swipe == source.swipe_id,
        }
    }

    /// Keep only events on the selected path, in log order.
    pub fn canonical<'a>(
        &'a self,
        events: &'a [Event],
    ) -> impl Iterator<Item = &'a Event> + 'a {
        events.iter().filter(|e| self.is_canonical(e.source))
    }

    /// Keep only on-path events with `source.message_id <= message_id`.
    ///
    /// This answers "what was known at this point in the conversation", which
    /// keeps historical messages rendering consistently after the chat has
    /// moved on.
    pub fn canonical_up_to<'a>(
        &'a self,
        events: &'a [Event],
        message_id: u32,
    ) -> impl Iterator<Item = &'a Event> + 'a {
        self.canonical(events)
            .filter(move |e| e.source.message_id <= message_id)
    }
}

/// Keep only events with `source.message_id <= message_id`, regardless of
/// swipe selection.
pub fn events_up_to(events: &[Event], message_id: u32) -> impl Iterator<Item = &Event> {
    events
        .iter()
        .filter(move |e| e.source.message_id <= message_id)
}
