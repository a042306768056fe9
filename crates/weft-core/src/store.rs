//! The event log: an append-only but position-editable collection of events.
//!
//! The log owns the canonical replay ordering. Physical storage order is
//! sorted by `source.message_id` (non-decreasing), with the append-time `seq`
//! counter breaking ties, so within one message, events replay in insertion
//! order. Appends targeting a past position (point-in-time edits) insert at
//! the partition point rather than shifting other positions.
//!
//! "Active" is structural: every stored event is live for replay.
//! Supersession happens by [`EventLog::delete_at`] / [`EventLog::replace_at`],
//! which remove events outright; there is no soft-delete flag.
//!
//! # Isolation
//!
//! `EventLog` is `Clone`, and a clone is a fully independent value. The
//! speculative editor works on a clone and commits by calling `replace_at`
//! on the authoritative log; an uncommitted clone can never corrupt it.
//! Concurrent committers are not reconciled; the last `replace_at` wins.

use crate::config::EngineConfig;
use crate::error::ProjectionError;
use crate::event::{Event, EventSource};
use crate::path::SwipeContext;
use crate::projection;
use crate::snapshot::{InitialSnapshot, Snapshot};

/// Event log for one conversation: genesis snapshot plus ordered events.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    initial: InitialSnapshot,
    events: Vec<Event>,
    next_seq: u64,
}

impl EventLog {
    /// Create an empty log starting from a genesis snapshot.
    #[must_use]
    pub const fn new(initial: InitialSnapshot) -> Self {
        Self {
            initial,
            events: Vec::new(),
            next_seq: 1,
        }
    }

    /// The genesis snapshot.
    #[must_use]
    pub const fn initial(&self) -> &InitialSnapshot {
        &self.initial
    }

    /// Replace the genesis snapshot wholesale. The only way to change it.
    pub fn replace_initial_snapshot(&mut self, initial: InitialSnapshot) {
        self.initial = initial;
    }

    /// All live events in replay order.
    ///
    /// Every stored event is active; supersession is structural (deletion),
    /// not a flag.
    #[must_use]
    pub fn active_events(&self) -> &[Event] {
        &self.events
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The highest message id any stored event was produced at, or the
    /// genesis message when the log is empty.
    #[must_use]
    pub fn max_message_id(&self) -> u32 {
        self.events
            .last()
            .map_or(self.initial.message_id, |e| e.source.message_id)
    }

    /// Append events, stamping sequence numbers and inserting at the
    /// partition point so the message ordering invariant holds.
    ///
    /// Never fails on well-formed input; duplicate-looking events are both
    /// kept. Events targeting a past message slot in at that message's run,
    /// after its existing events.
    pub fn append<I: IntoIterator<Item = Event>>(&mut self, events: I) {
        for mut event in events {
            event.seq = self.next_seq;
            self.next_seq += 1;

            let index = self
                .events
                .partition_point(|e| e.source.message_id <= event.source.message_id);
            self.events.insert(index, event);
        }
        debug_assert!(self.is_ordered(), "append broke the ordering invariant");
    }

    /// All events at an exact `(message_id, swipe_id)` position, in sequence
    /// order.
    #[must_use]
    pub fn events_at(&self, source: EventSource) -> Vec<&Event> {
        self.events.iter().filter(|e| e.source == source).collect()
    }

    /// Remove all events at an exact position. Returns how many were removed.
    ///
    /// Used before re-extraction so a message's events are not duplicated.
    pub fn delete_at(&mut self, source: EventSource) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.source != source);
        let removed = before - self.events.len();
        if removed > 0 {
            tracing::debug!(%source, removed, "deleted events at position");
        }
        removed
    }

    /// Atomic delete-and-append at one position. Replacement events are
    /// re-stamped with `source` and fresh sequence numbers.
    pub fn replace_at<I: IntoIterator<Item = Event>>(&mut self, source: EventSource, events: I) {
        self.delete_at(source);
        self.append(events.into_iter().map(|mut event| {
            event.source = source;
            event
        }));
    }

    /// Project the narrative state at a message under a swipe context.
    ///
    /// Convenience delegate to [`projection::project`] over this log's
    /// initial snapshot and event collection.
    ///
    /// # Errors
    ///
    /// See [`projection::project`].
    pub fn project_at(
        &self,
        message_id: u32,
        ctx: &SwipeContext,
        cfg: &EngineConfig,
    ) -> Result<Snapshot, ProjectionError> {
        projection::project(&self.initial, &self.events, message_id, ctx, cfg)
    }

    fn is_ordered(&self) -> bool {
        self.events
            .windows(2)
            .all(|w| w[0].source.message_id <= w[1].source.message_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
