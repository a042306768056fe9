//! Event data model for the weft event log.
//!
//! This module defines the core [`Event`] struct, the [`EventKind`] enum
//! covering all 24 event kinds, and the typed payload structs.
//!
//! An event is an immutable, attributed delta to narrative state. Its
//! [`EventSource`] records the chat position, `(message_id, swipe_id)`,
//! that produced it; the source is never reinterpreted and is used both for
//! replay ordering and for canonical-path filtering. The `seq` counter is
//! assigned by the log at append time and breaks ties between events sharing
//! a source (insertion order within a message).
//!
//! # Persisted form
//!
//! Events serialize as JSON objects with an inline `kind` tag next to the
//! payload fields:
//!
//! ```json
//! {"source":{"message_id":4,"swipe_id":0},"kind":"character.mood",
//!  "character":"Alice","added":["happy"]}
//! ```
//!
//! `seq` is not persisted; the transcript loader re-stamps it in scan order.

pub mod data;
pub mod kind;

pub use data::{
    ActivityData, BoundaryReason, ChapterBoundaryData, ChapterDescriptionData, ClimateData,
    ConsolidatedPairData, ConsolidatedTagsData, EventData, LocationData, MilestoneData,
    NarrativeData, OutfitData, PairDelta, PositionData, PresenceData, PropsData,
    RelationshipStatusData, TagDelta, TensionData, TimeData, TopicData, ValidateError,
};
pub use kind::{EventKind, UnknownEventKind};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The chat position that produced an event: which message, which swipe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventSource {
    pub message_id: u32,
    pub swipe_id: u32,
}

impl EventSource {
    /// Build a source position.
    #[must_use]
    pub const fn new(message_id: u32, swipe_id: u32) -> Self {
        Self {
            message_id,
            swipe_id,
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message {} swipe {}", self.message_id, self.swipe_id)
    }
}

/// A single event in the weft event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The chat position that produced this event.
    pub source: EventSource,

    /// Monotonic counter assigned at append time; the total-order tiebreaker
    /// for events sharing a source. Not persisted.
    #[serde(default, skip_serializing)]
    pub seq: u64,

    /// Typed payload, tagged by kind.
    #[serde(flatten)]
    pub data: EventData,
}

impl Event {
    /// Build an event at a source position. `seq` starts at zero and is
    /// stamped by the log on append.
    #[must_use]
    pub const fn new(source: EventSource, data: EventData) -> Self {
        Self {
            source,
            seq: 0,
            data,
        }
    }

    /// The kind discriminant of the payload.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.data.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serde_roundtrip_restamps_seq() {
        let event = Event {
            source: EventSource::new(4, 1),
            seq: 17,
            data: EventData::Narrative(NarrativeData {
                text: "Rain on the windows.".into(),
            }),
        };

        let json = serde_json::to_string(&event).expect("serialize");
        assert!(!json.contains("seq"), "seq must not be persisted: {json}");

        let back: Event = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.source, event.source);
        assert_eq!(back.seq, 0);
        assert_eq!(back.data, event.data);
    }

    #[test]
    fn event_kind_delegates_to_payload() {
        let event = Event::new(
            EventSource::new(0, 0),
            EventData::Props(PropsData::default()),
        );
        assert_eq!(event.kind(), EventKind::Props);
    }

    #[test]
    fn source_display() {
        let source = EventSource::new(12, 3);
        assert_eq!(source.to_string(), "message 12 swipe 3");
    }

    #[test]
    fn source_ordering_is_message_major() {
        let a = EventSource::new(1, 5);
        let b = EventSource::new(2, 0);
        assert!(a < b);
    }
}
