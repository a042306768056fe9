//! Event kind enum covering the full narrative event catalog.
//!
//! Each kind corresponds to one category of narrative state change. The string
//! representation uses the `<domain>.<noun>` dotted format used in the
//! persisted transcript payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The 24 event kinds in the weft event catalog.
///
/// String representation follows the `<domain>.<noun>` convention used in the
/// persisted JSON format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Advance or reset the narrative clock.
    Time,
    /// Overwrite the scene location (area/place/position).
    Location,
    /// Add/remove props present at the location.
    Props,
    /// Overwrite weather condition and temperature.
    Climate,
    /// Overwrite the conversation topic and tone.
    Topic,
    /// Overwrite the scene tension (level/kind/direction).
    Tension,
    /// Characters entering or leaving the scene.
    Presence,
    /// Overwrite a character's position.
    Position,
    /// Overwrite a character's current activity.
    Activity,
    /// Add/remove entries in a character's mood list.
    Mood,
    /// Add/remove entries in a character's physical-state list.
    Physical,
    /// Write one outfit slot for a character.
    Outfit,
    /// Overwrite the status of a relationship.
    RelationshipStatus,
    /// Add/remove directional feelings between two characters.
    Feelings,
    /// Add/remove directional secrets between two characters.
    Secrets,
    /// Add/remove directional wants between two characters.
    Wants,
    /// Append a narrative description.
    Narrative,
    /// Record a narratively significant relationship milestone.
    Milestone,
    /// Open a new chapter (major location change / large time jump).
    ChapterBoundary,
    /// Supply title and summary for a closed chapter.
    ChapterDescription,
    /// Wholesale replacement of a character's mood list.
    ConsolidatedMoods,
    /// Wholesale replacement of a character's physical-state list.
    ConsolidatedPhysical,
    /// Wholesale replacement of one direction of relationship feelings.
    ConsolidatedFeelings,
    /// Wholesale replacement of one direction of relationship wants.
    ConsolidatedWants,
}

/// Error returned when parsing an unknown event kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event kind '{}': expected a '<domain>.<noun>' kind such as \
             scene.time, character.mood, or relationship.feelings",
            self.raw
        )
    }
}

impl std::error::Error for UnknownEventKind {}

impl EventKind {
    /// All known event kinds in catalog order.
    pub const ALL: [Self; 24] = [
        Self::Time,
        Self::Location,
        Self::Props,
        Self::Climate,
        Self::Topic,
        Self::Tension,
        Self::Presence,
        Self::Position,
        Self::Activity,
        Self::Mood,
        Self::Physical,
        Self::Outfit,
        Self::RelationshipStatus,
        Self::Feelings,
        Self::Secrets,
        Self::Wants,
        Self::Narrative,
        Self::Milestone,
        Self::ChapterBoundary,
        Self::ChapterDescription,
        Self::ConsolidatedMoods,
        Self::ConsolidatedPhysical,
        Self::ConsolidatedFeelings,
        Self::ConsolidatedWants,
    ];

    /// Return the canonical `<domain>.<noun>` string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Time => "scene.time",
            Self::Location => "scene.location",
            Self::Props => "scene.props",
            Self::Climate => "scene.climate",
            Self::Topic => "scene.topic",
            Self::Tension => "scene.tension",
            Self::Presence => "character.presence",
            Self::Position => "character.position",
            Self::Activity => "character.activity",
            Self::Mood => "character.mood",
            Self::Physical => "character.physical",
            Self::Outfit => "character.outfit",
            Self::RelationshipStatus => "relationship.status",
            Self::Feelings => "relationship.feelings",
            Self::Secrets => "relationship.secrets",
            Self::Wants => "relationship.wants",
            Self::Narrative => "narrative.description",
            Self::Milestone => "narrative.milestone",
            Self::ChapterBoundary => "chapter.boundary",
            Self::ChapterDescription => "chapter.description",
            Self::ConsolidatedMoods => "consolidate.moods",
            Self::ConsolidatedPhysical => "consolidate.physical",
            Self::ConsolidatedFeelings => "consolidate.feelings",
            Self::ConsolidatedWants => "consolidate.wants",
        }
    }

    /// Returns `true` for the kinds the projection folds as a wholesale
    /// replacement emitted by the consolidator.
    #[must_use]
    pub const fn is_consolidation(self) -> bool {
        matches!(
            self,
            Self::ConsolidatedMoods
                | Self::ConsolidatedPhysical
                | Self::ConsolidatedFeelings
                | Self::ConsolidatedWants
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind { raw: s.to_string() })
    }
}

// Custom serde: serialize as the `<domain>.<noun>` string.
impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
