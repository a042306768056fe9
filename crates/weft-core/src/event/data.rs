//! Typed payload structs for each event kind.
//!
//! [`EventData`] is a closed sum type: the projection fold matches it
//! exhaustively, so adding a kind is a compile-time obligation everywhere the
//! state merges. Payloads come in three shapes:
//!
//! - **absolute**: a new value overwrites the field (time reset, location,
//!   climate, topic/tone, tension, position, activity, outfit slot, status);
//! - **set delta**: `added`/`removed` lists folded as
//!   `(current \ removed) ∪ added` (props, mood, physical, feelings, secrets,
//!   wants);
//! - **directional pair delta**: a set delta applied to one direction of a
//!   relationship, resolved through the sorted pair key.
//!
//! [`EventData::validate`] is the malformed-event boundary: transcripts and
//! CLI input refuse payloads that fail it, so replay never sees them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::snapshot::{OutfitSlot, RelationshipStatus, Tension};

use super::kind::EventKind;

// ---------------------------------------------------------------------------
// Shared delta shapes
// ---------------------------------------------------------------------------

/// Set delta scoped to one character (mood, physical state).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDelta {
    pub character: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

/// Directional set delta between two characters (feelings, secrets, wants).
///
/// The direction is `from_character` toward `toward_character`; the pair
/// record itself is keyed by the sorted names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairDelta {
    pub from_character: String,
    pub toward_character: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

// ---------------------------------------------------------------------------
// Kind-specific payloads
// ---------------------------------------------------------------------------

/// Payload for `scene.time`: a clock delta, optionally an absolute reset.
///
/// When `set_to` is present it wins over `advance_minutes` (scene cuts such
/// as "the next morning"). Deltas are subject to leap clamping during the
/// fold; absolute resets are not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeData {
    #[serde(default)]
    pub advance_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_to: Option<NaiveDateTime>,
}

/// Payload for `scene.location`: field-wise absolute overwrite.
///
/// A `Some` overwrites that field; a `None` leaves it untouched, so an
/// extraction that only noticed a position shift does not erase the area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// Payload for `scene.props`: set delta on the location's props.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropsData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

/// Payload for `scene.climate`: field-wise absolute overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<i32>,
}

/// Payload for `scene.topic`: field-wise absolute overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

/// Payload for `scene.tension`: the whole tension is overwritten as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensionData {
    #[serde(flatten)]
    pub tension: Tension,
}

/// Payload for `character.presence`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub appeared: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub departed: Vec<String>,
}

/// Payload for `character.position`: absolute overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionData {
    pub character: String,
    pub position: String,
}

/// Payload for `character.activity`: absolute, nullable overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityData {
    pub character: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

/// Payload for `character.outfit`: one slot write.
///
/// `item: None` empties the slot. A garment spanning two slots is emitted as
/// two events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitData {
    pub character: String,
    pub slot: OutfitSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
}

/// Payload for `relationship.status`: symmetric absolute overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipStatusData {
    pub a: String,
    pub b: String,
    pub status: RelationshipStatus,
}

/// Payload for `narrative.description`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeData {
    pub text: String,
}

/// Payload for `narrative.milestone`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneData {
    /// Tagged subject, e.g. `first_kiss`, `betrayal`.
    pub subject: String,
    pub a: String,
    pub b: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Why a chapter boundary was detected, as classified upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryReason {
    LocationChange,
    TimeJump,
    Both,
}

/// Payload for `chapter.boundary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterBoundaryData {
    pub reason: BoundaryReason,
}

/// Payload for `chapter.description`: supplies title and summary for a
/// chapter that has already been opened by a boundary event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDescriptionData {
    pub chapter: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
}

/// Payload for `consolidate.moods` / `consolidate.physical`: wholesale
/// replacement of one character list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedTagsData {
    pub character: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Payload for `consolidate.feelings` / `consolidate.wants`: wholesale
/// replacement of one direction of a relationship list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedPairData {
    pub from_character: String,
    pub toward_character: String,
    #[serde(default)]
    pub values: Vec<String>,
}

// ---------------------------------------------------------------------------
// EventData: the unified payload enum
// ---------------------------------------------------------------------------

/// Typed payload for an event, tagged by kind in the persisted JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventData {
    #[serde(rename = "scene.time")]
    Time(TimeData),
    #[serde(rename = "scene.location")]
    Location(LocationData),
    #[serde(rename = "scene.props")]
    Props(PropsData),
    #[serde(rename = "scene.climate")]
    Climate(ClimateData),
    #[serde(rename = "scene.topic")]
    Topic(TopicData),
    #[serde(rename = "scene.tension")]
    Tension(TensionData),
    #[serde(rename = "character.presence")]
    Presence(PresenceData),
    #[serde(rename = "character.position")]
    Position(PositionData),
    #[serde(rename = "character.activity")]
    Activity(ActivityData),
    #[serde(rename = "character.mood")]
    Mood(TagDelta),
    #[serde(rename = "character.physical")]
    Physical(TagDelta),
    #[serde(rename = "character.outfit")]
    Outfit(OutfitData),
    #[serde(rename = "relationship.status")]
    RelationshipStatus(RelationshipStatusData),
    #[serde(rename = "relationship.feelings")]
    Feelings(PairDelta),
    #[serde(rename = "relationship.secrets")]
    Secrets(PairDelta),
    #[serde(rename = "relationship.wants")]
    Wants(PairDelta),
    #[serde(rename = "narrative.description")]
    Narrative(NarrativeData),
    #[serde(rename = "narrative.milestone")]
    Milestone(MilestoneData),
    #[serde(rename = "chapter.boundary")]
    ChapterBoundary(ChapterBoundaryData),
    #[serde(rename = "chapter.description")]
    ChapterDescription(ChapterDescriptionData),
    #[serde(rename = "consolidate.moods")]
    ConsolidatedMoods(ConsolidatedTagsData),
    #[serde(rename = "consolidate.physical")]
    ConsolidatedPhysical(ConsolidatedTagsData),
    #[serde(rename = "consolidate.feelings")]
    ConsolidatedFeelings(ConsolidatedPairData),
    #[serde(rename = "consolidate.wants")]
    ConsolidatedWants(ConsolidatedPairData),
}

impl EventData {
    /// The kind discriminant for this payload.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Time(_) => EventKind::Time,
            Self::Location(_) => EventKind::Location,
            Self::Props(_) => EventKind::Props,
            Self::Climate(_) => EventKind::Climate,
            Self::Topic(_) => EventKind::Topic,
            Self::Tension(_) => EventKind::Tension,
            Self::Presence(_) => EventKind::Presence,
            Self::Position(_) => EventKind::Position,
            Self::Activity(_) => EventKind::Activity,
            Self::Mood(_) => EventKind::Mood,
            Self::Physical(_) => EventKind::Physical,
            Self::Outfit(_) => EventKind::Outfit,
            Self::RelationshipStatus(_) => EventKind::RelationshipStatus,
            Self::Feelings(_) => EventKind::Feelings,
            Self::Secrets(_) => EventKind::Secrets,
            Self::Wants(_) => EventKind::Wants,
            Self::Narrative(_) => EventKind::Narrative,
            Self::Milestone(_) => EventKind::Milestone,
            Self::ChapterBoundary(_) => EventKind::ChapterBoundary,
            Self::ChapterDescription(_) => EventKind::ChapterDescription,
            Self::ConsolidatedMoods(_) => EventKind::ConsolidatedMoods,
            Self::ConsolidatedPhysical(_) => EventKind::ConsolidatedPhysical,
            Self::ConsolidatedFeelings(_) => EventKind::ConsolidatedFeelings,
            Self::ConsolidatedWants(_) => EventKind::ConsolidatedWants,
        }
    }

    /// Boundary validation: rejects payloads that must never enter the log.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidateError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ValidateError> {
        match self {
            Self::Time(d) => {
                if d.advance_minutes < 0 {
                    return Err(ValidateError::NegativeTimeAdvance {
                        minutes: d.advance_minutes,
                    });
                }
            }
            Self::Location(_) | Self::Props(_) | Self::Climate(_) | Self::Topic(_)
            | Self::Tension(_) | Self::ChapterBoundary(_) => {}
            Self::Presence(d) => {
                for name in d.appeared.iter().chain(&d.departed) {
                    check_name(self.kind(), name)?;
                }
            }
            Self::Position(d) => check_name(self.kind(), &d.character)?,
            Self::Activity(d) => check_name(self.kind(), &d.character)?,
            Self::Mood(d) | Self::Physical(d) => check_name(self.kind(), &d.character)?,
            Self::Outfit(d) => check_name(self.kind(), &d.character)?,
            Self::RelationshipStatus(d) => check_pair(self.kind(), &d.a, &d.b)?,
            Self::Feelings(d) | Self::Secrets(d) | Self::Wants(d) => {
                check_pair(self.kind(), &d.from_character, &d.toward_character)?;
            }
            Self::Narrative(d) => {
                if d.text.trim().is_empty() {
                    return Err(ValidateError::EmptyNarrative);
                }
            }
            Self::Milestone(d) => {
                if d.subject.trim().is_empty() {
                    return Err(ValidateError::EmptyMilestoneSubject);
                }
                check_pair(self.kind(), &d.a, &d.b)?;
            }
            Self::ChapterDescription(d) => {
                if d.title.trim().is_empty() {
                    return Err(ValidateError::EmptyChapterTitle { chapter: d.chapter });
                }
            }
            Self::ConsolidatedMoods(d) | Self::ConsolidatedPhysical(d) => {
                check_name(self.kind(), &d.character)?;
            }
            Self::ConsolidatedFeelings(d) | Self::ConsolidatedWants(d) => {
                check_pair(self.kind(), &d.from_character, &d.toward_character)?;
            }
        }
        Ok(())
    }
}

fn check_name(kind: EventKind, name: &str) -> Result<(), ValidateError> {
    if name.trim().is_empty() {
        return Err(ValidateError::EmptyCharacterName { kind });
    }
    // '|' is reserved by the pair-key serialization.
    if name.contains('|') {
        return Err(ValidateError::ReservedCharacterName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn check_pair(kind: EventKind, a: &str, b: &str) -> Result<(), ValidateError> {
    check_name(kind, a)?;
    check_name(kind, b)?;
    if a == b {
        return Err(ValidateError::SelfPair {
            kind,
            name: a.to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ValidateError
// ---------------------------------------------------------------------------

/// Rejection reasons for malformed payloads at the log boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidateError {
    #[error("{kind} event names an empty character")]
    EmptyCharacterName { kind: EventKind },

    #[error("character name '{name}' contains the reserved character '|'")]
    ReservedCharacterName { name: String },

    #[error("{kind} event relates '{name}' to itself")]
    SelfPair { kind: EventKind, name: String },

    #[error("time advance of {minutes} minutes is negative")]
    NegativeTimeAdvance { minutes: i64 },

    #[error("narrative description is empty")]
    EmptyNarrative,

    #[error("milestone subject is empty")]
    EmptyMilestoneSubject,

    #[error("chapter {chapter} description has an empty title")]
    EmptyChapterTitle { chapter: u32 },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
