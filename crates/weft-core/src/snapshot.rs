//! Snapshot model: the reconstructed narrative state at a given message.
//!
//! A [`Snapshot`] is the aggregate the projection engine materializes and the
//! CLI displays: scene time, location, climate, per-character state, pairwise
//! relationship state, scene topic/tone/tension, narrative events, and the
//! running chapter index. It is never persisted on its own; it is always
//! derivable from an [`InitialSnapshot`] plus the event log.
//!
//! # Determinism
//!
//! Every collection in the snapshot is B-tree ordered (`BTreeMap`/`BTreeSet`)
//! so that replaying the same event sequence twice yields byte-identical
//! serialized output. Hash-ordered collections would break that property.
//!
//! # Pair keys
//!
//! Relationships are keyed by [`PairKey`], which stores the two character
//! names sorted. This is an invariant, not a convention: every lookup and
//! every event fold resolves the pair through the sorted key, so an event
//! naming `(Bob, Alice)` and one naming `(Alice, Bob)` land on the same
//! record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// PairKey
// ---------------------------------------------------------------------------

/// A sorted pair of character names identifying a relationship.
///
/// Constructed via [`PairKey::new`], which sorts the two names; the first
/// name is always lexicographically `<=` the second. Serialized as the
/// string `"first|second"` so it can key a JSON map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    /// Build a key from two names in either order.
    #[must_use]
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    /// The lexicographically first name.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically second name.
    #[must_use]
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Returns `true` if either side of the pair is `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {}", self.first, self.second)
    }
}

/// Error returned when parsing a serialized pair key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pair key '{raw}': expected 'name|name'")]
pub struct ParsePairKeyError {
    /// The unrecognised input string.
    pub raw: String,
}

impl FromStr for PairKey {
    type Err = ParsePairKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('|') {
            Some((a, b)) if !a.is_empty() && !b.is_empty() && !b.contains('|') => {
                Ok(Self::new(a, b))
            }
            _ => Err(ParsePairKeyError { raw: s.to_string() }),
        }
    }
}

// Custom serde: a single `"first|second"` string, usable as a JSON map key.
impl Serialize for PairKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}|{}", self.first, self.second))
    }
}

impl<'de> Deserialize<'de> for PairKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Outfit
// ---------------------------------------------------------------------------

/// The nine independent outfit slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutfitSlot {
    Head,
    Neck,
    Jacket,
    Back,
    Torso,
    Legs,
    Footwear,
    Socks,
    Underwear,
}

impl OutfitSlot {
    /// All slots in display order.
    pub const ALL: [Self; 9] = [
        Self::Head,
        Self::Neck,
        Self::Jacket,
        Self::Back,
        Self::Torso,
        Self::Legs,
        Self::Footwear,
        Self::Socks,
        Self::Underwear,
    ];

    /// Return the slot name as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Neck => "neck",
            Self::Jacket => "jacket",
            Self::Back => "back",
            Self::Torso => "torso",
            Self::Legs => "legs",
            Self::Footwear => "footwear",
            Self::Socks => "socks",
            Self::Underwear => "underwear",
        }
    }
}

impl fmt::Display for OutfitSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A character's outfit: one nullable garment per slot.
///
/// Slots are independent; writing a slot replaces its prior value (no
/// accumulation within a slot). A garment spanning two slots, like a dress on
/// torso and legs, is two slot writes, not a special type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neck: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jacket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footwear: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underwear: Option<String>,
}

impl Outfit {
    /// Read one slot.
    #[must_use]
    pub const fn slot(&self, slot: OutfitSlot) -> &Option<String> {
        match slot {
            OutfitSlot::Head => &self.head,
            OutfitSlot::Neck => &self.neck,
            OutfitSlot::Jacket => &self.jacket,
            OutfitSlot::Back => &self.back,
            OutfitSlot::Torso => &self.torso,
            OutfitSlot::Legs => &self.legs,
            OutfitSlot::Footwear => &self.footwear,
            OutfitSlot::Socks => &self.socks,
            OutfitSlot::Underwear => &self.underwear,
        }
    }

    /// Mutable access to one slot.
    pub const fn slot_mut(&mut self, slot: OutfitSlot) -> &mut Option<String> {
        match slot {
            OutfitSlot::Head => &mut self.head,
            OutfitSlot::Neck => &mut self.neck,
            OutfitSlot::Jacket => &mut self.jacket,
            OutfitSlot::Back => &mut self.back,
            OutfitSlot::Torso => &mut self.torso,
            OutfitSlot::Legs => &mut self.legs,
            OutfitSlot::Footwear => &mut self.footwear,
            OutfitSlot::Socks => &mut self.socks,
            OutfitSlot::Underwear => &mut self.underwear,
        }
    }

    /// Iterate the occupied slots in display order.
    pub fn worn(&self) -> impl Iterator<Item = (OutfitSlot, &str)> {
        OutfitSlot::ALL
            .into_iter()
            .filter_map(|s| self.slot(s).as_deref().map(|item| (s, item)))
    }
}

// ---------------------------------------------------------------------------
// Relationship state
// ---------------------------------------------------------------------------

/// The status of a relationship, symmetric between the two characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    #[default]
    Strangers,
    Acquaintances,
    Friends,
    CloseFriends,
    Romantic,
    Partners,
    Family,
    Rivals,
    Enemies,
    Estranged,
    Complicated,
}

impl RelationshipStatus {
    /// All statuses in catalog order.
    pub const ALL: [Self; 11] = [
        Self::Strangers,
        Self::Acquaintances,
        Self::Friends,
        Self::CloseFriends,
        Self::Romantic,
        Self::Partners,
        Self::Family,
        Self::Rivals,
        Self::Enemies,
        Self::Estranged,
        Self::Complicated,
    ];

    /// Return the status name as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strangers => "strangers",
            Self::Acquaintances => "acquaintances",
            Self::Friends => "friends",
            Self::CloseFriends => "closefriends",
            Self::Romantic => "romantic",
            Self::Partners => "partners",
            Self::Family => "family",
            Self::Rivals => "rivals",
            Self::Enemies => "enemies",
            Self::Estranged => "estranged",
            Self::Complicated => "complicated",
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown relationship status: {s}"))
    }
}

/// One direction of a relationship: how `from` regards `toward`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSide {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub feelings: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub secrets: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub wants: BTreeSet<String>,
}

/// Relationship record for a sorted pair of characters.
///
/// `a_to_b` is the direction from the pair's lexicographically first name
/// toward the second; `b_to_a` is the reverse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipState {
    #[serde(default)]
    pub status: RelationshipStatus,
    #[serde(default)]
    pub a_to_b: RelationSide,
    #[serde(default)]
    pub b_to_a: RelationSide,
}

impl RelationshipState {
    /// The direction from `name`, resolved against the pair key.
    ///
    /// Returns `None` if `name` is neither side of the pair.
    #[must_use]
    pub fn side_from_mut(&mut self, pair: &PairKey, name: &str) -> Option<&mut RelationSide> {
        if name == pair.first() {
            Some(&mut self.a_to_b)
        } else if name == pair.second() {
            Some(&mut self.b_to_a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Scene state
// ---------------------------------------------------------------------------

/// How charged the scene currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensionLevel {
    #[default]
    Calm,
    Building,
    High,
    Breaking,
}

/// The flavor of the current tension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensionKind {
    Conflict,
    Romance,
    Suspense,
    Danger,
    Mystery,
}

/// Which way the tension is moving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensionDirection {
    Rising,
    #[default]
    Steady,
    Falling,
}

/// Scene tension: level, flavor, and direction, overwritten as a unit.
///
/// The flavor serializes as `type`; the payload field `kind` is reserved
/// for the event-kind tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tension {
    #[serde(default)]
    pub level: TensionLevel,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TensionKind>,
    #[serde(default)]
    pub direction: TensionDirection,
}

/// Scene-level conversational state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default)]
    pub tension: Tension,
}

// ---------------------------------------------------------------------------
// Location & climate
// ---------------------------------------------------------------------------

/// Where the scene takes place, coarse to fine, plus props present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub props: BTreeSet<String>,
}

/// Weather condition and temperature at the scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Climate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<i32>,
}

// ---------------------------------------------------------------------------
// Character state
// ---------------------------------------------------------------------------

/// Static reference data for a character. Seeded by the initial snapshot,
/// never event-sourced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

const fn default_true() -> bool {
    true
}

/// Mutable per-character state. The map key in [`Snapshot::characters`] is
/// the identity key (string equality; no global uniqueness guarantee).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterState {
    /// Whether the character is currently in the scene. Departure flips this
    /// to `false` without discarding the rest of the state, so a later
    /// reappearance restores rather than resets.
    #[serde(default = "default_true")]
    pub present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub mood: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub physical: BTreeSet<String>,
    #[serde(default)]
    pub outfit: Outfit,
    #[serde(default)]
    pub profile: CharacterProfile,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self {
            present: true,
            position: None,
            activity: None,
            mood: BTreeSet::new(),
            physical: BTreeSet::new(),
            outfit: Outfit::default(),
            profile: CharacterProfile::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Narrative events & snapshot
// ---------------------------------------------------------------------------

/// A narrative description accumulated during replay, stamped with the
/// chapter it fell into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    pub message_id: u32,
    pub chapter: u32,
    pub text: String,
}

/// The reconstructed narrative state at a given message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The message this snapshot was projected at.
    pub message_id: u32,
    pub time: NaiveDateTime,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub climate: Climate,
    #[serde(default)]
    pub characters: BTreeMap<String, CharacterState>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<PairKey, RelationshipState>,
    #[serde(default)]
    pub scene: SceneState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub narrative_events: Vec<NarrativeEvent>,
    /// Index of the chapter currently open at this message.
    #[serde(default)]
    pub current_chapter: u32,
}

impl Snapshot {
    /// Get or create the state record for `name`.
    ///
    /// Characters referenced by a delta before any presence event are created
    /// off-scene (`present: false`); a later `appeared` flips them on.
    pub fn character_mut(&mut self, name: &str) -> &mut CharacterState {
        self.characters
            .entry(name.to_string())
            .or_insert_with(|| CharacterState {
                present: false,
                ..CharacterState::default()
            })
    }

    /// Get or create the relationship record for a pair.
    pub fn relationship_mut(&mut self, pair: PairKey) -> &mut RelationshipState {
        self.relationships.entry(pair).or_default()
    }

    /// Look up a relationship by two names in either order.
    #[must_use]
    pub fn relationship(&self, a: &str, b: &str) -> Option<&RelationshipState> {
        self.relationships.get(&PairKey::new(a, b))
    }

    /// Iterate the characters currently in the scene.
    pub fn present_characters(&self) -> impl Iterator<Item = (&str, &CharacterState)> {
        self.characters
            .iter()
            .filter(|(_, c)| c.present)
            .map(|(name, c)| (name.as_str(), c))
    }
}

// ---------------------------------------------------------------------------
// Initial snapshot
// ---------------------------------------------------------------------------

/// The genesis checkpoint for a conversation.
///
/// Created once when tracking starts and immutable thereafter except through
/// full replacement. Every projection folds forward from this state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialSnapshot {
    /// The first tracked message. Projections before this position have no
    /// baseline.
    pub message_id: u32,
    pub time: NaiveDateTime,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub climate: Climate,
    #[serde(default)]
    pub characters: BTreeMap<String, CharacterState>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<PairKey, RelationshipState>,
    #[serde(default)]
    pub scene: SceneState,
}

impl InitialSnapshot {
    /// Materialize the starting [`Snapshot`] for replay.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            message_id: self.message_id,
            time: self.time,
            location: self.location.clone(),
            climate: self.climate.clone(),
            characters: self.characters.clone(),
            relationships: self.relationships.clone(),
            scene: self.scene.clone(),
            narrative_events: Vec::new(),
            current_chapter: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // === PairKey ===

    #[test]
    fn pair_key_sorts_names() {
        let k1 = PairKey::new("Bob", "Alice");
        let k2 = PairKey::new("Alice", "Bob");
        assert_eq!(k1, k2);
        assert_eq!(k1.first(), "Alice");
        assert_eq!(k1.second(), "Bob");
    }

    #[test]
    fn pair_key_contains() {
        let k = PairKey::new("Alice", "Bob");
        assert!(k.contains("Alice"));
        assert!(k.contains("Bob"));
        assert!(!k.contains("Carol"));
    }

    #[test]
    fn pair_key_display_and_parse() {
        let k = PairKey::new("Bob", "Alice");
        assert_eq!(k.to_string(), "Alice & Bob");
        let parsed: PairKey = "Bob|Alice".parse().expect("should parse");
        assert_eq!(parsed, k);
    }

    #[test]
    fn pair_key_parse_rejects_malformed() {
        assert!("Alice".parse::<PairKey>().is_err());
        assert!("|Bob".parse::<PairKey>().is_err());
        assert!("Alice|".parse::<PairKey>().is_err());
        assert!("A|B|C".parse::<PairKey>().is_err());
    }

    #[test]
    fn pair_key_serde_as_map_key() {
        let mut map: BTreeMap<PairKey, RelationshipState> = BTreeMap::new();
        map.insert(PairKey::new("Bob", "Alice"), RelationshipState::default());

        let json = serde_json::to_string(&map).expect("serialize");
        assert!(json.contains("\"Alice|Bob\""));

        let back: BTreeMap<PairKey, RelationshipState> =
            serde_json::from_str(&json).expect("deserialize");
        assert!(back.contains_key(&PairKey::new("Alice", "Bob")));
    }

    // === Outfit slots ===

    #[test]
    fn outfit_slot_write_replaces() {
        let mut outfit = Outfit::default();
        *outfit.slot_mut(OutfitSlot::Torso) = Some("shirt".into());
        *outfit.slot_mut(OutfitSlot::Torso) = Some("sweater".into());
        assert_eq!(outfit.torso.as_deref(), Some("sweater"));
    }

    #[test]
    fn outfit_slots_are_independent() {
        let mut outfit = Outfit::default();
        // A dress is two slot writes.
        *outfit.slot_mut(OutfitSlot::Torso) = Some("summer dress".into());
        *outfit.slot_mut(OutfitSlot::Legs) = Some("summer dress".into());
        *outfit.slot_mut(OutfitSlot::Legs) = None;
        assert_eq!(outfit.torso.as_deref(), Some("summer dress"));
        assert_eq!(outfit.legs, None);
    }

    #[test]
    fn outfit_worn_in_slot_order() {
        let mut outfit = Outfit::default();
        *outfit.slot_mut(OutfitSlot::Footwear) = Some("boots".into());
        *outfit.slot_mut(OutfitSlot::Head) = Some("cap".into());
        let worn: Vec<_> = outfit.worn().collect();
        assert_eq!(
            worn,
            vec![(OutfitSlot::Head, "cap"), (OutfitSlot::Footwear, "boots")]
        );
    }

    // === Relationship sides ===

    #[test]
    fn side_from_resolves_direction() {
        let pair = PairKey::new("Bob", "Alice");
        let mut rel = RelationshipState::default();
        rel.side_from_mut(&pair, "Bob")
            .expect("Bob is in the pair")
            .feelings
            .insert("trust".into());

        assert!(rel.b_to_a.feelings.contains("trust"));
        assert!(rel.a_to_b.feelings.is_empty());
        assert!(rel.side_from_mut(&pair, "Carol").is_none());
    }

    #[test]
    fn relationship_status_parse_roundtrip() {
        for status in RelationshipStatus::ALL {
            let parsed: RelationshipStatus = status.as_str().parse().expect("should parse");
            assert_eq!(parsed, status);
        }
        assert!("soulmates".parse::<RelationshipStatus>().is_err());
    }

    // === Snapshot helpers ===

    fn sample_initial() -> InitialSnapshot {
        InitialSnapshot {
            message_id: 0,
            time: "2024-06-01T18:30:00".parse().expect("valid datetime"),
            location: Location {
                area: Some("Harbor District".into()),
                place: Some("The Gull & Anchor".into()),
                position: Some("corner booth".into()),
                props: BTreeSet::from(["oil lamp".to_string()]),
            },
            climate: Climate {
                condition: Some("drizzle".into()),
                temperature_c: Some(12),
            },
            characters: BTreeMap::from([("Alice".to_string(), CharacterState::default())]),
            relationships: BTreeMap::new(),
            scene: SceneState::default(),
        }
    }

    #[test]
    fn to_snapshot_carries_initial_state() {
        let initial = sample_initial();
        let snap = initial.to_snapshot();
        assert_eq!(snap.message_id, 0);
        assert_eq!(snap.current_chapter, 0);
        assert_eq!(snap.location.place.as_deref(), Some("The Gull & Anchor"));
        assert!(snap.characters.contains_key("Alice"));
        assert!(snap.narrative_events.is_empty());
    }

    #[test]
    fn character_mut_creates_off_scene() {
        let mut snap = sample_initial().to_snapshot();
        assert!(!snap.character_mut("Bob").present);
        // Already-seeded characters keep their presence.
        assert!(snap.character_mut("Alice").present);
    }

    #[test]
    fn present_characters_filters_departed() {
        let mut snap = sample_initial().to_snapshot();
        snap.character_mut("Bob").mood.insert("wary".into());
        let present: Vec<_> = snap.present_characters().map(|(n, _)| n).collect();
        assert_eq!(present, vec!["Alice"]);
    }

    #[test]
    fn snapshot_serde_roundtrip() {
        let mut snap = sample_initial().to_snapshot();
        snap.relationship_mut(PairKey::new("Bob", "Alice")).status =
            RelationshipStatus::Friends;
        let json = serde_json::to_string(&snap).expect("serialize");
        let back: Snapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(snap, back);
    }
}
