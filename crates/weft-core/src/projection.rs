//! The projection engine: deterministic replay of the event log into a
//! [`Snapshot`] at a requested message.
//!
//! # Algorithm
//!
//! 1. Start from the immutable [`InitialSnapshot`].
//! 2. Filter the event collection: canonical-path only, then
//!    `source.message_id <= message_id`, preserving log order.
//! 3. Fold the filtered sequence, applying exactly one merge rule per event
//!    kind (the `match` below is exhaustive, so a new kind cannot be added
//!    without deciding its merge rule).
//! 4. Return the folded snapshot tagged with the requested message id.
//!
//! The fold is pure: replaying the same filtered sequence from the same
//! initial snapshot always yields identical output. This is the central
//! correctness property of the whole subsystem; nothing here reads clocks,
//! randomness, or ambient state.
//!
//! Events that reference nothing actionable (a chapter description for a
//! chapter never opened) are skipped with a warning, mirroring the
//! skip-invalid-during-replay rule. Genuinely contradictory events abort the
//! call with a [`ProjectionError`]; the log is untouched and projections at
//! other messages are unaffected.

use std::collections::BTreeSet;

use crate::clock::{self, LastLeap};
use crate::config::EngineConfig;
use crate::error::ProjectionError;
use crate::event::{Event, EventData, PairDelta};
use crate::path::SwipeContext;
use crate::snapshot::{InitialSnapshot, NarrativeEvent, PairKey, RelationSide, Snapshot};

/// Replay the canonical, bounded event sequence into a snapshot.
///
/// # Errors
///
/// [`ProjectionError::MissingBaseline`] if `message_id` predates the initial
/// snapshot; replay-class errors if a contradictory event survived boundary
/// validation.
pub fn project(
    initial: &InitialSnapshot,
    events: &[Event],
    message_id: u32,
    ctx: &SwipeContext,
    cfg: &EngineConfig,
) -> Result<Snapshot, ProjectionError> {
    if message_id < initial.message_id {
        return Err(ProjectionError::MissingBaseline {
            message_id,
            first_tracked: initial.message_id,
        });
    }

    let mut fold = Fold {
        snap: initial.to_snapshot(),
        last_leap: None,
        cfg,
    };

    for event in ctx.canonical_up_to(events, message_id) {
        fold.apply(event)?;
    }

    fold.snap.message_id = message_id;
    Ok(fold.snap)
}

/// `result = (current \ removed) ∪ added`. Removals first, so an element in
/// both lists ends present.
fn apply_set_delta(set: &mut BTreeSet<String>, added: &[String], removed: &[String]) {
    for item in removed {
        set.remove(item);
    }
    for item in added {
        set.insert(item.clone());
    }
}

/// Replace a list wholesale (consolidation events).
fn replace_set(set: &mut BTreeSet<String>, values: &[String]) {
    set.clear();
    set.extend(values.iter().cloned());
}

struct Fold<'a> {
    snap: Snapshot,
    last_leap: LastLeap,
    cfg: &'a EngineConfig,
}

impl Fold<'_> {
    fn apply(&mut self, event: &Event) -> Result<(), ProjectionError> {
        let message_id = event.source.message_id;

        match &event.data {
            EventData::Time(d) => {
                if let Some(to) = d.set_to {
                    self.snap.time = to;
                    // An absolute reset breaks the leap-adjacency chain.
                    self.last_leap = None;
                } else {
                    let minutes = clock::clamp_leap(
                        self.last_leap,
                        message_id,
                        d.advance_minutes,
                        self.cfg.time.leap_threshold_minutes,
                    );
                    self.snap.time = clock::advance(self.snap.time, minutes);
                    self.last_leap = Some((message_id, d.advance_minutes));
                }
            }

            EventData::Location(d) => {
                let location = &mut self.snap.location;
                if let Some(area) = &d.area {
                    location.area = Some(area.clone());
                }
                if let Some(place) = &d.place {
                    location.place = Some(place.clone());
                }
                if let Some(position) = &d.position {
                    location.position = Some(position.clone());
                }
            }

            EventData::Props(d) => {
                apply_set_delta(&mut self.snap.location.props, &d.added, &d.removed);
            }

            EventData::Climate(d) => {
                if let Some(condition) = &d.condition {
                    self.snap.climate.condition = Some(condition.clone());
                }
                if let Some(temperature) = d.temperature_c {
                    self.snap.climate.temperature_c = Some(temperature);
                }
            }

            EventData::Topic(d) => {
                if let Some(topic) = &d.topic {
                    self.snap.scene.topic = Some(topic.clone());
                }
                if let Some(tone) = &d.tone {
                    self.snap.scene.tone = Some(tone.clone());
                }
            }

            EventData::Tension(d) => {
                self.snap.scene.tension = d.tension;
            }

            EventData::Presence(d) => {
                for name in &d.appeared {
                    self.snap.character_mut(name).present = true;
                }
                for name in &d.departed {
                    // Departure keeps the historical state for reappearance.
                    self.snap.character_mut(name).present = false;
                }
            }

            EventData::Position(d) => {
                self.snap.character_mut(&d.character).position = Some(d.position.clone());
            }

            EventData::Activity(d) => {
                self.snap.character_mut(&d.character).activity = d.activity.clone();
            }

            EventData::Mood(d) => {
                let character = self.snap.character_mut(&d.character);
                apply_set_delta(&mut character.mood, &d.added, &d.removed);
            }

            EventData::Physical(d) => {
                let character = self.snap.character_mut(&d.character);
                apply_set_delta(&mut character.physical, &d.added, &d.removed);
            }

            EventData::Outfit(d) => {
                let character = self.snap.character_mut(&d.character);
                *character.outfit.slot_mut(d.slot) = d.item.clone();
            }

            EventData::RelationshipStatus(d) => {
                let pair = pair_for(&d.a, &d.b, message_id)?;
                self.snap.relationship_mut(pair).status = d.status;
            }

            EventData::Feelings(d) => {
                let side = self.pair_side(d, message_id)?;
                apply_set_delta(&mut side.feelings, &d.added, &d.removed);
            }

            EventData::Secrets(d) => {
                let side = self.pair_side(d, message_id)?;
                apply_set_delta(&mut side.secrets, &d.added, &d.removed);
            }

            EventData::Wants(d) => {
                let side = self.pair_side(d, message_id)?;
                apply_set_delta(&mut side.wants, &d.added, &d.removed);
            }

            EventData::Narrative(d) => {
                let chapter = self.snap.current_chapter;
                self.snap.narrative_events.push(NarrativeEvent {
                    message_id,
                    chapter,
                    text: d.text.clone(),
                });
            }

            // Milestones are read back by the segmenter; they carry no
            // snapshot state of their own.
            EventData::Milestone(_) => {}

            EventData::ChapterBoundary(_) => {
                self.snap.current_chapter += 1;
            }

            EventData::ChapterDescription(d) => {
                // Chapter records are assembled by the segmenter; the fold
                // only sanity-checks the reference.
                if d.chapter > self.snap.current_chapter {
                    tracing::warn!(
                        chapter = d.chapter,
                        open = self.snap.current_chapter,
                        message_id,
                        "chapter description references an unopened chapter; skipping"
                    );
                }
            }

            EventData::ConsolidatedMoods(d) => {
                let character = self.snap.character_mut(&d.character);
                replace_set(&mut character.mood, &d.values);
            }

            EventData::ConsolidatedPhysical(d) => {
                let character = self.snap.character_mut(&d.character);
                replace_set(&mut character.physical, &d.values);
            }

            EventData::ConsolidatedFeelings(d) => {
                let pair = pair_for(&d.from_character, &d.toward_character, message_id)?;
                let side = side_from(&mut self.snap, pair, &d.from_character);
                replace_set(&mut side.feelings, &d.values);
            }

            EventData::ConsolidatedWants(d) => {
                let pair = pair_for(&d.from_character, &d.toward_character, message_id)?;
                let side = side_from(&mut self.snap, pair, &d.from_character);
                replace_set(&mut side.wants, &d.values);
            }
        }

        Ok(())
    }

    /// Resolve the directional side for a pair delta.
    fn pair_side(
        &mut self,
        delta: &PairDelta,
        message_id: u32,
    ) -> Result<&mut RelationSide, ProjectionError> {
        let pair = pair_for(&delta.from_character, &delta.toward_character, message_id)?;
        Ok(side_from(&mut self.snap, pair, &delta.from_character))
    }
}

/// Build the sorted pair key, rejecting degenerate pairs.
fn pair_for(a: &str, b: &str, message_id: u32) -> Result<PairKey, ProjectionError> {
    if a.is_empty() || b.is_empty() {
        return Err(ProjectionError::EmptyCharacterName { message_id });
    }
    if a == b {
        return Err(ProjectionError::SelfRelationship {
            name: a.to_string(),
            message_id,
        });
    }
    Ok(PairKey::new(a, b))
}

/// The direction from `from` in the (possibly new) relationship record.
fn side_from<'a>(snap: &'a mut Snapshot, pair: PairKey, from: &str) -> &'a mut RelationSide {
    let from_is_first = from == pair.first();
    let rel = snap.relationship_mut(pair);
    if from_is_first {
        &mut rel.a_to_b
    } else {
        &mut rel.b_to_a
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{
        ActivityData, ChapterBoundaryData, ChapterDescriptionData, ClimateData,
        ConsolidatedTagsData, EventSource, LocationData, NarrativeData, OutfitData,
        PresenceData, PropsData, RelationshipStatusData, TagDelta, TensionData, TimeData,
        TopicData,
    };
    use crate::snapshot::{
        CharacterState, Climate, Location, OutfitSlot, RelationshipStatus, SceneState, Tension,
        TensionLevel,
    };
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn initial() -> InitialSnapshot {
        InitialSnapshot {
            message_id: 0,
            time: "2024-06-01T18:00:00".parse().expect("valid datetime"),
            location: Location {
                area: Some("Harbor District".into()),
                place: Some("The Gull & Anchor".into()),
                position: None,
                props: BTreeSet::new(),
            },
            climate: Climate::default(),
            characters: BTreeMap::from([
                ("Alice".to_string(), CharacterState::default()),
                ("Bob".to_string(), CharacterState::default()),
            ]),
            relationships: BTreeMap::new(),
            scene: SceneState::default(),
        }
    }

    fn ev(message_id: u32, swipe_id: u32, data: EventData) -> Event {
        Event::new(EventSource::new(message_id, swipe_id), data)
    }

    fn mood(message_id: u32, swipe_id: u32, character: &str, added: &[&str], removed: &[&str]) -> Event {
        ev(
            message_id,
            swipe_id,
            EventData::Mood(TagDelta {
                character: character.into(),
                added: added.iter().map(ToString::to_string).collect(),
                removed: removed.iter().map(ToString::to_string).collect(),
            }),
        )
    }

    fn project_all(events: &[Event], at: u32) -> Snapshot {
        project(
            &initial(),
            events,
            at,
            &SwipeContext::All,
            &EngineConfig::default(),
        )
        .expect("projection should succeed")
    }

    // === Determinism & idempotence ===

    #[test]
    fn replay_is_deterministic() {
        let events = vec![
            mood(1, 0, "Alice", &["happy"], &[]),
            ev(2, 0, EventData::Props(PropsData {
                added: vec!["lantern".into()],
                removed: vec![],
            })),
            mood(3, 0, "Bob", &["wary"], &[]),
        ];
        let a = project_all(&events, 3);
        let b = project_all(&events, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn reprojection_without_new_events_is_identical() {
        let events = vec![mood(1, 0, "Alice", &["happy"], &[])];
        let first = project_all(&events, 5);
        let second = project_all(&events, 5);
        assert_eq!(first, second);
    }

    // === Canonical filtering ===

    #[test]
    fn swipe_selection_flips_with_no_residue() {
        let events = vec![
            mood(5, 0, "Alice", &["happy"], &[]),
            mood(5, 1, "Alice", &["angry"], &[]),
        ];
        let cfg = EngineConfig::default();

        let snap0 = project(
            &initial(),
            &events,
            6,
            &SwipeContext::selected([(5, 0)]),
            &cfg,
        )
        .expect("projection");
        assert!(snap0.characters["Alice"].mood.contains("happy"));
        assert!(!snap0.characters["Alice"].mood.contains("angry"));

        let snap1 = project(
            &initial(),
            &events,
            6,
            &SwipeContext::selected([(5, 1)]),
            &cfg,
        )
        .expect("projection");
        assert!(snap1.characters["Alice"].mood.contains("angry"));
        assert!(!snap1.characters["Alice"].mood.contains("happy"));
    }

    #[test]
    fn events_after_requested_message_are_invisible() {
        let events = vec![
            mood(2, 0, "Alice", &["happy"], &[]),
            mood(4, 0, "Alice", &["angry"], &["happy"]),
        ];
        let snap = project_all(&events, 3);
        assert!(snap.characters["Alice"].mood.contains("happy"));
        assert!(!snap.characters["Alice"].mood.contains("angry"));
        assert_eq!(snap.message_id, 3);
    }

    // === Set deltas ===

    #[test]
    fn set_delta_round_trip_restores_prior_state() {
        let events = vec![
            ev(1, 0, EventData::Physical(TagDelta {
                character: "Alice".into(),
                added: vec!["tired".into()],
                removed: vec![],
            })),
            ev(2, 0, EventData::Physical(TagDelta {
                character: "Alice".into(),
                added: vec![],
                removed: vec!["tired".into()],
            })),
        ];
        let before = project_all(&events, 0);
        let after = project_all(&events, 2);
        assert_eq!(
            before.characters["Alice"].physical,
            after.characters["Alice"].physical
        );
    }

    #[test]
    fn add_and_remove_in_one_delta_ends_present() {
        let events = vec![mood(1, 0, "Alice", &["focused"], &["focused"])];
        let snap = project_all(&events, 1);
        assert!(snap.characters["Alice"].mood.contains("focused"));
    }

    // === Relationships ===

    #[test]
    fn pair_normalization_merges_both_orders() {
        let events = vec![
            ev(1, 0, EventData::Feelings(PairDelta {
                from_character: "Bob".into(),
                toward_character: "Alice".into(),
                added: vec!["trust".into()],
                removed: vec![],
            })),
            ev(2, 0, EventData::Feelings(PairDelta {
                from_character: "Alice".into(),
                toward_character: "Bob".into(),
                added: vec!["gratitude".into()],
                removed: vec![],
            })),
        ];
        let snap = project_all(&events, 2);

        assert_eq!(snap.relationships.len(), 1);
        let rel = snap.relationship("Bob", "Alice").expect("single record");
        // Alice sorts first: a_to_b is Alice→Bob.
        assert!(rel.a_to_b.feelings.contains("gratitude"));
        assert!(rel.b_to_a.feelings.contains("trust"));
    }

    #[test]
    fn relationship_status_overwrites() {
        let events = vec![
            ev(1, 0, EventData::RelationshipStatus(RelationshipStatusData {
                a: "Bob".into(),
                b: "Alice".into(),
                status: RelationshipStatus::Friends,
            })),
            ev(3, 0, EventData::RelationshipStatus(RelationshipStatusData {
                a: "Alice".into(),
                b: "Bob".into(),
                status: RelationshipStatus::Rivals,
            })),
        ];
        let snap = project_all(&events, 3);
        let rel = snap.relationship("Alice", "Bob").expect("record");
        assert_eq!(rel.status, RelationshipStatus::Rivals);
    }

    #[test]
    fn self_relationship_aborts_replay() {
        let events = vec![ev(2, 0, EventData::Feelings(PairDelta {
            from_character: "Alice".into(),
            toward_character: "Alice".into(),
            added: vec!["pride".into()],
            removed: vec![],
        }))];
        let err = project(
            &initial(),
            &events,
            2,
            &SwipeContext::All,
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProjectionError::SelfRelationship {
                name: "Alice".into(),
                message_id: 2
            }
        );
    }

    // === Presence ===

    #[test]
    fn departure_preserves_state_for_reappearance() {
        let events = vec![
            mood(1, 0, "Bob", &["cheerful"], &[]),
            ev(2, 0, EventData::Presence(PresenceData {
                appeared: vec![],
                departed: vec!["Bob".into()],
            })),
            ev(4, 0, EventData::Presence(PresenceData {
                appeared: vec!["Bob".into()],
                departed: vec![],
            })),
        ];

        let departed = project_all(&events, 3);
        assert!(!departed.characters["Bob"].present);
        assert!(departed.characters["Bob"].mood.contains("cheerful"));

        let returned = project_all(&events, 4);
        assert!(returned.characters["Bob"].present);
        assert!(returned.characters["Bob"].mood.contains("cheerful"));
    }

    // === Time ===

    #[test]
    fn adjacent_double_leap_is_clamped() {
        let events = vec![
            ev(5, 0, EventData::Time(TimeData {
                advance_minutes: 480,
                set_to: None,
            })),
            ev(6, 0, EventData::Time(TimeData {
                advance_minutes: 480,
                set_to: None,
            })),
        ];
        let snap = project_all(&events, 6);
        // 18:00 + 8h + 20min cap, not 18:00 + 16h.
        assert_eq!(snap.time.to_string(), "2024-06-02 02:20:00");
    }

    #[test]
    fn distant_leaps_are_not_clamped() {
        let events = vec![
            ev(1, 0, EventData::Time(TimeData {
                advance_minutes: 480,
                set_to: None,
            })),
            ev(8, 0, EventData::Time(TimeData {
                advance_minutes: 480,
                set_to: None,
            })),
        ];
        let snap = project_all(&events, 8);
        assert_eq!(snap.time.to_string(), "2024-06-02 10:00:00");
    }

    #[test]
    fn absolute_time_reset_wins_and_breaks_adjacency() {
        let events = vec![
            ev(3, 0, EventData::Time(TimeData {
                advance_minutes: 480,
                set_to: None,
            })),
            ev(4, 0, EventData::Time(TimeData {
                advance_minutes: 0,
                set_to: Some("2024-06-03T07:00:00".parse().expect("valid datetime")),
            })),
            ev(5, 0, EventData::Time(TimeData {
                advance_minutes: 480,
                set_to: None,
            })),
        ];
        let snap = project_all(&events, 5);
        // Reset to 07:00, then a full (unclamped) 8h leap.
        assert_eq!(snap.time.to_string(), "2024-06-03 15:00:00");
    }

    // === Absolute overwrites ===

    #[test]
    fn location_overwrite_is_field_wise() {
        let events = vec![ev(1, 0, EventData::Location(LocationData {
            area: None,
            place: Some("the back room".into()),
            position: Some("by the hearth".into()),
        }))];
        let snap = project_all(&events, 1);
        assert_eq!(snap.location.area.as_deref(), Some("Harbor District"));
        assert_eq!(snap.location.place.as_deref(), Some("the back room"));
    }

    #[test]
    fn scene_overwrites() {
        let events = vec![
            ev(1, 0, EventData::Climate(ClimateData {
                condition: Some("storm".into()),
                temperature_c: Some(8),
            })),
            ev(1, 0, EventData::Topic(TopicData {
                topic: Some("the shipwreck".into()),
                tone: Some("urgent".into()),
            })),
            ev(2, 0, EventData::Tension(TensionData {
                tension: Tension {
                    level: TensionLevel::High,
                    ..Tension::default()
                },
            })),
        ];
        let snap = project_all(&events, 2);
        assert_eq!(snap.climate.condition.as_deref(), Some("storm"));
        assert_eq!(snap.scene.topic.as_deref(), Some("the shipwreck"));
        assert_eq!(snap.scene.tension.level, TensionLevel::High);
    }

    #[test]
    fn outfit_and_activity_overwrite() {
        let events = vec![
            ev(1, 0, EventData::Outfit(OutfitData {
                character: "Alice".into(),
                slot: OutfitSlot::Jacket,
                item: Some("oilskin coat".into()),
            })),
            ev(2, 0, EventData::Outfit(OutfitData {
                character: "Alice".into(),
                slot: OutfitSlot::Jacket,
                item: None,
            })),
            ev(2, 0, EventData::Activity(ActivityData {
                character: "Alice".into(),
                activity: Some("reading".into()),
            })),
        ];
        let snap = project_all(&events, 2);
        assert_eq!(snap.characters["Alice"].outfit.jacket, None);
        assert_eq!(snap.characters["Alice"].activity.as_deref(), Some("reading"));
    }

    // === Consolidation replace ===

    #[test]
    fn consolidation_replaces_wholesale() {
        let events = vec![
            mood(1, 0, "Alice", &["happy", "excited", "giddy", "pleased", "elated", "thrilled"], &[]),
            ev(2, 0, EventData::ConsolidatedMoods(ConsolidatedTagsData {
                character: "Alice".into(),
                values: vec!["elated".into(), "content".into()],
            })),
        ];
        let snap = project_all(&events, 2);
        let mood = &snap.characters["Alice"].mood;
        assert_eq!(mood.len(), 2);
        assert!(mood.contains("elated"));
        assert!(mood.contains("content"));
        assert!(!mood.contains("happy"));
    }

    // === Chapters & narrative ===

    #[test]
    fn narrative_events_are_chapter_stamped_monotonically() {
        let events = vec![
            ev(1, 0, EventData::Narrative(NarrativeData { text: "one".into() })),
            ev(2, 0, EventData::ChapterBoundary(ChapterBoundaryData {
                reason: crate::event::BoundaryReason::LocationChange,
            })),
            ev(3, 0, EventData::Narrative(NarrativeData { text: "two".into() })),
            ev(3, 0, EventData::ChapterDescription(ChapterDescriptionData {
                chapter: 0,
                title: "The Harbor".into(),
                summary: String::new(),
            })),
        ];
        let snap = project_all(&events, 3);
        let chapters: Vec<u32> = snap.narrative_events.iter().map(|n| n.chapter).collect();
        assert_eq!(chapters, vec![0, 1]);
        assert_eq!(snap.current_chapter, 1);
    }

    // === Missing baseline ===

    #[test]
    fn projecting_before_baseline_is_an_error() {
        let mut init = initial();
        init.message_id = 5;
        let err = project(&init, &[], 2, &SwipeContext::All, &EngineConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            ProjectionError::MissingBaseline {
                message_id: 2,
                first_tracked: 5
            }
        );
    }

    // === Property tests ===

    proptest! {
        #[test]
        fn prop_replay_is_deterministic(
            ops in proptest::collection::vec(
                (0u32..8, 0u32..3, 0usize..4, any::<bool>()),
                0..40,
            )
        ) {
            let tags = ["tired", "happy", "wary", "hopeful"];
            let events: Vec<Event> = ops
                .iter()
                .map(|&(message_id, swipe_id, tag, add)| {
                    let tag = tags[tag];
                    if add {
                        mood(message_id, swipe_id, "Alice", &[tag], &[])
                    } else {
                        mood(message_id, swipe_id, "Alice", &[], &[tag])
                    }
                })
                .collect();

            let ctx = SwipeContext::selected([(2, 1), (5, 2)]);
            let cfg = EngineConfig::default();
            let a = project(&initial(), &events, 8, &ctx, &cfg).expect("projection");
            let b = project(&initial(), &events, 8, &ctx, &cfg).expect("projection");
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_non_canonical_swipes_leave_no_residue(
            canonical_tag in 0usize..4,
            other_tag in 0usize..4,
        ) {
            let tags = ["tired", "happy", "wary", "hopeful"];
            let events = vec![
                mood(3, 0, "Alice", &[tags[canonical_tag]], &[]),
                mood(3, 1, "Alice", &[tags[other_tag]], &[]),
            ];
            let snap = project(
                &initial(),
                &events,
                4,
                &SwipeContext::selected([(3, 0)]),
                &EngineConfig::default(),
            )
            .expect("projection");

            prop_assert!(snap.characters["Alice"].mood.contains(tags[canonical_tag]));
            if other_tag != canonical_tag {
                prop_assert!(!snap.characters["Alice"].mood.contains(tags[other_tag]));
            }
        }
    }
}
