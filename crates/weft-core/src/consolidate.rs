//! Consolidation: collapsing overgrown tag lists back into a bounded set.
//!
//! Repeated additive deltas grow free-form lists (moods, feelings, wants)
//! without bound over a long conversation. Consolidation runs only when
//! explicitly triggered and emits **replacement-kind events** that the
//! projection folds as absolute overwrites; history is never mutated.
//!
//! The engine's pass is mechanical: case-insensitive de-duplication and
//! truncation to the configured ceiling. A collaborator may instead supply a
//! synonym-merged list in the same event kinds; the fold treats both alike.
//! Secrets are never consolidated: they are facts, not adjectives.

use crate::config::ConsolidationConfig;
use crate::event::{
    ConsolidatedPairData, ConsolidatedTagsData, Event, EventData, EventSource,
};
use crate::snapshot::{PairKey, RelationSide, Snapshot};
use std::collections::BTreeSet;

/// Case-insensitive de-dup (first spelling wins) and truncation to `max`.
///
/// Returns `None` when the list is within bounds and needs no event.
fn capped(values: &BTreeSet<String>, max: usize) -> Option<Vec<String>> {
    if values.len() <= max {
        return None;
    }

    let mut seen = BTreeSet::new();
    let mut kept = Vec::new();
    for value in values {
        if seen.insert(value.to_lowercase()) {
            kept.push(value.clone());
        }
        if kept.len() == max {
            break;
        }
    }
    Some(kept)
}

/// Build the replacement events that bring every overgrown list in
/// `snapshot` back within `cfg.max_items`.
///
/// The returned events carry `source` (the position that triggered the
/// pass); appending them to the log makes the cap effective for every later
/// projection. An in-bounds snapshot yields no events.
#[must_use]
pub fn consolidate(
    snapshot: &Snapshot,
    source: EventSource,
    cfg: &ConsolidationConfig,
) -> Vec<Event> {
    let mut events = Vec::new();

    for (name, character) in &snapshot.characters {
        if let Some(values) = capped(&character.mood, cfg.max_items) {
            events.push(Event::new(
                source,
                EventData::ConsolidatedMoods(ConsolidatedTagsData {
                    character: name.clone(),
                    values,
                }),
            ));
        }
        if let Some(values) = capped(&character.physical, cfg.max_items) {
            events.push(Event::new(
                source,
                EventData::ConsolidatedPhysical(ConsolidatedTagsData {
                    character: name.clone(),
                    values,
                }),
            ));
        }
    }

    for (pair, rel) in &snapshot.relationships {
        push_side_events(&mut events, source, pair, &rel.a_to_b, false, cfg);
        push_side_events(&mut events, source, pair, &rel.b_to_a, true, cfg);
    }

    events
}

fn push_side_events(
    events: &mut Vec<Event>,
    source: EventSource,
    pair: &PairKey,
    side: &RelationSide,
    reversed: bool,
    cfg: &ConsolidationConfig,
) {
    let (from, toward) = if reversed {
        (pair.second(), pair.first())
    } else {
        (pair.first(), pair.second())
    };

    if let Some(values) = capped(&side.feelings, cfg.max_items) {
        events.push(Event::new(
            source,
            EventData::ConsolidatedFeelings(ConsolidatedPairData {
                from_character: from.to_string(),
                toward_character: toward.to_string(),
                values,
            }),
        ));
    }
    if let Some(values) = capped(&side.wants, cfg.max_items) {
        events.push(Event::new(
            source,
            EventData::ConsolidatedWants(ConsolidatedPairData {
                from_character: from.to_string(),
                toward_character: toward.to_string(),
                values,
            }),
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::event::EventKind;
    use crate::path::SwipeContext;
    use crate::snapshot::{Climate, InitialSnapshot, Location, SceneState};
    use crate::store::EventLog;
    use std::collections::BTreeMap;

    fn empty_snapshot() -> Snapshot {
        InitialSnapshot {
            message_id: 0,
            time: "2024-06-01T18:00:00".parse().expect("valid datetime"),
            location: Location::default(),
            climate: Climate::default(),
            characters: BTreeMap::new(),
            relationships: BTreeMap::new(),
            scene: SceneState::default(),
        }
        .to_snapshot()
    }

    fn cfg() -> ConsolidationConfig {
        ConsolidationConfig::default()
    }

    // === capped ===

    #[test]
    fn in_bounds_list_emits_nothing() {
        let mut snap = empty_snapshot();
        for tag in ["calm", "curious"] {
            snap.character_mut("Alice").mood.insert(tag.into());
        }
        assert!(consolidate(&snap, EventSource::new(5, 0), &cfg()).is_empty());
    }

    #[test]
    fn overgrown_mood_list_is_capped() {
        let mut snap = empty_snapshot();
        for tag in ["angry", "bitter", "cold", "dour", "edgy", "furious", "grim"] {
            snap.character_mut("Alice").mood.insert(tag.into());
        }

        let events = consolidate(&snap, EventSource::new(5, 0), &cfg());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::ConsolidatedMoods);
        assert_eq!(events[0].source, EventSource::new(5, 0));
        match &events[0].data {
            EventData::ConsolidatedMoods(d) => assert_eq!(d.values.len(), 5),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn case_variants_are_deduplicated() {
        let mut snap = empty_snapshot();
        for tag in ["Tired", "tired", "TIRED", "weary", "spent", "drained", "worn"] {
            snap.character_mut("Alice").physical.insert(tag.into());
        }

        let events = consolidate(&snap, EventSource::new(2, 0), &cfg());
        match &events[0].data {
            EventData::ConsolidatedPhysical(d) => {
                let lowered: Vec<String> = d.values.iter().map(|v| v.to_lowercase()).collect();
                let unique: BTreeSet<&String> = lowered.iter().collect();
                assert_eq!(lowered.len(), unique.len(), "case duplicates kept: {:?}", d.values);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn secrets_are_never_consolidated() {
        let mut snap = empty_snapshot();
        let pair = PairKey::new("Alice", "Bob");
        let rel = snap.relationship_mut(pair);
        for i in 0..10 {
            rel.a_to_b.secrets.insert(format!("secret-{i}"));
        }
        assert!(consolidate(&snap, EventSource::new(1, 0), &cfg()).is_empty());
    }

    #[test]
    fn both_directions_consolidate_independently() {
        let mut snap = empty_snapshot();
        let pair = PairKey::new("Alice", "Bob");
        let rel = snap.relationship_mut(pair);
        for i in 0..8 {
            rel.b_to_a.wants.insert(format!("want-{i}"));
        }
        rel.a_to_b.wants.insert("peace".into());

        let events = consolidate(&snap, EventSource::new(3, 0), &cfg());
        assert_eq!(events.len(), 1);
        match &events[0].data {
            EventData::ConsolidatedWants(d) => {
                // b_to_a is Bob→Alice.
                assert_eq!(d.from_character, "Bob");
                assert_eq!(d.toward_character, "Alice");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    // === End to end through the fold ===

    #[test]
    fn appended_consolidation_caps_later_projections() {
        let engine_cfg = EngineConfig::default();
        let mut log = EventLog::new(InitialSnapshot {
            message_id: 0,
            time: "2024-06-01T18:00:00".parse().expect("valid datetime"),
            location: Location::default(),
            climate: Climate::default(),
            characters: BTreeMap::new(),
            relationships: BTreeMap::new(),
            scene: SceneState::default(),
        });

        log.append((0..7).map(|i| {
            Event::new(
                EventSource::new(1, 0),
                EventData::Mood(crate::event::TagDelta {
                    character: "Alice".into(),
                    added: vec![format!("mood-{i}")],
                    removed: vec![],
                }),
            )
        }));

        let overgrown = log
            .project_at(1, &SwipeContext::All, &engine_cfg)
            .expect("projection");
        assert_eq!(overgrown.characters["Alice"].mood.len(), 7);

        let fixes = consolidate(&overgrown, EventSource::new(1, 0), &engine_cfg.consolidation);
        log.append(fixes);

        let capped = log
            .project_at(1, &SwipeContext::All, &engine_cfg)
            .expect("projection");
        assert_eq!(capped.characters["Alice"].mood.len(), 5);
    }
}
