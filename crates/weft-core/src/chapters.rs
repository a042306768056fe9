//! Narrative segmentation: chapters and milestones derived from the log.
//!
//! Chapter boundaries are not inferred here; an upstream classifier emits
//! `chapter.boundary` events for major location changes and large time
//! jumps. This module walks the ordered, canonical event sequence once,
//! incrementing a counter at each boundary and stamping the running counter
//! onto every narrative and milestone event it passes.
//!
//! Span policy: chapter 0 opens at the first tracked message; a boundary at
//! message *m* closes the previous chapter at *m* and opens the next one at
//! *m*. A chapter's end advances with every on-path event it contains, so
//! the last chapter ends at the highest canonical message seen. A boundary
//! immediately followed by another boundary still yields a (degenerate)
//! chapter; zero boundaries yield exactly one chapter spanning the whole
//! history.

use serde::{Deserialize, Serialize};

use crate::event::{Event, EventData};
use crate::path::SwipeContext;
use crate::snapshot::{InitialSnapshot, PairKey};

/// A contiguous range of narrative between detected boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub index: u32,
    pub start_message_id: u32,
    pub end_message_id: u32,
    /// Filled once a `chapter.description` event closes the chapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A narratively significant relationship occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneInfo {
    /// Tagged subject, e.g. `first_kiss`, `betrayal`.
    pub subject: String,
    pub pair: PairKey,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub message_id: u32,
    pub chapter: u32,
}

/// Walk the canonical event sequence once and assemble chapter records.
#[must_use]
pub fn compute_chapters(
    initial: &InitialSnapshot,
    events: &[Event],
    ctx: &SwipeContext,
) -> Vec<Chapter> {
    let mut chapters = vec![Chapter {
        index: 0,
        start_message_id: initial.message_id,
        end_message_id: initial.message_id,
        title: None,
        summary: None,
    }];

    for event in ctx.canonical(events) {
        let message_id = event.source.message_id;

        match &event.data {
            EventData::ChapterBoundary(_) => {
                if let Some(open) = chapters.last_mut() {
                    open.end_message_id = open.end_message_id.max(message_id);
                }
                let index = u32::try_from(chapters.len()).unwrap_or(u32::MAX);
                chapters.push(Chapter {
                    index,
                    start_message_id: message_id,
                    end_message_id: message_id,
                    title: None,
                    summary: None,
                });
            }
            EventData::ChapterDescription(d) => {
                if let Some(chapter) = chapters.get_mut(d.chapter as usize) {
                    chapter.title = Some(d.title.clone());
                    chapter.summary = if d.summary.is_empty() {
                        None
                    } else {
                        Some(d.summary.clone())
                    };
                } else {
                    tracing::warn!(
                        chapter = d.chapter,
                        known = chapters.len(),
                        message_id,
                        "chapter description references an unopened chapter; skipping"
                    );
                }
                if let Some(open) = chapters.last_mut() {
                    open.end_message_id = open.end_message_id.max(message_id);
                }
            }
            _ => {
                if let Some(open) = chapters.last_mut() {
                    open.end_message_id = open.end_message_id.max(message_id);
                }
            }
        }
    }

    chapters
}

/// Collect milestones from the event sequence, stamped with the chapter
/// index counted over the same filtered sequence.
///
/// Pass [`SwipeContext::All`] to search across alternate timelines; chapter
/// indices are then counted over all branches and are only meaningful
/// relative to that unfiltered walk.
#[must_use]
pub fn milestones(events: &[Event], ctx: &SwipeContext) -> Vec<MilestoneInfo> {
    let mut chapter: u32 = 0;
    let mut found = Vec::new();

    for event in ctx.canonical(events) {
        match &event.data {
            EventData::ChapterBoundary(_) => chapter += 1,
            EventData::Milestone(d) => found.push(MilestoneInfo {
                subject: d.subject.clone(),
                pair: PairKey::new(&d.a, &d.b),
                description: d.description.clone(),
                message_id: event.source.message_id,
                chapter,
            }),
            _ => {}
        }
    }

    found
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
