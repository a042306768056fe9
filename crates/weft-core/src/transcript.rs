//! Persisted layout: the event log attached to a chat transcript.
//!
//! Events are not stored in their own database. They ride along with the
//! host transcript, keyed by `(message, swipe)`, so the whole log can be
//! reconstructed by scanning the transcript, and the transcript remains the
//! single source of truth for which swipe is currently selected. The initial
//! snapshot is stored exactly once, on the first tracked message.
//!
//! The loader is the malformed-event boundary: every payload is validated
//! before it enters the log, and an event whose recorded source disagrees
//! with the cell it sits in is rejected as corruption.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::event::{Event, EventSource, ValidateError};
use crate::path::SwipeContext;
use crate::snapshot::InitialSnapshot;
use crate::store::EventLog;

/// A chat transcript with attached narrative events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub messages: Vec<TranscriptMessage>,
}

/// One chat message with its alternative continuations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub id: u32,
    /// The swipe currently displayed for this message.
    #[serde(default)]
    pub current_swipe: u32,
    /// Present only on the first tracked message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_snapshot: Option<InitialSnapshot>,
    #[serde(default)]
    pub swipes: Vec<SwipeRecord>,
}

/// One swipe of a message, carrying the events it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeRecord {
    pub id: u32,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Failures reading, parsing, or interpreting a transcript.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("failed to read transcript {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transcript {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode transcript")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("transcript has no initial snapshot; nothing to replay from")]
    MissingBaseline,

    #[error("transcript has initial snapshots on messages {first} and {second}; expected one")]
    DuplicateBaseline { first: u32, second: u32 },

    #[error("malformed event at message {message_id} swipe {swipe_id}")]
    Malformed {
        message_id: u32,
        swipe_id: u32,
        #[source]
        source: ValidateError,
    },

    #[error("event stored at message {message_id} swipe {swipe_id} claims source {found}")]
    SourceMismatch {
        message_id: u32,
        swipe_id: u32,
        found: EventSource,
    },
}

impl Transcript {
    /// Load a transcript from a JSON file.
    ///
    /// # Errors
    ///
    /// [`TranscriptError::Io`] / [`TranscriptError::Parse`].
    pub fn load(path: &Path) -> Result<Self, TranscriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| TranscriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| TranscriptError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the transcript back to a JSON file.
    ///
    /// # Errors
    ///
    /// [`TranscriptError::Io`] on write failure.
    pub fn save(&self, path: &Path) -> Result<(), TranscriptError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| TranscriptError::Encode { source })?;
        std::fs::write(path, json).map_err(|source| TranscriptError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The canonical swipe selection currently encoded in the transcript.
    #[must_use]
    pub fn swipe_context(&self) -> SwipeContext {
        SwipeContext::selected(self.messages.iter().map(|m| (m.id, m.current_swipe)))
    }

    /// Reconstruct the event log by scanning the transcript.
    ///
    /// Messages and swipes are visited in id order; events keep their stored
    /// order within each cell and are re-stamped with fresh sequence numbers
    /// in scan order.
    ///
    /// # Errors
    ///
    /// Layout errors (missing/duplicate baseline), malformed payloads, and
    /// source/cell mismatches.
    pub fn to_log(&self) -> Result<EventLog, TranscriptError> {
        let mut messages: Vec<&TranscriptMessage> = self.messages.iter().collect();
        messages.sort_by_key(|m| m.id);

        let mut initial: Option<(u32, &InitialSnapshot)> = None;
        for message in &messages {
            if let Some(snapshot) = &message.initial_snapshot {
                if let Some((first, _)) = initial {
                    return Err(TranscriptError::DuplicateBaseline {
                        first,
                        second: message.id,
                    });
                }
                initial = Some((message.id, snapshot));
            }
        }
        let Some((_, initial)) = initial else {
            return Err(TranscriptError::MissingBaseline);
        };

        let mut events = Vec::new();
        for message in &messages {
            let mut swipes: Vec<&SwipeRecord> = message.swipes.iter().collect();
            swipes.sort_by_key(|s| s.id);

            for swipe in swipes {
                let cell = EventSource::new(message.id, swipe.id);
                for event in &swipe.events {
                    if event.source != cell {
                        return Err(TranscriptError::SourceMismatch {
                            message_id: message.id,
                            swipe_id: swipe.id,
                            found: event.source,
                        });
                    }
                    event.data.validate().map_err(|source| {
                        TranscriptError::Malformed {
                            message_id: message.id,
                            swipe_id: swipe.id,
                            source,
                        }
                    })?;
                    events.push(event.clone());
                }
            }
        }

        let mut log = EventLog::new(initial.clone());
        log.append(events);
        Ok(log)
    }

    /// Write a (possibly edited) log back into the transcript shape.
    ///
    /// Each swipe cell is overwritten with the log's events for that source;
    /// the initial snapshot moves to its first tracked message. Messages the
    /// host has that the log never touched simply end up with empty cells.
    pub fn sync_from_log(&mut self, log: &EventLog) {
        let first_tracked = log.initial().message_id;
        let mut placed = false;

        for message in &mut self.messages {
            message.initial_snapshot = if message.id == first_tracked {
                placed = true;
                Some(log.initial().clone())
            } else {
                None
            };

            for swipe in &mut message.swipes {
                swipe.events = log
                    .events_at(EventSource::new(message.id, swipe.id))
                    .into_iter()
                    .cloned()
                    .collect();
            }
        }

        if !placed {
            tracing::warn!(
                message_id = first_tracked,
                "transcript has no message for the initial snapshot; baseline not persisted"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
