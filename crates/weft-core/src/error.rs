//! Replay-time error taxonomy.
//!
//! Boundary validation ([`crate::event::ValidateError`]) keeps malformed
//! payloads out of the log, so replay errors are rare: they cover projections
//! requested outside the tracked range and events that are contradictory in a
//! way validation cannot see. A replay error is fatal to the one projection
//! call that hit it; the log itself is untouched and projections at other
//! messages are unaffected.

/// Errors from projecting state at a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    /// The requested message predates the initial snapshot.
    #[error(
        "no initial snapshot covers message {message_id}; tracking starts at message {first_tracked}"
    )]
    MissingBaseline { message_id: u32, first_tracked: u32 },

    /// A relationship event relating a character to itself reached replay.
    #[error("event at message {message_id} relates '{name}' to itself")]
    SelfRelationship { name: String, message_id: u32 },

    /// A character-scoped event with an empty name reached replay.
    #[error("event at message {message_id} names an empty character")]
    EmptyCharacterName { message_id: u32 },
}
