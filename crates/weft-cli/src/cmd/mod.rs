//! Command handlers for the `weft` CLI.

pub mod chapters;
pub mod check;
pub mod export;
pub mod milestones;
pub mod state;

use anyhow::{Context, Result};
use std::path::Path;
use weft_core::{EventLog, Transcript};

/// Load a transcript and reconstruct its event log.
pub fn load_transcript(path: &Path) -> Result<(Transcript, EventLog)> {
    let transcript = Transcript::load(path)
        .with_context(|| format!("Failed to load transcript {}", path.display()))?;
    let log = transcript
        .to_log()
        .with_context(|| format!("Failed to reconstruct event log from {}", path.display()))?;
    Ok((transcript, log))
}

/// The message to query when `--at` is not given: the last message in the
/// transcript, or the log's own maximum when the transcript is empty.
pub fn default_message(transcript: &Transcript, log: &EventLog) -> u32 {
    transcript
        .messages
        .iter()
        .map(|m| m.id)
        .max()
        .unwrap_or_else(|| log.max_message_id())
}
