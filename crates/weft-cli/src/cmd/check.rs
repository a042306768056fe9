//! `weft check`: validate a transcript and report what it holds.
//!
//! Reconstructing the log exercises the whole boundary: JSON shape, baseline
//! layout, per-event payload validation, and source/cell consistency. On
//! success the report summarizes the reconstructed log.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_json};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the transcript JSON file.
    pub transcript: PathBuf,
}

/// Validation report for a healthy transcript.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub messages: usize,
    pub swipes: usize,
    pub events: usize,
    pub first_tracked_message: u32,
    pub max_message_id: u32,
    pub events_by_kind: BTreeMap<String, usize>,
}

/// Execute `weft check <transcript>`.
///
/// # Errors
///
/// Any boundary violation (unreadable file, malformed event, misplaced
/// baseline) surfaces as the command's error, with the offending position in
/// the error chain.
pub fn run(args: &CheckArgs, mode: OutputMode) -> Result<()> {
    let (transcript, log) = super::load_transcript(&args.transcript)?;

    let mut events_by_kind: BTreeMap<String, usize> = BTreeMap::new();
    for event in log.active_events() {
        *events_by_kind.entry(event.kind().to_string()).or_default() += 1;
    }

    let report = CheckReport {
        messages: transcript.messages.len(),
        swipes: transcript.messages.iter().map(|m| m.swipes.len()).sum(),
        events: log.len(),
        first_tracked_message: log.initial().message_id,
        max_message_id: log.max_message_id(),
        events_by_kind,
    };

    if mode.is_json() {
        return render_json(&report);
    }

    let mut out = std::io::stdout().lock();
    pretty_section(&mut out, "Transcript OK")?;
    pretty_kv(&mut out, "Messages", report.messages.to_string())?;
    pretty_kv(&mut out, "Swipes", report.swipes.to_string())?;
    pretty_kv(&mut out, "Events", report.events.to_string())?;
    pretty_kv(
        &mut out,
        "Tracked range",
        format!(
            "messages {}..{}",
            report.first_tracked_message, report.max_message_id
        ),
    )?;
    for (kind, count) in &report.events_by_kind {
        writeln!(out, "  {count:>5}  {kind}")?;
    }
    Ok(())
}
