//! `weft milestones`: list milestone occurrences.

use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use weft_core::SwipeContext;
use weft_core::chapters::milestones;

use crate::output::{OutputMode, pretty_section, render_json};

#[derive(Args, Debug)]
pub struct MilestonesArgs {
    /// Path to the transcript JSON file.
    pub transcript: PathBuf,

    /// Search every swipe branch, not just the selected timeline.
    #[arg(long)]
    pub all_timelines: bool,
}

/// Execute `weft milestones <transcript>`.
///
/// # Errors
///
/// Returns an error if the transcript cannot be loaded or rendering fails.
pub fn run(args: &MilestonesArgs, mode: OutputMode) -> Result<()> {
    let (transcript, log) = super::load_transcript(&args.transcript)?;
    let ctx = if args.all_timelines {
        SwipeContext::All
    } else {
        transcript.swipe_context()
    };
    let found = milestones(log.active_events(), &ctx);

    if mode.is_json() {
        return render_json(&found);
    }

    let mut out = std::io::stdout().lock();
    pretty_section(&mut out, &format!("{} milestone(s)", found.len()))?;
    for milestone in &found {
        writeln!(
            out,
            "[ch {} / msg {}] {} ({})",
            milestone.chapter, milestone.message_id, milestone.subject, milestone.pair
        )?;
        if !milestone.description.is_empty() {
            writeln!(out, "     {}", milestone.description)?;
        }
    }
    Ok(())
}
