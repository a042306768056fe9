//! `weft chapters`: list the chapter records derived from the transcript.

use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use weft_core::chapters::compute_chapters;

use crate::output::{OutputMode, pretty_section, render_json};

#[derive(Args, Debug)]
pub struct ChaptersArgs {
    /// Path to the transcript JSON file.
    pub transcript: PathBuf,
}

/// Execute `weft chapters <transcript>`.
///
/// # Errors
///
/// Returns an error if the transcript cannot be loaded or rendering fails.
pub fn run(args: &ChaptersArgs, mode: OutputMode) -> Result<()> {
    let (transcript, log) = super::load_transcript(&args.transcript)?;
    let chapters = compute_chapters(
        log.initial(),
        log.active_events(),
        &transcript.swipe_context(),
    );

    if mode.is_json() {
        return render_json(&chapters);
    }

    let mut out = std::io::stdout().lock();
    pretty_section(&mut out, &format!("{} chapter(s)", chapters.len()))?;
    for chapter in &chapters {
        let title = chapter.title.as_deref().unwrap_or("(untitled)");
        writeln!(
            out,
            "{:>3}  msgs {:>4}..{:<4}  {title}",
            chapter.index, chapter.start_message_id, chapter.end_message_id
        )?;
        if let Some(summary) = &chapter.summary {
            writeln!(out, "     {summary}")?;
        }
    }
    Ok(())
}
