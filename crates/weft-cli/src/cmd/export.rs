//! `weft export`: one JSON document with snapshot, chapters, and milestones.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use weft_core::chapters::{compute_chapters, milestones};
use weft_core::{Chapter, EngineConfig, MilestoneInfo, Snapshot};

use crate::output::render_json;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the transcript JSON file.
    pub transcript: PathBuf,

    /// Message to project at. Defaults to the last message.
    #[arg(long)]
    pub at: Option<u32>,
}

/// The export document consumed by external tooling.
#[derive(Debug, Serialize)]
pub struct ExportDoc {
    pub snapshot: Snapshot,
    pub chapters: Vec<Chapter>,
    pub milestones: Vec<MilestoneInfo>,
}

/// Execute `weft export <transcript>`. Always JSON, regardless of mode.
///
/// # Errors
///
/// Returns an error if the transcript cannot be loaded or the projection
/// fails.
pub fn run(args: &ExportArgs, cfg: &EngineConfig) -> Result<()> {
    let (transcript, log) = super::load_transcript(&args.transcript)?;
    let at = args.at.unwrap_or_else(|| super::default_message(&transcript, &log));
    let ctx = transcript.swipe_context();

    let doc = ExportDoc {
        snapshot: log.project_at(at, &ctx, cfg)?,
        chapters: compute_chapters(log.initial(), log.active_events(), &ctx),
        milestones: milestones(log.active_events(), &ctx),
    };
    render_json(&doc)
}
