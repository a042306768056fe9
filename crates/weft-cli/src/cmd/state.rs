//! `weft state`: project and display the narrative state at a message.

use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use weft_core::{EngineConfig, ProjectionError, Snapshot, SwipeContext};

use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_json};

#[derive(Args, Debug)]
pub struct StateArgs {
    /// Path to the transcript JSON file.
    pub transcript: PathBuf,

    /// Message to project at. Defaults to the last message.
    #[arg(long)]
    pub at: Option<u32>,

    /// Ignore swipe selection and fold every branch.
    #[arg(long)]
    pub all_swipes: bool,
}

/// Execute `weft state <transcript>`.
///
/// A projection outside the tracked range renders a placeholder instead of
/// failing the command: the baseline starts partway through long chats and
/// asking about earlier messages is routine.
///
/// # Errors
///
/// Returns an error if the transcript cannot be loaded or a replay-class
/// projection error occurs.
pub fn run(args: &StateArgs, mode: OutputMode, cfg: &EngineConfig) -> Result<()> {
    let (transcript, log) = super::load_transcript(&args.transcript)?;
    let at = args.at.unwrap_or_else(|| super::default_message(&transcript, &log));
    let ctx = if args.all_swipes {
        SwipeContext::All
    } else {
        transcript.swipe_context()
    };

    match log.project_at(at, &ctx, cfg) {
        Ok(snapshot) => render(&snapshot, mode),
        Err(err @ ProjectionError::MissingBaseline { .. }) => {
            tracing::debug!(%err, "rendering placeholder for untracked message");
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "(no tracked state at message {at})")?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn render(snapshot: &Snapshot, mode: OutputMode) -> Result<()> {
    if mode.is_json() {
        return render_json(snapshot);
    }

    let mut out = std::io::stdout().lock();

    pretty_section(&mut out, &format!("Scene at message {}", snapshot.message_id))?;
    pretty_kv(&mut out, "Time", snapshot.time.format("%Y-%m-%d %H:%M").to_string())?;
    pretty_kv(&mut out, "Location", location_line(snapshot))?;
    if snapshot.climate.condition.is_some() || snapshot.climate.temperature_c.is_some() {
        pretty_kv(&mut out, "Climate", climate_line(snapshot))?;
    }
    if let Some(topic) = &snapshot.scene.topic {
        pretty_kv(&mut out, "Topic", topic)?;
    }
    if let Some(tone) = &snapshot.scene.tone {
        pretty_kv(&mut out, "Tone", tone)?;
    }
    pretty_kv(&mut out, "Tension", tension_line(snapshot))?;
    pretty_kv(&mut out, "Chapter", snapshot.current_chapter.to_string())?;

    writeln!(out)?;
    pretty_section(&mut out, "Characters")?;
    for (name, character) in &snapshot.characters {
        let marker = if character.present { "*" } else { " " };
        let mut line = format!("{marker} {name}");
        if let Some(position) = &character.position {
            line.push_str(&format!(": {position}"));
        }
        if let Some(activity) = &character.activity {
            line.push_str(&format!(", {activity}"));
        }
        if !character.mood.is_empty() {
            let moods: Vec<&str> = character.mood.iter().map(String::as_str).collect();
            line.push_str(&format!(" [{}]", moods.join(", ")));
        }
        writeln!(out, "{line}")?;
    }

    if !snapshot.relationships.is_empty() {
        writeln!(out)?;
        pretty_section(&mut out, "Relationships")?;
        for (pair, rel) in &snapshot.relationships {
            writeln!(out, "{pair}: {}", rel.status)?;
        }
    }

    if !snapshot.narrative_events.is_empty() {
        writeln!(out)?;
        pretty_section(&mut out, "Narrative")?;
        for event in &snapshot.narrative_events {
            writeln!(
                out,
                "[ch {} / msg {}] {}",
                event.chapter, event.message_id, event.text
            )?;
        }
    }

    pretty_rule(&mut out)?;
    Ok(())
}

fn location_line(snapshot: &Snapshot) -> String {
    let parts: Vec<&str> = [
        snapshot.location.area.as_deref(),
        snapshot.location.place.as_deref(),
        snapshot.location.position.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    if parts.is_empty() {
        "(unknown)".to_string()
    } else {
        parts.join(", ")
    }
}

fn climate_line(snapshot: &Snapshot) -> String {
    match (
        snapshot.climate.condition.as_deref(),
        snapshot.climate.temperature_c,
    ) {
        (Some(condition), Some(t)) => format!("{condition}, {t}°C"),
        (Some(condition), None) => condition.to_string(),
        (None, Some(t)) => format!("{t}°C"),
        (None, None) => String::new(),
    }
}

fn tension_line(snapshot: &Snapshot) -> String {
    let tension = snapshot.scene.tension;
    let level = format!("{:?}", tension.level).to_lowercase();
    let direction = format!("{:?}", tension.direction).to_lowercase();
    match tension.kind {
        Some(kind) => format!("{level} ({:?}, {direction})", kind).to_lowercase(),
        None => format!("{level} ({direction})"),
    }
}
