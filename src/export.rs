//! CSV export of pipeline outputs.
//!
//! Columns are stable: `team, week, penalty_type, penalty_category,
//! total_penalties, total_yards, avg_yards_per_penalty` for the summary
//! families, plus the raw audit rows and the team totals sheet. Every file
//! is written to a temporary sibling and renamed into place, so a crash
//! mid-export never leaves a truncated output behind; callers only invoke
//! this module after the full in-memory aggregation has succeeded.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::pipeline::{AggregateRow, PenaltyEvent};
use crate::rankings::{RowWithContext, TotalsWithContext};

/// One raw audit row. Mirrors PenaltyEvent with the committer-confidence
/// flag included so heuristic attributions stay auditable downstream.
#[derive(Debug, Serialize)]
struct RawRecord<'a> {
    year: u16,
    week: u8,
    game_start_utc: String,
    offense: &'a str,
    defense: &'a str,
    penalty_text: &'a str,
    penalty_type: &'a str,
    penalty_category: &'a str,
    penalty_yards: Option<u8>,
    committer: &'a str,
    committer_side: &'a str,
    committer_guessed: bool,
    drawn_team: &'a str,
}

#[derive(Debug, Serialize)]
struct WeeklyRecord<'a> {
    week: u8,
    team: &'a str,
    penalty_type: &'a str,
    penalty_category: &'a str,
    total_penalties: u32,
    total_yards: u32,
    avg_yards_per_penalty: f64,
}

#[derive(Debug, Serialize)]
struct SeasonRecord<'a> {
    team: &'a str,
    penalty_type: &'a str,
    penalty_category: &'a str,
    total_penalties: u32,
    total_yards: u32,
    avg_yards_per_penalty: f64,
}

/// Write the raw audit export, one row per penalty event.
pub fn write_raw_events<P: AsRef<Path>>(path: P, events: &[PenaltyEvent]) -> Result<()> {
    write_atomically(path.as_ref(), |writer| {
        for event in events {
            writer.serialize(RawRecord {
                year: event.year,
                week: event.week,
                game_start_utc: event
                    .game_start
                    .map(|ts| ts.to_rfc3339())
                    .unwrap_or_default(),
                offense: &event.offense,
                defense: &event.defense,
                penalty_text: &event.penalty_text,
                penalty_type: &event.penalty_type,
                penalty_category: &event.penalty_category,
                penalty_yards: event.penalty_yards,
                committer: &event.committer,
                committer_side: side_label(event),
                committer_guessed: event.committer_guessed,
                drawn_team: &event.drawn_team,
            })?;
        }
        Ok(())
    })?;
    info!(path = %path.as_ref().display(), rows = events.len(), "wrote raw events");
    Ok(())
}

fn side_label(event: &PenaltyEvent) -> &'static str {
    match event.committer_side {
        crate::pipeline::Side::Offense => "offense",
        crate::pipeline::Side::Defense => "defense",
    }
}

/// Write weekly aggregate rows. Rows must carry a week number.
pub fn write_weekly<P: AsRef<Path>>(path: P, rows: &[AggregateRow]) -> Result<()> {
    write_atomically(path.as_ref(), |writer| {
        for row in rows {
            writer.serialize(WeeklyRecord {
                week: row.week.unwrap_or(0),
                team: &row.team,
                penalty_type: &row.penalty_type,
                penalty_category: &row.penalty_category,
                total_penalties: row.total_penalties,
                total_yards: row.total_yards,
                avg_yards_per_penalty: row.avg_yards_per_penalty,
            })?;
        }
        Ok(())
    })?;
    info!(path = %path.as_ref().display(), rows = rows.len(), "wrote weekly summary");
    Ok(())
}

/// Write season aggregate rows (no week column).
pub fn write_season<P: AsRef<Path>>(path: P, rows: &[AggregateRow]) -> Result<()> {
    write_atomically(path.as_ref(), |writer| {
        for row in rows {
            writer.serialize(SeasonRecord {
                team: &row.team,
                penalty_type: &row.penalty_type,
                penalty_category: &row.penalty_category,
                total_penalties: row.total_penalties,
                total_yards: row.total_yards,
                avg_yards_per_penalty: row.avg_yards_per_penalty,
            })?;
        }
        Ok(())
    })?;
    info!(path = %path.as_ref().display(), rows = rows.len(), "wrote season summary");
    Ok(())
}

/// Write season rows joined with conference and latest-week poll ranks.
/// The rank columns vary by season, so the header is assembled by hand:
/// base columns, then one column per poll in `polls` order.
pub fn write_season_with_rankings<P: AsRef<Path>>(
    path: P,
    rows: &[RowWithContext],
    polls: &[String],
) -> Result<()> {
    write_atomically(path.as_ref(), |writer| {
        let mut header = vec![
            "team",
            "conference",
            "penalty_type",
            "penalty_category",
            "total_penalties",
            "total_yards",
            "avg_yards_per_penalty",
        ]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();
        header.extend(polls.iter().cloned());
        writer.write_record(&header)?;

        for item in rows {
            let mut record = vec![
                item.row.team.clone(),
                item.conference.clone(),
                item.row.penalty_type.clone(),
                item.row.penalty_category.clone(),
                item.row.total_penalties.to_string(),
                item.row.total_yards.to_string(),
                format!("{:.2}", item.row.avg_yards_per_penalty),
            ];
            for poll in polls {
                record.push(
                    item.ranks
                        .get(poll)
                        .map(|r| r.to_string())
                        .unwrap_or_default(),
                );
            }
            writer.write_record(&record)?;
        }
        Ok(())
    })?;
    info!(path = %path.as_ref().display(), rows = rows.len(), "wrote season summary with rankings");
    Ok(())
}

#[derive(Debug, Serialize)]
struct TotalsRecord<'a> {
    team: &'a str,
    conference: &'a str,
    committed_penalties: u32,
    committed_yards: u32,
    drawn_penalties: u32,
    drawn_yards: u32,
    net_penalties: i64,
    net_yards: i64,
}

/// Write the per-team totals summary.
pub fn write_team_totals<P: AsRef<Path>>(path: P, totals: &[TotalsWithContext]) -> Result<()> {
    write_atomically(path.as_ref(), |writer| {
        for item in totals {
            writer.serialize(TotalsRecord {
                team: &item.totals.team,
                conference: &item.conference,
                committed_penalties: item.totals.committed_penalties,
                committed_yards: item.totals.committed_yards,
                drawn_penalties: item.totals.drawn_penalties,
                drawn_yards: item.totals.drawn_yards,
                net_penalties: item.totals.net_penalties,
                net_yards: item.totals.net_yards,
            })?;
        }
        Ok(())
    })?;
    info!(path = %path.as_ref().display(), rows = totals.len(), "wrote team totals");
    Ok(())
}

/// Run `fill` against a writer on a temporary sibling file, then rename over
/// the destination.
fn write_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<std::fs::File>) -> Result<()>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    let tmp: PathBuf = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)
            .with_context(|| format!("opening {} for writing", tmp.display()))?;
        fill(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("flushing {}", tmp.display()))?;
    }
    std::fs::rename(&tmp, path)
        .with_context(|| format!("moving {} into place", path.display()))?;
    Ok(())
}
