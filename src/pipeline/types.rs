//! Core data structures for the penalty pipeline.

use chrono::{DateTime, Utc};

/// Which side of the ball a penalty is charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Offense,
    Defense,
}

/// One play as supplied by the API client. Team names are raw provider
/// spellings; canonicalization happens inside the pipeline.
#[derive(Debug, Clone)]
pub struct PlayRecord {
    pub year: u16,
    pub week: u8,
    pub text: String,
    pub offense_raw: String,
    pub defense_raw: String,
    /// Game start in UTC, when the provider included one.
    pub game_start: Option<DateTime<Utc>>,
}

/// Result of classifying a play's free text.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub is_penalty: bool,
    pub penalty_type: String,
    pub penalty_category: String,
    pub yards: Option<u8>,
}

/// Result of attributing a penalty to one of the two teams on the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    pub committer: String,
    pub side: Side,
    pub drawn: String,
    /// True when neither a team mention nor a keyword default applied and the
    /// step-3 fallback rule decided the attribution.
    pub guessed: bool,
}

/// A classified, attributed penalty. Immutable once created; consumed by the
/// aggregation pass and the raw audit export.
#[derive(Debug, Clone)]
pub struct PenaltyEvent {
    pub year: u16,
    pub week: u8,
    pub game_start: Option<DateTime<Utc>>,
    pub offense: String,
    pub defense: String,
    pub penalty_text: String,
    pub penalty_type: String,
    pub penalty_category: String,
    /// Absent when no yardage phrase was found in the text. Never defaulted
    /// to zero.
    pub penalty_yards: Option<u8>,
    pub committer: String,
    pub committer_side: Side,
    pub committer_guessed: bool,
    pub drawn_team: String,
}

/// One aggregated output row. `week` is None for season granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub team: String,
    pub week: Option<u8>,
    pub penalty_type: String,
    pub penalty_category: String,
    pub total_penalties: u32,
    pub total_yards: u32,
    pub avg_yards_per_penalty: f64,
}

/// Per-team season totals combining the committed and drawn projections.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamTotalsRow {
    pub team: String,
    pub committed_penalties: u32,
    pub committed_yards: u32,
    pub drawn_penalties: u32,
    pub drawn_yards: u32,
    /// drawn minus committed; positive means the team benefited on balance.
    pub net_penalties: i64,
    pub net_yards: i64,
}
