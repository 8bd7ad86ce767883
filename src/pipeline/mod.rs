//! Penalty extraction and attribution pipeline.
//!
//! Stages, leaves first:
//!
//! - **normalize**: canonicalizes school/conference names across datasets
//! - **classify**: penalty detection, type, category, and yardage from text
//! - **committer**: decides which team committed and which team drew
//! - **cutoff**: weekly reporting-window filter
//! - **aggregate**: weekly and season summary rows
//!
//! The pipeline is batch-oriented and synchronous: a bounded collection of
//! play records in, attributed penalty events out, nothing shared or mutable
//! between runs. Malformed records are skipped and counted, never fatal.

pub mod aggregate;
pub mod classify;
pub mod committer;
pub mod cutoff;
pub mod normalize;
pub mod types;

pub use aggregate::{aggregate, is_fbs_relevant, season_from_weekly, team_totals, Granularity, View};
pub use classify::{extract_yards, ClassifierConfig, KeywordRule, OTHER_CATEGORY, UNCLASSIFIED_TYPE};
pub use committer::resolve;
pub use cutoff::{include_play, passes_weekly_cutoff, weekly_cutoff};
pub use normalize::{collapse_whitespace, normalize_key, AliasTable};
pub use types::{
    AggregateRow, Attribution, Classification, PenaltyEvent, PlayRecord, Side, TeamTotalsRow,
};

use tracing::{debug, info};

/// Per-run counters, surfaced in logs and available to callers that want to
/// report skipped or heuristic records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub plays_scanned: u64,
    /// Records with no usable text — skipped, not fatal.
    pub missing_text: u64,
    pub non_penalty: u64,
    pub excluded_by_cutoff: u64,
    /// Events whose attribution came from the step-3 fallback rule.
    pub guessed_attributions: u64,
    pub events: u64,
}

/// Batch pipeline turning raw play records into attributed penalty events.
///
/// Holds the read-only tables for a run: the name alias table and the
/// classifier rule set. Both are built once and never mutated.
pub struct PenaltyPipeline {
    aliases: AliasTable,
    classifier: ClassifierConfig,
}

impl Default for PenaltyPipeline {
    fn default() -> Self {
        Self::new(AliasTable::default(), ClassifierConfig::default())
    }
}

impl PenaltyPipeline {
    pub fn new(aliases: AliasTable, classifier: ClassifierConfig) -> Self {
        Self { aliases, classifier }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Run the full extraction pass over a batch of plays.
    ///
    /// Order per record: text check → penalty classification → name
    /// canonicalization → weekly cutoff → committer attribution. Every
    /// record either produces exactly one event or increments one skip
    /// counter.
    pub fn process(&self, plays: &[PlayRecord]) -> (Vec<PenaltyEvent>, PipelineStats) {
        let mut stats = PipelineStats::default();
        let mut events = Vec::new();

        for play in plays {
            stats.plays_scanned += 1;

            let text = play.text.trim();
            if text.is_empty() {
                stats.missing_text += 1;
                continue;
            }

            let classification = self.classifier.classify(text);
            if !classification.is_penalty {
                stats.non_penalty += 1;
                continue;
            }

            if !passes_weekly_cutoff(play.game_start) {
                stats.excluded_by_cutoff += 1;
                continue;
            }

            let offense = self.aliases.canonicalize(&play.offense_raw);
            let defense = self.aliases.canonicalize(&play.defense_raw);
            let attribution = resolve(text, &offense, &defense);
            if attribution.guessed {
                stats.guessed_attributions += 1;
            }

            debug!(
                week = play.week,
                penalty_type = %classification.penalty_type,
                committer = %attribution.committer,
                guessed = attribution.guessed,
                "penalty event"
            );

            events.push(PenaltyEvent {
                year: play.year,
                week: play.week,
                game_start: play.game_start,
                offense,
                defense,
                penalty_text: text.to_string(),
                penalty_type: classification.penalty_type,
                penalty_category: classification.penalty_category,
                penalty_yards: classification.yards,
                committer: attribution.committer,
                committer_side: attribution.side,
                committer_guessed: attribution.guessed,
                drawn_team: attribution.drawn,
            });
        }

        stats.events = events.len() as u64;
        info!(
            plays_scanned = stats.plays_scanned,
            events = stats.events,
            missing_text = stats.missing_text,
            non_penalty = stats.non_penalty,
            excluded_by_cutoff = stats.excluded_by_cutoff,
            guessed_attributions = stats.guessed_attributions,
            "pipeline pass complete"
        );
        (events, stats)
    }
}
