//! Weekly and season aggregation of penalty events.
//!
//! Aggregation is a pure function of the event set: recomputed fully on each
//! run, no incremental state. Committed and drawn views are disjoint
//! projections of the same events — a team's committed rows group by the
//! committer field, its drawn rows by the drawn field.

use std::collections::{BTreeMap, HashSet};

use super::types::{AggregateRow, PenaltyEvent, TeamTotalsRow};

/// Which projection of an event keys the grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Group by the team charged with the penalty.
    Committed,
    /// Group by the team that benefited.
    Drawn,
}

impl View {
    fn team<'a>(self, event: &'a PenaltyEvent) -> &'a str {
        match self {
            View::Committed => &event.committer,
            View::Drawn => &event.drawn_team,
        }
    }
}

/// Output granularity. Weekly rows carry a week number; season rows do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Weekly,
    Season,
}

/// An event is relevant to FBS reporting when either side of it is an FBS
/// team. FBS-vs-non-FBS games still contribute the FBS side's statistics.
pub fn is_fbs_relevant(event: &PenaltyEvent, fbs: &HashSet<String>) -> bool {
    fbs.contains(&event.committer) || fbs.contains(&event.drawn_team)
}

/// Aggregate events into one row per distinct grouping key.
///
/// Only teams present in the FBS set produce rows; an event whose view-side
/// team is non-FBS is dropped from this view (it may still appear in the
/// other view). Events with unknown yardage count toward `total_penalties`
/// but contribute nothing to `total_yards`.
pub fn aggregate(
    events: &[PenaltyEvent],
    view: View,
    granularity: Granularity,
    fbs: &HashSet<String>,
) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<(Option<u8>, String, String, String), (u32, u32)> = BTreeMap::new();
    for event in events {
        let team = view.team(event);
        if !fbs.contains(team) {
            continue;
        }
        let week = match granularity {
            Granularity::Weekly => Some(event.week),
            Granularity::Season => None,
        };
        let key = (
            week,
            team.to_string(),
            event.penalty_type.clone(),
            event.penalty_category.clone(),
        );
        let entry = groups.entry(key).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u32::from(event.penalty_yards.unwrap_or(0));
    }

    groups
        .into_iter()
        .map(|((week, team, penalty_type, penalty_category), (count, yards))| AggregateRow {
            team,
            week,
            penalty_type,
            penalty_category,
            total_penalties: count,
            total_yards: yards,
            avg_yards_per_penalty: safe_avg(yards, count),
        })
        .collect()
}

/// Roll weekly rows up to season rows by summing over identical
/// (team, type, category) keys. Equal to aggregating the full event set at
/// season granularity directly — the associativity the tests pin down.
pub fn season_from_weekly(weekly: &[AggregateRow]) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<(String, String, String), (u32, u32)> = BTreeMap::new();
    for row in weekly {
        let key = (
            row.team.clone(),
            row.penalty_type.clone(),
            row.penalty_category.clone(),
        );
        let entry = groups.entry(key).or_insert((0, 0));
        entry.0 += row.total_penalties;
        entry.1 += row.total_yards;
    }

    groups
        .into_iter()
        .map(|((team, penalty_type, penalty_category), (count, yards))| AggregateRow {
            team,
            week: None,
            penalty_type,
            penalty_category,
            total_penalties: count,
            total_yards: yards,
            avg_yards_per_penalty: safe_avg(yards, count),
        })
        .collect()
}

/// Per-team season totals across both views, with net metrics
/// (drawn minus committed).
pub fn team_totals(events: &[PenaltyEvent], fbs: &HashSet<String>) -> Vec<TeamTotalsRow> {
    let mut groups: BTreeMap<String, (u32, u32, u32, u32)> = BTreeMap::new();
    for event in events {
        let yards = u32::from(event.penalty_yards.unwrap_or(0));
        if fbs.contains(&event.committer) {
            let entry = groups.entry(event.committer.clone()).or_insert((0, 0, 0, 0));
            entry.0 += 1;
            entry.1 += yards;
        }
        if fbs.contains(&event.drawn_team) {
            let entry = groups.entry(event.drawn_team.clone()).or_insert((0, 0, 0, 0));
            entry.2 += 1;
            entry.3 += yards;
        }
    }

    groups
        .into_iter()
        .map(|(team, (cp, cy, dp, dy))| TeamTotalsRow {
            team,
            committed_penalties: cp,
            committed_yards: cy,
            drawn_penalties: dp,
            drawn_yards: dy,
            net_penalties: i64::from(dp) - i64::from(cp),
            net_yards: i64::from(dy) - i64::from(cy),
        })
        .collect()
}

/// Average yards per penalty, rounded to two decimals; 0 for an empty group
/// rather than a division error.
fn safe_avg(yards: u32, count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round2(f64::from(yards) / f64::from(count))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
