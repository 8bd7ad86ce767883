//! Poll rankings and conference reference data.
//!
//! The rankings feed arrives nested (week → polls → ranks); this module
//! flattens it, keeps the most recent week, and pivots it to one rank per
//! (school, poll). Conference assignments come from the FBS team list. All
//! names are canonicalized before use so joins against pipeline output line
//! up. Teams absent from the reference data join as "Non-FBS" rather than
//! being dropped.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{debug, info};

use crate::cfbd::{ApiRankingWeek, ApiTeam};
use crate::pipeline::{AggregateRow, AliasTable, TeamTotalsRow};

/// Conference label for teams missing from the reference tables.
pub const NON_FBS: &str = "Non-FBS";

/// One flattened poll entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    pub season: u16,
    pub week: u8,
    pub poll: String,
    pub rank: u16,
    pub school: String,
    pub conference: Option<String>,
    pub points: f64,
}

/// Flatten the nested rankings response, canonicalizing school names and
/// dropping entries without a school or rank.
pub fn flatten_rankings(raw: &[ApiRankingWeek], aliases: &AliasTable) -> Vec<RankingEntry> {
    let mut entries = Vec::new();
    for week in raw {
        let (Some(season), Some(week_num)) = (week.season, week.week) else {
            continue;
        };
        for poll in &week.polls {
            let poll_name = poll.poll.clone().unwrap_or_else(|| "Poll".to_string());
            for rank in &poll.ranks {
                let (Some(school), Some(position)) = (rank.school.as_deref(), rank.rank) else {
                    continue;
                };
                entries.push(RankingEntry {
                    season,
                    week: week_num,
                    poll: poll_name.clone(),
                    rank: position,
                    school: aliases.canonicalize(school),
                    conference: rank.conference.as_deref().map(|c| aliases.canonicalize(c)),
                    points: rank.points.unwrap_or(0.0),
                });
            }
        }
    }
    debug!(entries = entries.len(), "flattened rankings");
    entries
}

/// Latest-week rankings pivoted to school → {poll → rank}.
#[derive(Debug, Clone, Default)]
pub struct RankingsPivot {
    latest_week: Option<u8>,
    by_school: HashMap<String, BTreeMap<String, u16>>,
}

impl RankingsPivot {
    /// Build from flattened entries by keeping only the maximum week present.
    pub fn latest_week(entries: &[RankingEntry]) -> Self {
        let Some(latest) = entries.iter().map(|e| e.week).max() else {
            return Self::default();
        };
        let mut by_school: HashMap<String, BTreeMap<String, u16>> = HashMap::new();
        for entry in entries.iter().filter(|e| e.week == latest) {
            by_school
                .entry(entry.school.clone())
                .or_default()
                // First rank wins if a poll lists a school twice.
                .entry(entry.poll.clone())
                .or_insert(entry.rank);
        }
        info!(week = latest, schools = by_school.len(), "built rankings pivot");
        Self {
            latest_week: Some(latest),
            by_school,
        }
    }

    pub fn week(&self) -> Option<u8> {
        self.latest_week
    }

    /// Ranks for one school, if it appears in any poll.
    pub fn ranks_for(&self, school: &str) -> Option<&BTreeMap<String, u16>> {
        self.by_school.get(school)
    }

    /// Sorted list of every poll present, used as export column headers.
    pub fn polls(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .by_school
            .values()
            .flat_map(|polls| polls.keys().map(String::as_str))
            .collect();
        set.into_iter().map(String::from).collect()
    }
}

/// Canonical school → canonical conference, from the FBS team list.
pub fn conference_map(teams: &[ApiTeam], aliases: &AliasTable) -> HashMap<String, String> {
    teams
        .iter()
        .map(|t| {
            let school = aliases.canonicalize(&t.school);
            let conference = t
                .conference
                .as_deref()
                .map(|c| aliases.canonicalize(c))
                .unwrap_or_else(|| NON_FBS.to_string());
            (school, conference)
        })
        .collect()
}

/// The set of canonical FBS school names — the retention filter for the
/// committed/drawn summaries.
pub fn fbs_set(teams: &[ApiTeam], aliases: &AliasTable) -> HashSet<String> {
    teams.iter().map(|t| aliases.canonicalize(&t.school)).collect()
}

/// A season aggregate row decorated with reference data for export.
#[derive(Debug, Clone)]
pub struct RowWithContext {
    pub row: AggregateRow,
    pub conference: String,
    pub ranks: BTreeMap<String, u16>,
}

/// Join conference and latest-week ranks onto season rows.
pub fn decorate_rows(
    rows: Vec<AggregateRow>,
    conferences: &HashMap<String, String>,
    pivot: &RankingsPivot,
) -> Vec<RowWithContext> {
    rows.into_iter()
        .map(|row| {
            let conference = conferences
                .get(&row.team)
                .cloned()
                .unwrap_or_else(|| NON_FBS.to_string());
            let ranks = pivot.ranks_for(&row.team).cloned().unwrap_or_default();
            RowWithContext {
                row,
                conference,
                ranks,
            }
        })
        .collect()
}

/// A team totals row decorated with its conference.
#[derive(Debug, Clone)]
pub struct TotalsWithContext {
    pub totals: TeamTotalsRow,
    pub conference: String,
}

/// Join conference assignments onto team totals.
pub fn decorate_totals(
    totals: Vec<TeamTotalsRow>,
    conferences: &HashMap<String, String>,
) -> Vec<TotalsWithContext> {
    totals
        .into_iter()
        .map(|t| {
            let conference = conferences
                .get(&t.team)
                .cloned()
                .unwrap_or_else(|| NON_FBS.to_string());
            TotalsWithContext {
                totals: t,
                conference,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfbd::{ApiPoll, ApiRank};

    fn ranking_week(week: u8, poll: &str, schools: &[(&str, u16)]) -> ApiRankingWeek {
        ApiRankingWeek {
            season: Some(2025),
            week: Some(week),
            polls: vec![ApiPoll {
                poll: Some(poll.to_string()),
                ranks: schools
                    .iter()
                    .map(|(school, rank)| ApiRank {
                        rank: Some(*rank),
                        school: Some(school.to_string()),
                        conference: Some("Big Ten".to_string()),
                        points: None,
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn test_flatten_canonicalizes_names() {
        let aliases = AliasTable::default();
        let raw = vec![ranking_week(3, "AP Top 25", &[("San José State", 24)])];
        let entries = flatten_rankings(&raw, &aliases);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].school, "San Jose St");
        assert_eq!(entries[0].conference.as_deref(), Some("Big 10"));
    }

    #[test]
    fn test_pivot_keeps_only_latest_week() {
        let aliases = AliasTable::default();
        let raw = vec![
            ranking_week(3, "AP Top 25", &[("Ohio State", 2)]),
            ranking_week(5, "AP Top 25", &[("Ohio State", 1), ("Oregon", 4)]),
        ];
        let pivot = RankingsPivot::latest_week(&flatten_rankings(&raw, &aliases));
        assert_eq!(pivot.week(), Some(5));
        assert_eq!(pivot.ranks_for("Ohio State").unwrap()["AP Top 25"], 1);
        assert_eq!(pivot.ranks_for("Oregon").unwrap()["AP Top 25"], 4);
        assert_eq!(pivot.polls(), vec!["AP Top 25".to_string()]);
    }

    #[test]
    fn test_empty_rankings_pivot() {
        let pivot = RankingsPivot::latest_week(&[]);
        assert_eq!(pivot.week(), None);
        assert!(pivot.ranks_for("Ohio State").is_none());
        assert!(pivot.polls().is_empty());
    }

    #[test]
    fn test_conference_map_and_fbs_set() {
        let aliases = AliasTable::default();
        let teams = vec![
            ApiTeam {
                school: "San José State".to_string(),
                conference: Some("Mountain West".to_string()),
            },
            ApiTeam {
                school: "Ohio State".to_string(),
                conference: None,
            },
        ];
        let confs = conference_map(&teams, &aliases);
        assert_eq!(confs["San Jose St"], "MWC");
        assert_eq!(confs["Ohio State"], NON_FBS);

        let fbs = fbs_set(&teams, &aliases);
        assert!(fbs.contains("San Jose St"));
        assert!(fbs.contains("Ohio State"));
        assert!(!fbs.contains("North Dakota State"));
    }

    #[test]
    fn test_decorate_fills_non_fbs() {
        let rows = vec![AggregateRow {
            team: "Somewhere A&M".to_string(),
            week: None,
            penalty_type: "Holding".to_string(),
            penalty_category: "Blocking / Holding".to_string(),
            total_penalties: 1,
            total_yards: 10,
            avg_yards_per_penalty: 10.0,
        }];
        let decorated = decorate_rows(rows, &HashMap::new(), &RankingsPivot::default());
        assert_eq!(decorated[0].conference, NON_FBS);
        assert!(decorated[0].ranks.is_empty());
    }
}
