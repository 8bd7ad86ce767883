//! College Football Penalty Pipeline
//!
//! Batch entry point: fetch the season's plays, reference teams, and poll
//! rankings from the CollegeFootballData API, run the penalty extraction
//! pipeline, and export weekly/season committed and drawn summaries as CSV.
//!
//! ## Flow
//!
//! 1. Load `.env`, initialize logging with a run id
//! 2. Fetch FBS teams (canonical team set + conference map) and rankings
//! 3. Fetch plays week by week (cached on disk between runs)
//! 4. Extract, classify, and attribute penalty events
//! 5. Aggregate committed/drawn, weekly/season; join rankings; write CSVs
//!
//! Outputs land only after the full in-memory aggregation succeeds, so an
//! interrupted run never leaves partial files behind.

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use cfb_penalty_pipeline::cache::ResponseCache;
use cfb_penalty_pipeline::cfbd::CfbdClient;
use cfb_penalty_pipeline::pipeline::{
    aggregate, is_fbs_relevant, team_totals, Granularity, PenaltyPipeline, PlayRecord, View,
};
use cfb_penalty_pipeline::rankings::{
    conference_map, decorate_rows, decorate_totals, fbs_set, flatten_rankings, RankingsPivot,
};
use cfb_penalty_pipeline::{config, export, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before any config getter caches its value.
    dotenvy::dotenv().ok();

    let _log_guard = logging::init_logging();
    let run_id = logging::run_id_from_env();

    let year = config::season_year();
    let max_week = config::max_week();
    let root_span = info_span!("penalty_pipeline", run_id = %run_id, year, max_week);
    let _root = root_span.enter();

    info!(year, max_week, "starting season collection");

    let api_key = config::api_key()?;
    let cache = ResponseCache::open(config::cache_dir())?;
    let client = CfbdClient::new(&api_key, cache)?;

    // Reference data first: the FBS team list is the retention filter and
    // the conference authority for every downstream join.
    let teams = client
        .fetch_fbs_teams()
        .await
        .context("fetching FBS team list")?;
    let pipeline = PenaltyPipeline::default();
    let fbs = fbs_set(&teams, pipeline.aliases());
    let conferences = conference_map(&teams, pipeline.aliases());
    info!(teams = fbs.len(), "loaded FBS team set");

    // Rankings are decoration; a season without polls yet still aggregates.
    let pivot = match client.fetch_rankings(year).await {
        Ok(raw) => RankingsPivot::latest_week(&flatten_rankings(&raw, pipeline.aliases())),
        Err(e) => {
            warn!(error = %e, "rankings unavailable, continuing without them");
            RankingsPivot::default()
        }
    };

    // Collect plays for every configured week. A week that fails after
    // retries is logged and skipped rather than aborting the season.
    let mut plays: Vec<PlayRecord> = Vec::new();
    for week in 1..=max_week {
        match client.fetch_plays(year, week).await {
            Ok(api_plays) => {
                plays.extend(api_plays.iter().map(|p| p.to_record(year, week)));
            }
            Err(e) => warn!(week, error = %e, "skipping week after fetch failure"),
        }
    }
    info!(plays = plays.len(), "collected play records");

    let (events, stats) = pipeline.process(&plays);
    info!(
        events = stats.events,
        guessed = stats.guessed_attributions,
        excluded_by_cutoff = stats.excluded_by_cutoff,
        missing_text = stats.missing_text,
        "extraction complete"
    );

    // Keep the audit export FBS-focused the same way the summaries are: a
    // play stays if either side is an FBS team.
    let audit_events: Vec<_> = events
        .iter()
        .filter(|e| is_fbs_relevant(e, &fbs))
        .cloned()
        .collect();

    let committed_weekly = aggregate(&events, View::Committed, Granularity::Weekly, &fbs);
    let committed_season = aggregate(&events, View::Committed, Granularity::Season, &fbs);
    let drawn_weekly = aggregate(&events, View::Drawn, Granularity::Weekly, &fbs);
    let drawn_season = aggregate(&events, View::Drawn, Granularity::Season, &fbs);
    let totals = team_totals(&events, &fbs);
    info!(
        committed_weekly = committed_weekly.len(),
        committed_season = committed_season.len(),
        drawn_weekly = drawn_weekly.len(),
        drawn_season = drawn_season.len(),
        "aggregation complete"
    );

    let polls = pivot.polls();
    let committed_ctx = decorate_rows(committed_season.clone(), &conferences, &pivot);
    let drawn_ctx = decorate_rows(drawn_season.clone(), &conferences, &pivot);
    let totals_ctx = decorate_totals(totals, &conferences);

    let out_dir = std::path::PathBuf::from(config::output_dir());
    let prefix = config::output_prefix(year);
    let out = |suffix: &str| out_dir.join(format!("{}_{}.csv", prefix, suffix));

    export::write_raw_events(out("raw_with_meta"), &audit_events)?;
    export::write_weekly(out("committed_weekly"), &committed_weekly)?;
    export::write_season(out("committed_season"), &committed_season)?;
    export::write_weekly(out("drawn_weekly"), &drawn_weekly)?;
    export::write_season(out("drawn_season"), &drawn_season)?;
    export::write_season_with_rankings(
        out("committed_season_with_rankings"),
        &committed_ctx,
        &polls,
    )?;
    export::write_season_with_rankings(out("drawn_season_with_rankings"), &drawn_ctx, &polls)?;
    export::write_team_totals(out("team_totals"), &totals_ctx)?;

    info!(output_dir = %out_dir.display(), "season collection finished");
    Ok(())
}
