//! CollegeFootballData API client.
//!
//! Thin async client for the three endpoints the pipeline consumes:
//! `/plays`, `/teams/fbs`, and `/rankings`. All requests carry bearer auth,
//! go through the disk response cache, are wrapped in the retry policy, and
//! are spaced out by a configurable delay to respect the free-tier rate
//! limit.
//!
//! The response models are deliberately tolerant: the provider has shipped
//! several spellings of the play-text and team fields over time, so every
//! field is optional and aliased rather than strict.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{cache_key, ResponseCache};
use crate::pipeline::PlayRecord;
use crate::retry::{retry_async, RetryPolicy};

/// One play from `/plays`. Only the fields the pipeline reads are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPlay {
    #[serde(
        default,
        alias = "playText",
        alias = "description",
        alias = "playDescription",
        alias = "summary"
    )]
    pub play_text: Option<String>,
    #[serde(default, alias = "offenseTeam", alias = "possessionTeam", alias = "posteam")]
    pub offense: Option<TeamField>,
    #[serde(default, alias = "defenseTeam", alias = "defTeam", alias = "defense_name")]
    pub defense: Option<TeamField>,
    #[serde(default, alias = "gameDate", alias = "startTime", alias = "game_time")]
    pub start: Option<String>,
    #[serde(default)]
    pub game: Option<GameRef>,
}

/// Nested game reference some play payloads carry instead of a flat start
/// field.
#[derive(Debug, Clone, Deserialize)]
pub struct GameRef {
    #[serde(default, alias = "gameDate", alias = "startTime")]
    pub start: Option<String>,
}

/// A team field that arrives either as a plain string or as an object with
/// one of several name keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TeamField {
    Name(String),
    Detailed(TeamObject),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamObject {
    #[serde(default, alias = "displayName", alias = "teamName")]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

impl TeamField {
    /// The usable team name, if any: a non-empty string, or the first
    /// non-empty of name/abbreviation on the object form.
    pub fn as_name(&self) -> Option<&str> {
        let candidate = match self {
            TeamField::Name(s) => Some(s.as_str()),
            TeamField::Detailed(obj) => obj
                .name
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .or(obj.abbreviation.as_deref()),
        };
        candidate.map(str::trim).filter(|s| !s.is_empty())
    }
}

impl ApiPlay {
    /// Flatten into the pipeline's input shape. Missing team fields fall
    /// back to "Unknown"; a missing or unparseable timestamp becomes None
    /// (the cutoff filter fails open on it).
    pub fn to_record(&self, year: u16, week: u8) -> PlayRecord {
        let start_str = self
            .start
            .as_deref()
            .or_else(|| self.game.as_ref().and_then(|g| g.start.as_deref()));
        PlayRecord {
            year,
            week,
            text: self.play_text.clone().unwrap_or_default().trim().to_string(),
            offense_raw: team_or_unknown(self.offense.as_ref()),
            defense_raw: team_or_unknown(self.defense.as_ref()),
            game_start: start_str.and_then(parse_game_start),
        }
    }
}

fn team_or_unknown(field: Option<&TeamField>) -> String {
    field
        .and_then(TeamField::as_name)
        .unwrap_or("Unknown")
        .to_string()
}

/// Parse the timestamp spellings the provider uses: RFC 3339 (with or
/// without fractional seconds and a Z suffix), "YYYY-MM-DD HH:MM:SS", and
/// bare dates. Naive values are taken as UTC.
pub fn parse_game_start(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    None
}

/// One school from `/teams/fbs`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTeam {
    pub school: String,
    #[serde(default)]
    pub conference: Option<String>,
}

/// One week of `/rankings`: season, week, and the polls published that week.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRankingWeek {
    #[serde(default)]
    pub season: Option<u16>,
    #[serde(default)]
    pub week: Option<u8>,
    #[serde(default, alias = "rankings")]
    pub polls: Vec<ApiPoll>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPoll {
    #[serde(default, alias = "name")]
    pub poll: Option<String>,
    #[serde(default, alias = "rankings")]
    pub ranks: Vec<ApiRank>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRank {
    #[serde(default)]
    pub rank: Option<u16>,
    #[serde(default, alias = "team")]
    pub school: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub points: Option<f64>,
}

/// Async CFBD client with caching, retry, and request spacing.
pub struct CfbdClient {
    http: reqwest::Client,
    base: String,
    cache: ResponseCache,
    retry: RetryPolicy,
    delay: Duration,
}

impl CfbdClient {
    /// Build a client against the production API.
    pub fn new(api_key: &str, cache: ResponseCache) -> Result<Self> {
        Self::with_base(api_key, crate::config::CFBD_API_BASE, cache)
    }

    /// Build a client against an alternate base URL (tests, mirrors).
    pub fn with_base(api_key: &str, base: &str, cache: ResponseCache) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .context("API key contains characters invalid in a header")?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            cache,
            retry: RetryPolicy::from_env(),
            delay: Duration::from_millis(crate::config::api_delay_ms()),
        })
    }

    /// Plays for one week of a season.
    pub async fn fetch_plays(&self, year: u16, week: u8) -> Result<Vec<ApiPlay>> {
        let params = [
            ("year", year.to_string()),
            ("week", week.to_string()),
        ];
        let value = self
            .get_json("/plays", &params, &format!("fetch_plays_w{}", week))
            .await?;
        let plays: Vec<ApiPlay> =
            serde_json::from_value(value).context("decoding /plays response")?;
        info!(year, week, count = plays.len(), "fetched plays");
        Ok(plays)
    }

    /// The authoritative FBS team list with conference assignments.
    pub async fn fetch_fbs_teams(&self) -> Result<Vec<ApiTeam>> {
        let value = self.get_json("/teams/fbs", &[], "fetch_fbs_teams").await?;
        let teams: Vec<ApiTeam> =
            serde_json::from_value(value).context("decoding /teams/fbs response")?;
        info!(count = teams.len(), "fetched FBS teams");
        Ok(teams)
    }

    /// All poll rankings published for a season.
    pub async fn fetch_rankings(&self, year: u16) -> Result<Vec<ApiRankingWeek>> {
        let params = [("year", year.to_string())];
        let value = self.get_json("/rankings", &params, "fetch_rankings").await?;
        let weeks: Vec<ApiRankingWeek> =
            serde_json::from_value(value).context("decoding /rankings response")?;
        info!(year, weeks = weeks.len(), "fetched rankings");
        Ok(weeks)
    }

    /// Cache-through GET returning the raw JSON body. Network fetches are
    /// retried under the policy and followed by the configured delay.
    async fn get_json(&self, path: &str, params: &[(&str, String)], op_name: &str) -> Result<Value> {
        let key = cache_key(path, params);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let url = format!("{}{}", self.base, path);
        let value = retry_async(&self.retry, op_name, || {
            let request = self.http.get(url.as_str()).query(params);
            let url = url.clone();
            async move {
                let response = request
                    .send()
                    .await
                    .with_context(|| format!("GET {}", url))?;
                let response = response
                    .error_for_status()
                    .with_context(|| format!("GET {}", url))?;
                let body: Value = response
                    .json()
                    .await
                    .with_context(|| format!("non-JSON response from {}", url))?;
                Ok(body)
            }
        })
        .await?;

        self.cache.put(&key, &value);
        debug!(path, "fetched and cached");
        tokio::time::sleep(self.delay).await;
        Ok(value)
    }
}
