//! Stats API client.
//!
//! Requests season totals, daily scoreboards and single-game boxscores from
//! the public NBA stats API. Every endpoint answers with named result sets
//! (`headers` + `rowSet`) which are resolved into typed records by column name.
//!
//! Failures are returned as [`FetchError`]; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::models::{BoxscoreRow, ResultSet, ScheduledGame, SeasonTable, TableError};

pub const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats/";

/// The stats API rejects requests without a browser-like user agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const SEASON_STATS_ENDPOINT: &str = "leaguedashplayerstats";
const SCOREBOARD_ENDPOINT: &str = "scoreboardv2";
const BOXSCORE_ENDPOINT: &str = "boxscoretraditionalv2";

const SEASON_STATS_SET: &str = "LeagueDashPlayerStats";
const GAME_HEADER_SET: &str = "GameHeader";
const LINE_SCORE_SET: &str = "LineScore";
const PLAYER_STATS_SET: &str = "PlayerStats";

/// NBA league id.
const LEAGUE_ID: &str = "00";

/// Errors that can occur while talking to the stats API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Response has no result set named {0}")]
    MissingResultSet(String),

    #[error("Malformed response: {0}")]
    Table(#[from] TableError),
}

/// Configuration for the stats client.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Base URL, ending in a slash
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Body shared by every stats endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    #[serde(rename = "resultSets")]
    pub result_sets: Vec<ResultSet>,
}

impl StatsResponse {
    /// Result set by name.
    pub fn result_set(&self, name: &str) -> Result<&ResultSet, FetchError> {
        self.result_sets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| FetchError::MissingResultSet(name.to_string()))
    }
}

/// Source of season, scoreboard and boxscore data.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Per-player totals for a season, e.g. ("2023-24", "Regular Season"),
    /// with every upstream column kept.
    async fn season_stats(&self, season: &str, season_type: &str)
        -> Result<SeasonTable, FetchError>;

    /// Games scheduled on a date.
    async fn scoreboard(&self, date: NaiveDate) -> Result<Vec<ScheduledGame>, FetchError>;

    /// Player lines for one game.
    async fn boxscore(&self, game_id: &str) -> Result<Vec<BoxscoreRow>, FetchError>;
}

/// HTTP client for the stats API.
pub struct StatsClient {
    client: Client,
    base_url: Url,
}

impl StatsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("nba-dashboard/0.1.0")),
        );
        // The stats API rejects requests that do not look like they come from nba.com
        headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
        headers.insert(
            HeaderName::from_static("x-nba-stats-origin"),
            HeaderValue::from_static("stats"),
        );
        headers.insert(
            HeaderName::from_static("x-nba-stats-token"),
            HeaderValue::from_static("true"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let base_url = Url::parse(&config.base_url)?;

        Ok(Self { client, base_url })
    }

    /// Full URL for an endpoint with query parameters.
    pub fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = self.base_url.join(endpoint)?;
        url.query_pairs_mut().extend_pairs(params.iter());
        Ok(url)
    }

    /// GET an endpoint and decode its result sets.
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<StatsResponse, FetchError> {
        let url = self.endpoint_url(endpoint, params)?;
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json::<StatsResponse>().await?)
    }
}

/// Query for league-wide per-player totals.
fn season_stats_params<'a>(season: &'a str, season_type: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("College", ""),
        ("Conference", ""),
        ("Country", ""),
        ("DateFrom", ""),
        ("DateTo", ""),
        ("Division", ""),
        ("DraftPick", ""),
        ("DraftYear", ""),
        ("GameScope", ""),
        ("GameSegment", ""),
        ("Height", ""),
        ("LastNGames", "0"),
        ("LeagueID", LEAGUE_ID),
        ("Location", ""),
        ("MeasureType", "Base"),
        ("Month", "0"),
        ("OpponentTeamID", "0"),
        ("Outcome", ""),
        ("PORound", "0"),
        ("PaceAdjust", "N"),
        ("PerMode", "Totals"),
        ("Period", "0"),
        ("PlayerExperience", ""),
        ("PlayerPosition", ""),
        ("PlusMinus", "N"),
        ("Rank", "N"),
        ("Season", season),
        ("SeasonSegment", ""),
        ("SeasonType", season_type),
        ("ShotClockRange", ""),
        ("StarterBench", ""),
        ("TeamID", "0"),
        ("TwoWay", "0"),
        ("VsConference", ""),
        ("VsDivision", ""),
        ("Weight", ""),
    ]
}

/// Decode the season totals response.
pub fn parse_season_stats(response: &StatsResponse) -> Result<SeasonTable, FetchError> {
    let set = response.result_set(SEASON_STATS_SET)?;
    Ok(SeasonTable::from_result_set(set.clone())?)
}

/// Decode the scoreboard response.
pub fn parse_scoreboard(response: &StatsResponse) -> Result<Vec<ScheduledGame>, FetchError> {
    let header = response.result_set(GAME_HEADER_SET)?;
    let line_score = response.result_set(LINE_SCORE_SET).ok();
    Ok(ScheduledGame::from_scoreboard(header, line_score)?)
}

/// Decode the boxscore response.
pub fn parse_boxscore(response: &StatsResponse) -> Result<Vec<BoxscoreRow>, FetchError> {
    let set = response.result_set(PLAYER_STATS_SET)?;
    Ok(BoxscoreRow::from_result_set(set)?)
}

#[async_trait]
impl StatsSource for StatsClient {
    async fn season_stats(
        &self,
        season: &str,
        season_type: &str,
    ) -> Result<SeasonTable, FetchError> {
        let response = self
            .get(SEASON_STATS_ENDPOINT, &season_stats_params(season, season_type))
            .await?;
        let table = parse_season_stats(&response)?;
        info!("Fetched {} player rows for {} {}", table.len(), season, season_type);
        Ok(table)
    }

    async fn scoreboard(&self, date: NaiveDate) -> Result<Vec<ScheduledGame>, FetchError> {
        let date = date.format("%Y-%m-%d").to_string();
        let params = [("GameDate", date.as_str()), ("LeagueID", LEAGUE_ID), ("DayOffset", "0")];
        let response = self.get(SCOREBOARD_ENDPOINT, &params).await?;
        let games = parse_scoreboard(&response)?;
        info!("Found {} games on {}", games.len(), date);
        Ok(games)
    }

    async fn boxscore(&self, game_id: &str) -> Result<Vec<BoxscoreRow>, FetchError> {
        let params = [
            ("GameID", game_id),
            ("StartPeriod", "0"),
            ("EndPeriod", "0"),
            ("StartRange", "0"),
            ("EndRange", "0"),
            ("RangeType", "0"),
        ];
        let response = self.get(BOXSCORE_ENDPOINT, &params).await?;
        parse_boxscore(&response)
    }
}

/// In-memory source for testing.
#[cfg(test)]
pub struct MockSource {
    pub available: bool,
    pub scoreboard_available: bool,
    pub season: SeasonTable,
    pub games: Vec<ScheduledGame>,
    pub boxscore: Vec<BoxscoreRow>,
}

#[cfg(test)]
impl MockSource {
    pub fn new(
        season: impl Into<SeasonTable>,
        games: Vec<ScheduledGame>,
        boxscore: Vec<BoxscoreRow>,
    ) -> Self {
        Self {
            available: true,
            scoreboard_available: true,
            season: season.into(),
            games,
            boxscore,
        }
    }

    /// A source whose every call fails.
    pub fn failing() -> Self {
        Self {
            available: false,
            ..Self::new(SeasonTable::default(), Vec::new(), Vec::new())
        }
    }

    /// The same source with only the scoreboard endpoint failing.
    pub fn without_scoreboard(self) -> Self {
        Self {
            scoreboard_available: false,
            ..self
        }
    }

    fn check(&self) -> Result<(), FetchError> {
        if self.available {
            Ok(())
        } else {
            Err(FetchError::HttpStatus {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        }
    }
}

#[cfg(test)]
#[async_trait]
impl StatsSource for MockSource {
    async fn season_stats(&self, _season: &str, _season_type: &str) -> Result<SeasonTable, FetchError> {
        self.check()?;
        Ok(self.season.clone())
    }

    async fn scoreboard(&self, date: NaiveDate) -> Result<Vec<ScheduledGame>, FetchError> {
        self.check()?;
        if !self.scoreboard_available {
            return Err(FetchError::HttpStatus {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(self
            .games
            .iter()
            .filter(|g| g.game_date.map_or(true, |d| d == date))
            .cloned()
            .collect())
    }

    async fn boxscore(&self, game_id: &str) -> Result<Vec<BoxscoreRow>, FetchError> {
        self.check()?;
        if !self.games.iter().any(|g| g.game_id == game_id) {
            return Err(FetchError::HttpStatus {
                status: 404,
                message: "Not Found".to_string(),
            });
        }
        Ok(self.boxscore.clone())
    }
}
