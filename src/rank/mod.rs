//! Season leaderboard: team filter, descending sort, top-N cut.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::calculate::AugmentedTable;
use crate::models::{Bar, BarChart, Metric, Orientation};
use crate::round_to;

/// Sentinel accepted for "no team filter".
pub const ALL_TEAMS: &str = "all";

/// Bounds and default for the top-N selector.
pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 30;
pub const TOP_N_DEFAULT: usize = 10;

/// Decimal places shown for ranked values.
pub const DISPLAY_PLACES: u32 = 2;

#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("Top N must be between {min} and {max}, got {value}")]
    TopNOutOfRange {
        value: usize,
        min: usize,
        max: usize,
    },
}

/// Optional team restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TeamFilter {
    #[default]
    All,
    Team(String),
}

impl TeamFilter {
    /// Parse a selector value. Empty or the "all" sentinel disables filtering.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => TeamFilter::All,
            Some(v) if v.eq_ignore_ascii_case(ALL_TEAMS) => TeamFilter::All,
            Some(v) => TeamFilter::Team(v.to_string()),
        }
    }

    /// Exact match on the team abbreviation.
    pub fn matches(&self, team_abbreviation: &str) -> bool {
        match self {
            TeamFilter::All => true,
            TeamFilter::Team(team) => team == team_abbreviation,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TeamFilter::All => ALL_TEAMS,
            TeamFilter::Team(team) => team.as_str(),
        }
    }
}

impl fmt::Display for TeamFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TeamFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Top-N selector value, bounded to [`TOP_N_MIN`, `TOP_N_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopN(usize);

impl TopN {
    pub fn new(value: usize) -> Result<Self, RankError> {
        if !(TOP_N_MIN..=TOP_N_MAX).contains(&value) {
            return Err(RankError::TopNOutOfRange {
                value,
                min: TOP_N_MIN,
                max: TOP_N_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Clamp a requested value into range, defaulting when absent.
    pub fn clamped(value: Option<usize>) -> Self {
        Self(value.unwrap_or(TOP_N_DEFAULT).clamp(TOP_N_MIN, TOP_N_MAX))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self(TOP_N_DEFAULT)
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based position
    pub rank: usize,
    pub player_name: String,
    pub team_abbreviation: String,
    /// Unrounded metric value
    pub value: f64,
    /// Value rounded for display
    pub display_value: f64,
}

/// Filtered, sorted, truncated leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedView {
    pub team: TeamFilter,
    pub metric: Metric,
    pub top_n: usize,
    /// Rows that passed the team filter, before truncation
    pub matching_rows: usize,
    pub entries: Vec<RankedEntry>,
}

impl RankedView {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn title(&self) -> String {
        format!("Top {} players by {}", self.top_n, self.metric)
    }

    /// User-facing notice when nothing matched.
    pub fn notice(&self) -> Option<String> {
        if !self.is_empty() {
            return None;
        }
        Some(match &self.team {
            TeamFilter::All => "No players in the loaded season table".to_string(),
            TeamFilter::Team(team) => format!("No players found for team {}", team),
        })
    }

    /// Horizontal bar chart: metric on x, player on y, coloured by metric.
    pub fn bar_chart(&self) -> BarChart {
        BarChart {
            title: self.title(),
            x: self.metric.column().to_string(),
            y: "PLAYER_NAME".to_string(),
            color_by: self.metric.column().to_string(),
            orientation: Orientation::Horizontal,
            bars: self
                .entries
                .iter()
                .map(|e| Bar {
                    label: e.player_name.clone(),
                    value: Some(e.display_value),
                    group: None,
                })
                .collect(),
        }
    }
}

/// Build a leaderboard.
///
/// Rows are filtered by team, sorted by `metric` descending and cut to the
/// first `top_n`. The sort is stable: ties keep their table order. `top_n` is
/// not clamped here; callers bound it with [`TopN`].
pub fn rank(table: &AugmentedTable, team: &TeamFilter, metric: Metric, top_n: usize) -> RankedView {
    let mut rows: Vec<_> = table
        .iter()
        .filter(|r| team.matches(r.team_abbreviation()))
        .map(|r| (r, r.value(metric)))
        .collect();
    let matching_rows = rows.len();

    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let entries = rows
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (r, value))| RankedEntry {
            rank: i + 1,
            player_name: r.player_name().to_string(),
            team_abbreviation: r.team_abbreviation().to_string(),
            value,
            display_value: round_to(value, DISPLAY_PLACES),
        })
        .collect();

    RankedView {
        team: team.clone(),
        metric,
        top_n,
        matching_rows,
        entries,
    }
}
