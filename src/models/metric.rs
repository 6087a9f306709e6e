//! Closed set of rankable and comparable metrics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PlayerSeasonRecord;

/// Unknown metric name.
#[derive(Debug, Error, PartialEq)]
#[error("Unknown metric: {0}")]
pub struct UnknownMetricError(pub String);

/// A column that can be ranked or compared: a raw attribute or a derived ratio.
///
/// Serializes as the upstream column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "PTS")]
    Pts,
    #[serde(rename = "AST")]
    Ast,
    #[serde(rename = "REB")]
    Reb,
    #[serde(rename = "STL")]
    Stl,
    #[serde(rename = "BLK")]
    Blk,
    #[serde(rename = "FG3M")]
    Fg3m,
    #[serde(rename = "MIN")]
    Min,
    #[serde(rename = "PLUS_MINUS")]
    PlusMinus,
    #[serde(rename = "FGA")]
    Fga,
    #[serde(rename = "FG3A")]
    Fg3a,
    #[serde(rename = "TOV")]
    Tov,
    #[serde(rename = "PTS_per_MIN")]
    PtsPerMin,
    #[serde(rename = "AST_per_MIN")]
    AstPerMin,
    #[serde(rename = "REB_per_MIN")]
    RebPerMin,
    #[serde(rename = "3P_percent")]
    ThreePointPct,
    #[serde(rename = "AST_per_TOV")]
    AstPerTov,
    #[serde(rename = "PTS_per_FGA")]
    PtsPerFga,
}

impl Metric {
    pub const ALL: [Metric; 17] = [
        Metric::Pts,
        Metric::Ast,
        Metric::Reb,
        Metric::Stl,
        Metric::Blk,
        Metric::Fg3m,
        Metric::Min,
        Metric::PlusMinus,
        Metric::Fga,
        Metric::Fg3a,
        Metric::Tov,
        Metric::PtsPerMin,
        Metric::AstPerMin,
        Metric::RebPerMin,
        Metric::ThreePointPct,
        Metric::AstPerTov,
        Metric::PtsPerFga,
    ];

    /// Metric selector options for the season leaderboard, in display order.
    pub const LEADERBOARD: [Metric; 14] = [
        Metric::Pts,
        Metric::Ast,
        Metric::Reb,
        Metric::Stl,
        Metric::Blk,
        Metric::Fg3m,
        Metric::Min,
        Metric::PlusMinus,
        Metric::PtsPerMin,
        Metric::AstPerMin,
        Metric::RebPerMin,
        Metric::ThreePointPct,
        Metric::AstPerTov,
        Metric::PtsPerFga,
    ];

    /// Metrics shown in the grouped head-to-head chart.
    pub const COMPARISON: [Metric; 10] = [
        Metric::Pts,
        Metric::Ast,
        Metric::Reb,
        Metric::Stl,
        Metric::Blk,
        Metric::Fg3m,
        Metric::Min,
        Metric::PtsPerMin,
        Metric::AstPerMin,
        Metric::RebPerMin,
    ];

    /// Axes of the radar chart.
    pub const RADAR: [Metric; 6] = [
        Metric::Pts,
        Metric::Ast,
        Metric::Reb,
        Metric::Stl,
        Metric::Blk,
        Metric::Fg3m,
    ];

    /// Column name, as used upstream and in the CSV file.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Pts => "PTS",
            Metric::Ast => "AST",
            Metric::Reb => "REB",
            Metric::Stl => "STL",
            Metric::Blk => "BLK",
            Metric::Fg3m => "FG3M",
            Metric::Min => "MIN",
            Metric::PlusMinus => "PLUS_MINUS",
            Metric::Fga => "FGA",
            Metric::Fg3a => "FG3A",
            Metric::Tov => "TOV",
            Metric::PtsPerMin => "PTS_per_MIN",
            Metric::AstPerMin => "AST_per_MIN",
            Metric::RebPerMin => "REB_per_MIN",
            Metric::ThreePointPct => "3P_percent",
            Metric::AstPerTov => "AST_per_TOV",
            Metric::PtsPerFga => "PTS_per_FGA",
        }
    }

    /// Whether the metric is computed rather than read from the table.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            Metric::PtsPerMin
                | Metric::AstPerMin
                | Metric::RebPerMin
                | Metric::ThreePointPct
                | Metric::AstPerTov
                | Metric::PtsPerFga
        )
    }

    /// Read a raw attribute. Derived metrics return `None`.
    pub fn raw_value(&self, record: &PlayerSeasonRecord) -> Option<f64> {
        let v = match self {
            Metric::Pts => record.pts,
            Metric::Ast => record.ast,
            Metric::Reb => record.reb,
            Metric::Stl => record.stl,
            Metric::Blk => record.blk,
            Metric::Fg3m => record.fg3m,
            Metric::Min => record.min,
            Metric::PlusMinus => record.plus_minus,
            Metric::Fga => record.fga,
            Metric::Fg3a => record.fg3a,
            Metric::Tov => record.tov,
            _ => return None,
        };
        Some(v)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = UnknownMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Metric::ALL
            .iter()
            .find(|m| m.column() == s)
            .or_else(|| Metric::ALL.iter().find(|m| m.column().eq_ignore_ascii_case(s)))
            .copied()
            .ok_or_else(|| UnknownMetricError(s.to_string()))
    }
}
