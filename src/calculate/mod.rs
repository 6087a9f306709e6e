//! Derived metrics calculation.
//!
//! Adds rate and ratio columns to a season table:
//! - Points, assists and rebounds per minute
//! - Three-point percentage
//! - Assists per turnover and points per field-goal attempt
//!
//! Denominators equal to zero are replaced, row by row, with a small positive
//! epsilon before dividing. Every ratio is therefore finite; a zero-minute
//! player gets a large value rather than an error.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{sorted_unique, Metric, PlayerSeasonRecord, RecordTable};

/// Zero-denominator replacement used by the reference dashboard.
pub const DEFAULT_EPSILON: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
pub enum CalculateError {
    #[error("Epsilon must be a finite positive number, got {0}")]
    InvalidEpsilon(f64),
}

/// Replace an exact zero with `epsilon`.
pub fn guard_denominator(value: f64, epsilon: f64) -> f64 {
    if value == 0.0 {
        epsilon
    } else {
        value
    }
}

/// Denominators after the zero guard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuardedDenominators {
    pub min: f64,
    pub fg3a: f64,
    pub fga: f64,
    pub tov: f64,
}

/// Ratio columns computed for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    #[serde(rename = "PTS_per_MIN")]
    pub pts_per_min: f64,

    #[serde(rename = "AST_per_MIN")]
    pub ast_per_min: f64,

    #[serde(rename = "REB_per_MIN")]
    pub reb_per_min: f64,

    /// Made threes as a percentage of attempts (0-100)
    #[serde(rename = "3P_percent")]
    pub three_point_pct: f64,

    #[serde(rename = "AST_per_TOV")]
    pub ast_per_tov: f64,

    #[serde(rename = "PTS_per_FGA")]
    pub pts_per_fga: f64,
}

/// A season record with its derived columns. Raw values are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentedRecord {
    #[serde(flatten)]
    pub record: PlayerSeasonRecord,

    #[serde(flatten)]
    pub derived: DerivedMetrics,

    #[serde(skip)]
    pub denominators: GuardedDenominators,
}

impl AugmentedRecord {
    /// Value of any metric, raw or derived.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::PtsPerMin => self.derived.pts_per_min,
            Metric::AstPerMin => self.derived.ast_per_min,
            Metric::RebPerMin => self.derived.reb_per_min,
            Metric::ThreePointPct => self.derived.three_point_pct,
            Metric::AstPerTov => self.derived.ast_per_tov,
            Metric::PtsPerFga => self.derived.pts_per_fga,
            raw => raw.raw_value(&self.record).unwrap_or_default(),
        }
    }

    pub fn player_name(&self) -> &str {
        &self.record.player_name
    }

    pub fn team_abbreviation(&self) -> &str {
        &self.record.team_abbreviation
    }
}

/// Season table with derived columns, same row count and order as its source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AugmentedTable {
    records: Vec<AugmentedRecord>,
    epsilon: f64,
}

impl AugmentedTable {
    pub fn records(&self) -> &[AugmentedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AugmentedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Epsilon the table was computed with.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// First row for a player name.
    pub fn find_player(&self, player_name: &str) -> Option<&AugmentedRecord> {
        self.records.iter().find(|r| r.player_name() == player_name)
    }

    pub fn teams(&self) -> Vec<String> {
        sorted_unique(self.records.iter().map(|r| r.team_abbreviation()))
    }

    pub fn player_names(&self) -> Vec<String> {
        sorted_unique(self.records.iter().map(|r| r.player_name()))
    }
}

/// Computes derived metrics with a configurable zero-guard epsilon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricCalculator {
    epsilon: f64,
}

impl Default for MetricCalculator {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl MetricCalculator {
    /// Create a calculator. Epsilon must be finite and positive.
    pub fn new(epsilon: f64) -> Result<Self, CalculateError> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(CalculateError::InvalidEpsilon(epsilon));
        }
        if epsilon != DEFAULT_EPSILON {
            warn!(
                "Zero-guard epsilon is {} (reference {}); rates for zero-denominator rows will differ",
                epsilon, DEFAULT_EPSILON
            );
        }
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Guard the denominators of one record.
    pub fn denominators(&self, record: &PlayerSeasonRecord) -> GuardedDenominators {
        GuardedDenominators {
            min: guard_denominator(record.min, self.epsilon),
            fg3a: guard_denominator(record.fg3a, self.epsilon),
            fga: guard_denominator(record.fga, self.epsilon),
            tov: guard_denominator(record.tov, self.epsilon),
        }
    }

    /// Compute the derived columns for one record.
    pub fn derive(&self, record: &PlayerSeasonRecord) -> AugmentedRecord {
        let d = self.denominators(record);
        let derived = DerivedMetrics {
            pts_per_min: record.pts / d.min,
            ast_per_min: record.ast / d.min,
            reb_per_min: record.reb / d.min,
            three_point_pct: record.fg3m / d.fg3a * 100.0,
            ast_per_tov: record.ast / d.tov,
            pts_per_fga: record.pts / d.fga,
        };

        AugmentedRecord {
            record: record.clone(),
            derived,
            denominators: d,
        }
    }

    /// Augment every row of a table, preserving count and order.
    pub fn augment(&self, table: &RecordTable) -> AugmentedTable {
        let records: Vec<AugmentedRecord> = table.iter().map(|r| self.derive(r)).collect();
        debug!(
            "Derived metrics for {} rows (epsilon {})",
            records.len(),
            self.epsilon
        );
        AugmentedTable {
            records,
            epsilon: self.epsilon,
        }
    }
}
