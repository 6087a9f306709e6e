//! Head-to-head player comparison.
//!
//! Looks up two players and reshapes their metrics into long-form
//! (metric, player, value) points for grouped bar and radar charts.

use serde::Serialize;
use thiserror::Error;

use crate::calculate::AugmentedTable;
use crate::models::{GroupedBarChart, Metric, RadarChart, RadarTrace, Series};

#[derive(Debug, Error, PartialEq)]
pub enum CompareError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Invalid selection: cannot compare {0} with themselves")]
    InvalidSelection(String),
}

/// One (metric, player, value) triple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub metric: Metric,
    pub player: String,
    pub value: f64,
}

/// Two players' metrics in long form.
///
/// Points are grouped by player (first player, then second), each group in
/// the order of `metrics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPair {
    pub players: [String; 2],
    pub metrics: Vec<Metric>,
    pub points: Vec<ComparisonPoint>,
}

impl ComparisonPair {
    /// One player's values in metric order.
    pub fn values_for(&self, player: &str) -> Vec<f64> {
        self.points
            .iter()
            .filter(|p| p.player == player)
            .map(|p| p.value)
            .collect()
    }

    fn value(&self, player: &str, metric: Metric) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.player == player && p.metric == metric)
            .map(|p| p.value)
    }

    pub fn grouped_bar(&self) -> GroupedBarChart {
        GroupedBarChart {
            title: format!("Head-to-head: {} vs {}", self.players[0], self.players[1]),
            categories: self.metrics.iter().map(|m| m.column().to_string()).collect(),
            series: self
                .players
                .iter()
                .map(|p| Series {
                    name: p.clone(),
                    values: self.values_for(p),
                })
                .collect(),
        }
    }

    /// Radar chart over `axes`. Axes not part of the comparison are skipped.
    pub fn radar(&self, axes: &[Metric]) -> RadarChart {
        let axes: Vec<Metric> = axes
            .iter()
            .copied()
            .filter(|m| self.metrics.contains(m))
            .collect();

        RadarChart {
            title: format!("Radar: {} vs {}", self.players[0], self.players[1]),
            axes: axes.iter().map(|m| m.column().to_string()).collect(),
            traces: self
                .players
                .iter()
                .map(|p| RadarTrace {
                    name: p.clone(),
                    values: axes
                        .iter()
                        .filter_map(|m| self.value(p, *m))
                        .collect(),
                    filled: true,
                })
                .collect(),
        }
    }
}

/// Compare two players on `metrics`.
///
/// Comparing a player with themselves is rejected before lookup. Duplicate
/// names resolve to the first row.
pub fn compare(
    table: &AugmentedTable,
    first: &str,
    second: &str,
    metrics: &[Metric],
) -> Result<ComparisonPair, CompareError> {
    if first == second {
        return Err(CompareError::InvalidSelection(first.to_string()));
    }

    let a = table
        .find_player(first)
        .ok_or_else(|| CompareError::PlayerNotFound(first.to_string()))?;
    let b = table
        .find_player(second)
        .ok_or_else(|| CompareError::PlayerNotFound(second.to_string()))?;

    let points = [a, b]
        .iter()
        .flat_map(|r| {
            metrics.iter().map(move |m| ComparisonPoint {
                metric: *m,
                player: r.player_name().to_string(),
                value: r.value(*m),
            })
        })
        .collect();

    Ok(ComparisonPair {
        players: [first.to_string(), second.to_string()],
        metrics: metrics.to_vec(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::MetricCalculator;
    use crate::models::{PlayerSeasonRecord, RecordTable};
    use pretty_assertions::assert_eq;

    fn player(name: &str, pts: f64, ast: f64) -> PlayerSeasonRecord {
        let mut r = PlayerSeasonRecord::new(name, "BOS");
        r.pts = pts;
        r.ast = ast;
        r.min = 10.0;
        r
    }

    fn table() -> AugmentedTable {
        MetricCalculator::default().augment(&RecordTable::new(vec![
            player("Alpha", 100.0, 20.0),
            player("Beta", 80.0, 40.0),
        ]))
    }

    #[test]
    fn test_compare_long_form_grouped_by_player() {
        let pair = compare(&table(), "Alpha", "Beta", &[Metric::Pts, Metric::Ast]).unwrap();

        let triples: Vec<(Metric, &str, f64)> = pair
            .points
            .iter()
            .map(|p| (p.metric, p.player.as_str(), p.value))
            .collect();
        assert_eq!(
            triples,
            vec![
                (Metric::Pts, "Alpha", 100.0),
                (Metric::Ast, "Alpha", 20.0),
                (Metric::Pts, "Beta", 80.0),
                (Metric::Ast, "Beta", 40.0),
            ]
        );
    }

    #[test]
    fn test_compare_with_self_rejected() {
        let err = compare(&table(), "Alpha", "Alpha", &Metric::COMPARISON).unwrap_err();
        assert_eq!(err, CompareError::InvalidSelection("Alpha".to_string()));

        // Rejected even when the player is absent
        let err = compare(&table(), "Ghost", "Ghost", &Metric::COMPARISON).unwrap_err();
        assert_eq!(err, CompareError::InvalidSelection("Ghost".to_string()));
    }

    #[test]
    fn test_compare_missing_player() {
        assert_eq!(
            compare(&table(), "Ghost", "Beta", &Metric::COMPARISON).unwrap_err(),
            CompareError::PlayerNotFound("Ghost".to_string())
        );
        assert_eq!(
            compare(&table(), "Alpha", "Ghost", &Metric::COMPARISON).unwrap_err(),
            CompareError::PlayerNotFound("Ghost".to_string())
        );
    }

    #[test]
    fn test_compare_duplicate_uses_first_row() {
        let mut dup = player("Alpha", 1.0, 1.0);
        dup.team_abbreviation = "NYK".to_string();
        let t = MetricCalculator::default().augment(&RecordTable::new(vec![
            player("Alpha", 100.0, 20.0),
            dup,
            player("Beta", 80.0, 40.0),
        ]));

        let pair = compare(&t, "Alpha", "Beta", &[Metric::Pts]).unwrap();
        assert_eq!(pair.values_for("Alpha"), vec![100.0]);
    }

    #[test]
    fn test_compare_includes_derived_metrics() {
        let pair = compare(&table(), "Alpha", "Beta", &Metric::COMPARISON).unwrap();
        assert_eq!(pair.points.len(), 20);
        let alpha = pair.values_for("Alpha");
        // PTS_per_MIN sits at index 7
        assert!((alpha[7] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_grouped_bar_chart() {
        let chart = compare(&table(), "Alpha", "Beta", &[Metric::Pts, Metric::Ast])
            .unwrap()
            .grouped_bar();

        assert_eq!(chart.title, "Head-to-head: Alpha vs Beta");
        assert_eq!(chart.categories, vec!["PTS", "AST"]);
        assert_eq!(chart.series[0].values, vec![100.0, 20.0]);
        assert_eq!(chart.series[1].name, "Beta");
    }

    #[test]
    fn test_radar_uses_requested_axes() {
        let pair = compare(&table(), "Alpha", "Beta", &Metric::COMPARISON).unwrap();
        let radar = pair.radar(&Metric::RADAR);

        assert_eq!(radar.axes, vec!["PTS", "AST", "REB", "STL", "BLK", "FG3M"]);
        assert_eq!(radar.traces.len(), 2);
        assert_eq!(radar.traces[1].values, vec![80.0, 40.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(radar.traces.iter().all(|t| t.filled));
    }

    #[test]
    fn test_radar_skips_axes_outside_comparison() {
        let pair = compare(&table(), "Alpha", "Beta", &[Metric::Pts]).unwrap();
        let radar = pair.radar(&Metric::RADAR);
        assert_eq!(radar.axes, vec!["PTS"]);
        assert_eq!(radar.traces[0].values, vec![100.0]);
    }
}
