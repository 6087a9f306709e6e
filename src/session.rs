//! Session context.
//!
//! A [`Session`] owns the season table loaded at startup and the derived
//! metrics computed from it. Every view (leaderboard, comparison, filters)
//! is recomputed from this table on request; nothing else is cached.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::calculate::{AugmentedTable, MetricCalculator};
use crate::compare::{compare, ComparisonPair, CompareError};
use crate::models::{Metric, RecordTable, SeasonTable};
use crate::rank::{rank, RankedView, TeamFilter, TopN, ALL_TEAMS, TOP_N_MAX, TOP_N_MIN};
use crate::storage::{self, StorageConfig, StorageError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Top-N selector bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopNRange {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

/// Options for the season view selectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonFilters {
    pub season: String,
    /// "all" followed by the sorted team abbreviations
    pub teams: Vec<String>,
    pub metrics: Vec<Metric>,
    /// The subset of `metrics` computed from other columns
    pub derived_metrics: Vec<Metric>,
    pub top_n: TopNRange,
    /// Sorted unique player names
    pub players: Vec<String>,
    pub loaded_at: DateTime<Utc>,
}

/// Season table loaded for the lifetime of one dashboard process.
#[derive(Debug, Clone)]
pub struct Session {
    season: String,
    raw: SeasonTable,
    table: AugmentedTable,
    loaded_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        season: impl Into<String>,
        raw: impl Into<SeasonTable>,
        calculator: &MetricCalculator,
    ) -> Self {
        let raw = raw.into();
        let table = calculator.augment(raw.records());
        Self {
            season: season.into(),
            raw,
            table,
            loaded_at: Utc::now(),
        }
    }

    /// Load the persisted table for `season`.
    pub fn load(
        storage: &StorageConfig,
        season: &str,
        calculator: &MetricCalculator,
    ) -> Result<Self, SessionError> {
        let path = storage.season_csv_path(season);
        let session = Self::new(season, storage::read_table(&path)?, calculator);

        info!(
            "Loaded season {} ({} players, {} teams, {} columns) from {:?}, epsilon {}",
            season,
            session.table.len(),
            session.table.teams().len(),
            session.raw.source().headers.len(),
            path,
            session.table.epsilon()
        );
        Ok(session)
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn raw(&self) -> &RecordTable {
        self.raw.records()
    }

    /// The loaded table with every upstream column.
    pub fn source(&self) -> &SeasonTable {
        &self.raw
    }

    pub fn table(&self) -> &AugmentedTable {
        &self.table
    }

    pub fn filters(&self, default_top_n: TopN) -> SeasonFilters {
        let mut teams = vec![ALL_TEAMS.to_string()];
        teams.extend(self.table.teams());

        SeasonFilters {
            season: self.season.clone(),
            teams,
            metrics: Metric::LEADERBOARD.to_vec(),
            derived_metrics: Metric::LEADERBOARD
                .into_iter()
                .filter(Metric::is_derived)
                .collect(),
            top_n: TopNRange {
                min: TOP_N_MIN,
                max: TOP_N_MAX,
                default: default_top_n.get(),
            },
            players: self.table.player_names(),
            loaded_at: self.loaded_at,
        }
    }

    pub fn leaderboard(&self, team: &TeamFilter, metric: Metric, top_n: TopN) -> RankedView {
        rank(&self.table, team, metric, top_n.get())
    }

    /// Compare two players on the comparison metric set.
    pub fn compare(&self, first: &str, second: &str) -> Result<ComparisonPair, CompareError> {
        compare(&self.table, first, second, &Metric::COMPARISON)
    }

    /// The loaded table as CSV with all its columns, for download.
    pub fn csv_bytes(&self) -> Result<Vec<u8>, StorageError> {
        storage::encode_table(self.raw.source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayerSeasonRecord;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn player(name: &str, team: &str, pts: f64, min: f64) -> PlayerSeasonRecord {
        let mut r = PlayerSeasonRecord::new(name, team);
        r.pts = pts;
        r.min = min;
        r
    }

    fn session() -> Session {
        let raw = RecordTable::new(vec![
            player("Jayson Tatum", "BOS", 1987.0, 2596.0),
            player("Jaylen Brown", "BOS", 1703.0, 2347.0),
            player("Luka Doncic", "DAL", 2370.0, 2624.0),
            player("Kyrie Irving", "DAL", 1442.0, 2047.0),
        ]);
        Session::new("2023-24", raw, &MetricCalculator::default())
    }

    #[test]
    fn test_filters() {
        let filters = session().filters(TopN::default());

        assert_eq!(filters.season, "2023-24");
        assert_eq!(filters.teams, vec!["all", "BOS", "DAL"]);
        assert_eq!(filters.metrics.len(), 14);
        assert_eq!(filters.metrics[0], Metric::Pts);
        assert_eq!(
            filters.derived_metrics,
            vec![
                Metric::PtsPerMin,
                Metric::AstPerMin,
                Metric::RebPerMin,
                Metric::ThreePointPct,
                Metric::AstPerTov,
                Metric::PtsPerFga,
            ]
        );
        assert_eq!(
            filters.top_n,
            TopNRange {
                min: 5,
                max: 30,
                default: 10
            }
        );
        assert_eq!(
            filters.players,
            vec!["Jaylen Brown", "Jayson Tatum", "Kyrie Irving", "Luka Doncic"]
        );
    }

    #[test]
    fn test_leaderboard_by_team() {
        let s = session();
        let view = s.leaderboard(&TeamFilter::Team("DAL".into()), Metric::Pts, TopN::default());

        assert_eq!(view.len(), 2);
        assert_eq!(view.entries[0].player_name, "Luka Doncic");
        assert_eq!(view.entries[1].player_name, "Kyrie Irving");
    }

    #[test]
    fn test_leaderboard_is_recomputed_each_call() {
        let s = session();
        let a = s.leaderboard(&TeamFilter::All, Metric::Pts, TopN::default());
        let b = s.leaderboard(&TeamFilter::All, Metric::Pts, TopN::default());
        assert_eq!(a, b);
        assert_eq!(s.raw().len(), 4);
    }

    #[test]
    fn test_compare_uses_comparison_metrics() {
        let pair = session().compare("Jayson Tatum", "Luka Doncic").unwrap();

        assert_eq!(pair.metrics, Metric::COMPARISON.to_vec());
        assert_eq!(pair.points.len(), 20);
    }

    #[test]
    fn test_compare_errors() {
        let s = session();
        assert_eq!(
            s.compare("Jayson Tatum", "Jayson Tatum").unwrap_err(),
            CompareError::InvalidSelection("Jayson Tatum".into())
        );
        assert_eq!(
            s.compare("Jayson Tatum", "Nobody").unwrap_err(),
            CompareError::PlayerNotFound("Nobody".into())
        );
    }

    #[test]
    fn test_load_from_storage() {
        let tmp = TempDir::new().unwrap();
        let storage = StorageConfig::new(tmp.path().to_path_buf());
        let s = session();
        storage::write_table(&storage.season_csv_path("2023-24"), s.source()).unwrap();

        let loaded = Session::load(&storage, "2023-24", &MetricCalculator::default()).unwrap();

        assert_eq!(loaded.season(), "2023-24");
        assert_eq!(loaded.raw(), s.raw());
        assert_eq!(loaded.table().len(), 4);
    }

    #[test]
    fn test_load_missing_season() {
        let tmp = TempDir::new().unwrap();
        let storage = StorageConfig::new(tmp.path().to_path_buf());

        let err = Session::load(&storage, "1999-00", &MetricCalculator::default()).unwrap_err();

        assert!(matches!(
            err,
            SessionError::Storage(StorageError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_csv_bytes_has_header() {
        let bytes = session().csv_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("PLAYER_NAME,TEAM_ABBREVIATION,PTS"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_csv_bytes_keeps_upstream_columns() {
        let tmp = TempDir::new().unwrap();
        let storage = StorageConfig::new(tmp.path().to_path_buf());
        std::fs::write(
            storage.season_csv_path("2023-24"),
            "PLAYER_ID,PLAYER_NAME,TEAM_ABBREVIATION,GP,MIN,FGA,FG3M,FG3A,FG_PCT,REB,AST,TOV,STL,BLK,PTS,PLUS_MINUS\n\
             1628369,Jayson Tatum,BOS,74,2596.0,1450,223,594,0.471,603,363,193,77,42,1987,505\n",
        )
        .unwrap();

        let loaded = Session::load(&storage, "2023-24", &MetricCalculator::default()).unwrap();
        let text = String::from_utf8(loaded.csv_bytes().unwrap()).unwrap();

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("PLAYER_ID,PLAYER_NAME,TEAM_ABBREVIATION,GP,"));
        assert!(lines.next().unwrap().contains(",0.471,"));
        assert_eq!(loaded.raw().records()[0].pts, 1987.0);
    }
}
