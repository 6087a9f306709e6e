//! Filesystem persistence.
//!
//! The season table is stored as one CSV file per season under the data
//! directory, e.g. `./data/nba_players_stats_2023_24.csv`.

mod season_csv;

pub use season_csv::*;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::TableError;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid table: {0}")]
    Table(#[from] TableError),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// CSV file for a season, "2023-24" -> `nba_players_stats_2023_24.csv`.
    pub fn season_csv_path(&self, season: &str) -> PathBuf {
        self.data_dir
            .join(format!("nba_players_stats_{}.csv", season.trim().replace('-', "_")))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
