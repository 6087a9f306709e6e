//! # NBA Dashboard
//!
//! Season leaderboards, head-to-head player comparisons and single-game
//! boxscores built on the public NBA stats API.
//!
//! ## Architecture
//!
//! - **models**: Season records, tables, metrics, game rows and chart specs
//! - **calculate**: Derived per-minute and ratio metrics
//! - **rank**: Team filter and top-N leaderboards
//! - **compare**: Head-to-head player comparison
//! - **boxscore**: Single-game points view
//! - **session**: Loaded season table and the views computed from it
//! - **fetch**: Stats API client
//! - **storage**: CSV persistence
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod boxscore;
pub mod calculate;
pub mod compare;
pub mod config;
pub mod fetch;
pub mod models;
pub mod rank;
pub mod session;
pub mod storage;

pub use models::*;

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
