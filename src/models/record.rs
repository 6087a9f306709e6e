//! Player-season record model.

use serde::{Deserialize, Serialize};

/// Upstream column names for the season stats table.
pub mod columns {
    pub const PLAYER_NAME: &str = "PLAYER_NAME";
    pub const TEAM_ABBREVIATION: &str = "TEAM_ABBREVIATION";
    pub const PTS: &str = "PTS";
    pub const AST: &str = "AST";
    pub const REB: &str = "REB";
    pub const STL: &str = "STL";
    pub const BLK: &str = "BLK";
    pub const FG3M: &str = "FG3M";
    pub const MIN: &str = "MIN";
    pub const PLUS_MINUS: &str = "PLUS_MINUS";
    pub const FGA: &str = "FGA";
    pub const FG3A: &str = "FG3A";
    pub const TOV: &str = "TOV";

    /// Modelled columns, in the order a table built from records is written.
    pub const ALL: [&str; 13] = [
        PLAYER_NAME,
        TEAM_ABBREVIATION,
        PTS,
        AST,
        REB,
        STL,
        BLK,
        FG3M,
        MIN,
        PLUS_MINUS,
        FGA,
        FG3A,
        TOV,
    ];
}

/// One player's totals for one season.
///
/// Field order matches `columns::ALL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonRecord {
    #[serde(rename = "PLAYER_NAME")]
    pub player_name: String,

    #[serde(rename = "TEAM_ABBREVIATION")]
    pub team_abbreviation: String,

    #[serde(rename = "PTS")]
    pub pts: f64,

    #[serde(rename = "AST")]
    pub ast: f64,

    #[serde(rename = "REB")]
    pub reb: f64,

    #[serde(rename = "STL")]
    pub stl: f64,

    #[serde(rename = "BLK")]
    pub blk: f64,

    /// Made three-pointers
    #[serde(rename = "FG3M")]
    pub fg3m: f64,

    /// Minutes played
    #[serde(rename = "MIN")]
    pub min: f64,

    /// Signed point differential while on court
    #[serde(rename = "PLUS_MINUS")]
    pub plus_minus: f64,

    /// Field-goal attempts
    #[serde(rename = "FGA")]
    pub fga: f64,

    /// Three-point attempts
    #[serde(rename = "FG3A")]
    pub fg3a: f64,

    /// Turnovers
    #[serde(rename = "TOV")]
    pub tov: f64,
}

impl PlayerSeasonRecord {
    /// Create a record with every counting stat at zero.
    pub fn new(player_name: impl Into<String>, team_abbreviation: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            team_abbreviation: team_abbreviation.into(),
            pts: 0.0,
            ast: 0.0,
            reb: 0.0,
            stl: 0.0,
            blk: 0.0,
            fg3m: 0.0,
            min: 0.0,
            plus_minus: 0.0,
            fga: 0.0,
            fg3a: 0.0,
            tov: 0.0,
        }
    }

    /// Identity key within one season snapshot.
    pub fn key(&self) -> (&str, &str) {
        (&self.player_name, &self.team_abbreviation)
    }
}
