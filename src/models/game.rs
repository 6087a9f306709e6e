//! Single-game models: scheduled games and boxscore rows.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::columns;
use super::table::{cell_f64, cell_string, ResultSet, TableError, NULL_CELL};

/// A game on the scoreboard for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub game_id: String,
    pub game_date: Option<NaiveDate>,
    pub home_team: String,
    pub visitor_team: String,
}

impl ScheduledGame {
    /// Selector label, e.g. "BOS vs MIA".
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.visitor_team)
    }

    /// Parse the scoreboard's game header.
    ///
    /// The header carries team ids only; abbreviations come from the line
    /// score when present, otherwise the id is used as the label.
    pub fn from_scoreboard(
        header: &ResultSet,
        line_score: Option<&ResultSet>,
    ) -> Result<Vec<Self>, TableError> {
        let game_id = header.require("GAME_ID")?;
        let game_date = header.require("GAME_DATE_EST")?;
        let home_id = header.require("HOME_TEAM_ID")?;
        let visitor_id = header.require("VISITOR_TEAM_ID")?;

        let abbreviations = match line_score {
            Some(ls) => team_abbreviations(ls)?,
            None => HashMap::new(),
        };
        let label = |v: &Value| -> String {
            let id = cell_string(v).unwrap_or_default();
            abbreviations.get(&id).cloned().unwrap_or(id)
        };

        let mut games = Vec::with_capacity(header.len());
        for (row_num, row) in header.row_set.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).unwrap_or(&NULL_CELL);
            let id = cell_string(cell(game_id)).ok_or_else(|| TableError::InvalidCell {
                column: "GAME_ID".to_string(),
                row: row_num,
                value: cell(game_id).to_string(),
            })?;

            // Dedupe: the header can repeat a game across broadcast rows
            if games.iter().any(|g: &ScheduledGame| g.game_id == id) {
                continue;
            }

            games.push(ScheduledGame {
                game_id: id,
                game_date: cell_string(cell(game_date)).and_then(|s| parse_game_date(&s)),
                home_team: label(cell(home_id)),
                visitor_team: label(cell(visitor_id)),
            });
        }
        Ok(games)
    }
}

fn team_abbreviations(line_score: &ResultSet) -> Result<HashMap<String, String>, TableError> {
    let team_id = line_score.require("TEAM_ID")?;
    let abbr = line_score.require(columns::TEAM_ABBREVIATION)?;
    Ok(line_score
        .row_set
        .iter()
        .filter_map(|row| {
            let id = row.get(team_id).and_then(cell_string)?;
            let a = row.get(abbr).and_then(cell_string)?;
            Some((id, a))
        })
        .collect())
}

/// Parse "2024-01-15T00:00:00" or "2024-01-15".
fn parse_game_date(s: &str) -> Option<NaiveDate> {
    s.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// One player's line in a single game.
///
/// All upstream columns are kept in `columns`; name, team and minutes are
/// lifted out because the views key on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxscoreRow {
    pub player_name: String,
    pub team_abbreviation: String,
    /// Minutes as reported, "MM:SS"; absent for players who did not dress.
    pub minutes: Option<String>,
    pub columns: Map<String, Value>,
}

impl BoxscoreRow {
    pub fn from_result_set(set: &ResultSet) -> Result<Vec<Self>, TableError> {
        let name = set.require(columns::PLAYER_NAME)?;
        let team = set.require(columns::TEAM_ABBREVIATION)?;
        let minutes = set.require(columns::MIN)?;
        set.require(columns::PTS)?;

        let mut rows = Vec::with_capacity(set.len());
        for (row_num, row) in set.row_set.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).cloned().unwrap_or(Value::Null);
            let player_name = cell_string(&cell(name)).ok_or_else(|| TableError::InvalidCell {
                column: columns::PLAYER_NAME.to_string(),
                row: row_num,
                value: cell(name).to_string(),
            })?;

            let all_columns = set
                .headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), cell(i)))
                .collect();

            rows.push(BoxscoreRow {
                player_name,
                team_abbreviation: cell_string(&cell(team)).unwrap_or_default(),
                minutes: cell_string(&cell(minutes)),
                columns: all_columns,
            });
        }
        Ok(rows)
    }

    /// Points, coerced to a number. Non-numeric cells are missing.
    pub fn points(&self) -> Option<f64> {
        self.columns.get(columns::PTS).and_then(cell_f64)
    }

    /// Seconds played, parsed from "MM:SS" (minutes may carry a decimal part).
    pub fn seconds_played(&self) -> Option<u32> {
        self.minutes.as_deref().and_then(parse_minutes)
    }
}

/// Parse a minutes string into seconds.
pub fn parse_minutes(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let (mins, secs) = match s.split_once(':') {
        Some((m, sec)) => (m, sec.parse::<u32>().ok()?),
        None => (s, 0),
    };
    let mins: f64 = mins.parse().ok()?;
    if !mins.is_finite() || mins < 0.0 {
        return None;
    }
    Some(mins.trunc() as u32 * 60 + secs)
}
