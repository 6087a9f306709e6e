//! Single-game view: points per player, grouped by team.

use serde::Serialize;

use crate::models::{Bar, BarChart, BoxscoreRow, Orientation, ScheduledGame};

/// A player's points in one game. `None` when the cell was not numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPoints {
    pub player_name: String,
    pub points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPoints {
    pub team: String,
    pub players: Vec<PlayerPoints>,
}

/// Points-per-player view for one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamePoints {
    pub title: String,
    /// Teams in order of first appearance
    pub teams: Vec<TeamPoints>,
}

impl GamePoints {
    /// Vertical bars keyed by player name, coloured by team.
    pub fn bar_chart(&self) -> BarChart {
        BarChart {
            title: self.title.clone(),
            x: "PLAYER_NAME".to_string(),
            y: "PTS".to_string(),
            color_by: "TEAM_ABBREVIATION".to_string(),
            orientation: Orientation::Vertical,
            bars: self
                .teams
                .iter()
                .flat_map(|t| {
                    t.players.iter().map(move |p| Bar {
                        label: p.player_name.clone(),
                        value: p.points,
                        group: Some(t.team.clone()),
                    })
                })
                .collect(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.teams.iter().map(|t| t.players.len()).sum()
    }
}

/// Whether a minutes value is the zero-minutes sentinel ("0:00").
///
/// Missing or unparseable minutes are not the sentinel.
pub fn is_zero_minutes(row: &BoxscoreRow) -> bool {
    row.seconds_played() == Some(0)
}

/// Build the points view: drop zero-minute rows, coerce points, group by team.
pub fn points_by_player(rows: &[BoxscoreRow], label: &str) -> GamePoints {
    let mut teams: Vec<TeamPoints> = Vec::new();

    for row in rows.iter().filter(|r| !is_zero_minutes(r)) {
        let entry = PlayerPoints {
            player_name: row.player_name.clone(),
            points: row.points(),
        };
        match teams.iter_mut().find(|t| t.team == row.team_abbreviation) {
            Some(team) => team.players.push(entry),
            None => teams.push(TeamPoints {
                team: row.team_abbreviation.clone(),
                players: vec![entry],
            }),
        }
    }

    GamePoints {
        title: format!("Points per player in {}", label),
        teams,
    }
}

/// Find a game by id or by its matchup label.
pub fn find_game<'a>(games: &'a [ScheduledGame], selector: &str) -> Option<&'a ScheduledGame> {
    let selector = selector.trim();
    games
        .iter()
        .find(|g| g.game_id == selector)
        .or_else(|| games.iter().find(|g| g.matchup() == selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn row(name: &str, team: &str, minutes: Option<&str>, pts: Value) -> BoxscoreRow {
        let mut columns = Map::new();
        columns.insert("PLAYER_NAME".to_string(), json!(name));
        columns.insert("PTS".to_string(), pts);
        BoxscoreRow {
            player_name: name.to_string(),
            team_abbreviation: team.to_string(),
            minutes: minutes.map(str::to_string),
            columns,
        }
    }

    #[test]
    fn test_zero_minute_rows_dropped() {
        let rows = vec![
            row("Starter", "BOS", Some("35:10"), json!(22)),
            row("Benched", "BOS", Some("0:00"), json!(0)),
        ];

        let view = points_by_player(&rows, "BOS vs MIA");

        assert_eq!(view.player_count(), 1);
        assert_eq!(view.teams[0].players[0].player_name, "Starter");
    }

    #[test]
    fn test_missing_minutes_kept_with_missing_points() {
        let rows = vec![row("DNP", "MIA", None, Value::Null)];

        let view = points_by_player(&rows, "BOS vs MIA");

        assert_eq!(view.player_count(), 1);
        assert_eq!(view.teams[0].players[0].points, None);
    }

    #[test]
    fn test_points_coerced() {
        let rows = vec![
            row("Text", "BOS", Some("20:00"), json!("17")),
            row("Junk", "BOS", Some("20:00"), json!("n/a")),
        ];

        let view = points_by_player(&rows, "g");

        let points: Vec<Option<f64>> = view.teams[0].players.iter().map(|p| p.points).collect();
        assert_eq!(points, vec![Some(17.0), None]);
    }

    #[test]
    fn test_grouped_by_team_in_first_appearance_order() {
        let rows = vec![
            row("M1", "MIA", Some("30:00"), json!(10)),
            row("B1", "BOS", Some("30:00"), json!(20)),
            row("M2", "MIA", Some("12:00"), json!(4)),
        ];

        let view = points_by_player(&rows, "BOS vs MIA");

        let teams: Vec<&str> = view.teams.iter().map(|t| t.team.as_str()).collect();
        assert_eq!(teams, vec!["MIA", "BOS"]);
        assert_eq!(view.teams[0].players.len(), 2);
        assert_eq!(view.title, "Points per player in BOS vs MIA");
    }

    #[test]
    fn test_bar_chart_colours_by_team() {
        let rows = vec![
            row("M1", "MIA", Some("30:00"), json!(10)),
            row("B1", "BOS", Some("30:00"), json!(20)),
        ];

        let chart = points_by_player(&rows, "g").bar_chart();

        assert_eq!(chart.x, "PLAYER_NAME");
        assert_eq!(chart.y, "PTS");
        assert_eq!(chart.orientation, Orientation::Vertical);
        assert_eq!(chart.bars[1].group.as_deref(), Some("BOS"));
        assert_eq!(chart.bars[1].value, Some(20.0));
    }

    #[test]
    fn test_find_game() {
        let games = vec![ScheduledGame {
            game_id: "0022300500".to_string(),
            game_date: None,
            home_team: "BOS".to_string(),
            visitor_team: "MIA".to_string(),
        }];

        assert!(find_game(&games, "0022300500").is_some());
        assert!(find_game(&games, "BOS vs MIA").is_some());
        assert!(find_game(&games, "LAL vs DEN").is_none());
    }
}
