use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::boxscore::{find_game, points_by_player, GamePoints};
use crate::models::{BarChart, BoxscoreRow};

#[derive(Debug, Deserialize)]
pub struct GamesParams {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub game_date: Option<NaiveDate>,
    pub home_team: String,
    pub visitor_team: String,
    pub matchup: String,
}

#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub date: NaiveDate,
    pub games: Vec<GameSummary>,
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BoxscoreParams {
    /// Game date, used to label the chart with the matchup
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BoxscoreResponse {
    pub game_id: String,
    pub label: String,
    pub rows: Vec<BoxscoreRow>,
    pub points: GamePoints,
    pub chart: BarChart,
}

fn parse_date(value: Option<&str>) -> Result<NaiveDate, ApiError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("date is required (YYYY-MM-DD)".to_string()))?;

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date (expected YYYY-MM-DD): {}", value)))
}

pub async fn games_by_date(
    State(state): State<AppState>,
    params: Result<Query<GamesParams>, QueryRejection>,
) -> Result<Json<GamesResponse>, ApiError> {
    let Query(params) = params?;
    let date = parse_date(params.date.as_deref())?;
    let games = state.source.scoreboard(date).await?;

    let notice = games
        .is_empty()
        .then(|| format!("No games found on {}", date));
    let games = games
        .into_iter()
        .map(|g| GameSummary {
            matchup: g.matchup(),
            game_id: g.game_id,
            game_date: g.game_date,
            home_team: g.home_team,
            visitor_team: g.visitor_team,
        })
        .collect();

    Ok(Json(GamesResponse {
        date,
        games,
        notice,
    }))
}

pub async fn boxscore(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    params: Result<Query<BoxscoreParams>, QueryRejection>,
) -> Result<Json<BoxscoreResponse>, ApiError> {
    let Query(params) = params?;

    // The scoreboard only supplies the label
    let label = match params.date.as_deref() {
        Some(value) => {
            let date = parse_date(Some(value))?;
            match state.source.scoreboard(date).await {
                Ok(games) => find_game(&games, &game_id)
                    .map(|g| g.matchup())
                    .unwrap_or_else(|| game_id.clone()),
                Err(e) => {
                    warn!("Scoreboard for {} unavailable, labelling by game id: {}", date, e);
                    game_id.clone()
                }
            }
        }
        None => game_id.clone(),
    };

    let rows = state.source.boxscore(&game_id).await?;
    let points = points_by_player(&rows, &label);

    Ok(Json(BoxscoreResponse {
        chart: points.bar_chart(),
        game_id,
        label,
        rows,
        points,
    }))
}
