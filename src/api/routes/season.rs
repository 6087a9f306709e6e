use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::compare::ComparisonPair;
use crate::models::{BarChart, GroupedBarChart, Metric, RadarChart};
use crate::rank::{RankedView, TeamFilter, TopN};
use crate::session::SeasonFilters;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub team: Option<String>,
    pub metric: Option<String>,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub title: String,
    #[serde(flatten)]
    pub view: RankedView,
    pub notice: Option<String>,
    pub chart: BarChart,
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub player1: String,
    pub player2: String,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub pair: ComparisonPair,
    pub grouped_bar: GroupedBarChart,
    pub radar: RadarChart,
}

pub async fn filters(State(state): State<AppState>) -> Json<SeasonFilters> {
    Json(state.session.filters(state.default_top_n))
}

/// Top-N out of range is clamped rather than rejected.
pub async fn leaderboard(
    State(state): State<AppState>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let Query(params) = params?;
    let team = TeamFilter::parse(params.team.as_deref());
    let metric = match params.metric.as_deref() {
        Some(m) if !m.trim().is_empty() => m.parse::<Metric>()?,
        _ => Metric::Pts,
    };
    let top_n = match params.top_n {
        Some(n) => TopN::clamped(Some(n)),
        None => state.default_top_n,
    };

    let view = state.session.leaderboard(&team, metric, top_n);
    Ok(Json(LeaderboardResponse {
        title: view.title(),
        notice: view.notice(),
        chart: view.bar_chart(),
        view,
    }))
}

pub async fn compare(
    State(state): State<AppState>,
    params: Result<Query<CompareParams>, QueryRejection>,
) -> Result<Json<CompareResponse>, ApiError> {
    let Query(params) = params?;
    let pair = state.session.compare(&params.player1, &params.player2)?;

    Ok(Json(CompareResponse {
        grouped_bar: pair.grouped_bar(),
        radar: pair.radar(&Metric::RADAR),
        pair,
    }))
}

pub async fn csv_download(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.session.csv_bytes()?;
    let filename = format!(
        "attachment; filename=\"nba_players_stats_{}.csv\"",
        state.session.season().replace('-', "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::calculate::MetricCalculator;
    use crate::fetch::MockSource;
    use crate::models::{PlayerSeasonRecord, RecordTable};
    use crate::rank::TopN;
    use crate::session::Session;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn player(name: &str, team: &str, pts: f64, ast: f64, min: f64) -> PlayerSeasonRecord {
        let mut r = PlayerSeasonRecord::new(name, team);
        r.pts = pts;
        r.ast = ast;
        r.min = min;
        r
    }

    fn setup_test_state() -> AppState {
        let mut rows = vec![
            player("Luka Doncic", "DAL", 2370.0, 686.0, 2624.0),
            player("Kyrie Irving", "DAL", 1442.0, 294.0, 2047.0),
            player("Jayson Tatum", "BOS", 1987.0, 355.0, 2596.0),
            player("Jaylen Brown", "BOS", 1703.0, 249.0, 2347.0),
            player("Zero Minutes", "BOS", 0.0, 0.0, 0.0),
        ];
        for i in 0..30 {
            rows.push(player(&format!("Bench {:02}", i), "SAS", i as f64, 1.0, 50.0));
        }
        let session = Session::new(
            "2023-24",
            RecordTable::new(rows),
            &MetricCalculator::default(),
        );
        AppState {
            session: Arc::new(session),
            source: Arc::new(MockSource::failing()),
            default_top_n: TopN::default(),
            cors_origin: "*".to_string(),
        }
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_filters() {
        let app = build_router(setup_test_state());
        let (status, json) = get_json(app, "/api/season/filters").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["teams"][0], "all");
        assert_eq!(json["teams"][1], "BOS");
        assert_eq!(json["teams"].as_array().unwrap().len(), 4);
        assert_eq!(json["metrics"][0], "PTS");
        assert_eq!(json["metrics"][11], "3P_percent");
        assert_eq!(json["derived_metrics"].as_array().unwrap().len(), 6);
        assert_eq!(json["derived_metrics"][0], "PTS_per_MIN");
        assert_eq!(json["top_n"]["min"], 5);
        assert_eq!(json["top_n"]["max"], 30);
        assert_eq!(json["top_n"]["default"], 10);
        assert_eq!(json["players"].as_array().unwrap().len(), 35);
    }

    #[tokio::test]
    async fn test_leaderboard_defaults() {
        let app = build_router(setup_test_state());
        let (status, json) = get_json(app, "/api/season/leaderboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "Top 10 players by PTS");
        assert_eq!(json["team"], "all");
        assert_eq!(json["metric"], "PTS");
        assert_eq!(json["entries"].as_array().unwrap().len(), 10);
        assert_eq!(json["entries"][0]["player_name"], "Luka Doncic");
        assert_eq!(json["entries"][0]["rank"], 1);
        assert_eq!(json["notice"], Value::Null);
        assert_eq!(json["chart"]["orientation"], "horizontal");
        assert_eq!(json["chart"]["bars"][0]["label"], "Luka Doncic");
    }

    #[tokio::test]
    async fn test_leaderboard_team_and_derived_metric() {
        let app = build_router(setup_test_state());
        let (status, json) =
            get_json(app, "/api/season/leaderboard?team=BOS&metric=PTS_per_MIN&top_n=5").await;

        assert_eq!(status, StatusCode::OK);
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e["team_abbreviation"] == "BOS"));
        assert_eq!(entries[0]["player_name"], "Jayson Tatum");
        assert_eq!(entries[1]["player_name"], "Jaylen Brown");
        assert_eq!(entries[2]["player_name"], "Zero Minutes");
        assert_eq!(json["matching_rows"], 3);
    }

    #[tokio::test]
    async fn test_leaderboard_top_n_is_clamped() {
        let app = build_router(setup_test_state());
        let (_, json) = get_json(app.clone(), "/api/season/leaderboard?top_n=2").await;
        assert_eq!(json["top_n"], 5);
        assert_eq!(json["entries"].as_array().unwrap().len(), 5);

        let (_, json) = get_json(app, "/api/season/leaderboard?top_n=100").await;
        assert_eq!(json["top_n"], 30);
        assert_eq!(json["entries"].as_array().unwrap().len(), 30);
    }

    #[tokio::test]
    async fn test_leaderboard_unknown_team_has_notice() {
        let app = build_router(setup_test_state());
        let (status, json) = get_json(app, "/api/season/leaderboard?team=XYZ").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["entries"].as_array().unwrap().len(), 0);
        assert_eq!(json["notice"], "No players found for team XYZ");
    }

    #[tokio::test]
    async fn test_leaderboard_unknown_metric() {
        let app = build_router(setup_test_state());
        let (status, json) = get_json(app, "/api/season/leaderboard?metric=WINGSPAN").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_leaderboard_malformed_top_n() {
        let app = build_router(setup_test_state());
        let (status, json) = get_json(app, "/api/season/leaderboard?top_n=abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_compare() {
        let app = build_router(setup_test_state());
        let (status, json) = get_json(
            app,
            "/api/season/compare?player1=Luka%20Doncic&player2=Jayson%20Tatum",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["players"][0], "Luka Doncic");
        assert_eq!(json["points"].as_array().unwrap().len(), 20);
        assert_eq!(json["points"][0]["metric"], "PTS");
        assert_eq!(json["points"][0]["value"], 2370.0);
        assert_eq!(json["grouped_bar"]["series"].as_array().unwrap().len(), 2);
        assert_eq!(json["radar"]["axes"].as_array().unwrap().len(), 6);
        assert_eq!(json["radar"]["traces"][1]["name"], "Jayson Tatum");
    }

    #[tokio::test]
    async fn test_compare_same_player() {
        let app = build_router(setup_test_state());
        let (status, _) = get_json(
            app,
            "/api/season/compare?player1=Luka%20Doncic&player2=Luka%20Doncic",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_compare_missing_player_param() {
        let app = build_router(setup_test_state());
        let (status, json) = get_json(app.clone(), "/api/season/compare?player1=Luka%20Doncic").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"].as_str().unwrap().contains("player2"));

        let (status, json) = get_json(app, "/api/season/compare").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_compare_unknown_player() {
        let app = build_router(setup_test_state());
        let (status, json) = get_json(
            app,
            "/api/season/compare?player1=Luka%20Doncic&player2=Nobody",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_csv_download() {
        let app = build_router(setup_test_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/season/csv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert!(resp.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("nba_players_stats_2023_24.csv"));

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("PLAYER_NAME,TEAM_ABBREVIATION,"));
        assert_eq!(text.lines().count(), 36);
    }
}
