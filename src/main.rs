use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nba_dashboard::api::{build_router, state::AppState};
use nba_dashboard::boxscore::{find_game, points_by_player};
use nba_dashboard::calculate::MetricCalculator;
use nba_dashboard::config::AppConfig;
use nba_dashboard::fetch::{StatsClient, StatsSource};
use nba_dashboard::models::Metric;
use nba_dashboard::rank::{TeamFilter, TopN};
use nba_dashboard::session::Session;
use nba_dashboard::storage::{self, StorageConfig};

#[derive(Parser)]
#[command(name = "nba-dashboard")]
#[command(about = "NBA season leaderboards, head-to-head comparisons and boxscores")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Season, e.g. 2023-24 (overrides config)
    #[arg(long)]
    season: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download season stats and save them as CSV
    Fetch {
        /// Season type, e.g. "Regular Season" or "Playoffs"
        #[arg(long)]
        season_type: Option<String>,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the season leaderboard
    Leaderboard {
        /// Team abbreviation, or "all"
        #[arg(long, default_value = "all")]
        team: String,

        /// Metric column, e.g. PTS or PTS_per_MIN
        #[arg(long, default_value = "PTS")]
        metric: String,

        /// Number of players (5-30)
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Compare two players head-to-head
    Compare { player1: String, player2: String },

    /// List games on a date
    Games {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },

    /// Show points per player for one game
    Boxscore {
        /// Game id, e.g. 0022300061
        game_id: String,

        /// Game date (YYYY-MM-DD), used to label the matchup
        #[arg(long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_file_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(season) = &cli.season {
        config.season.season = season.clone();
    }
    config.validate()?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(config.log_level.as_str());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting nba-dashboard v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Fetch { season_type } => {
            let season = &config.season.season;
            let season_type = season_type.unwrap_or_else(|| config.season.season_type.clone());
            let client = StatsClient::new(config.stats_api.fetcher_config())?;

            let table = match client.season_stats(season, &season_type).await {
                Ok(table) => table,
                Err(e) => {
                    tracing::error!("Failed to fetch {} {} stats: {}", season, season_type, e);
                    return Err(e.into());
                }
            };

            let path = storage.season_csv_path(season);
            let rows = storage::write_table(&path, &table)?;
            println!("Saved {} players to {}", rows, path.display());
        }
        Commands::Serve { host, port } => {
            let session = load_session(&config, &storage)?;
            let client = StatsClient::new(config.stats_api.fetcher_config())?;

            let state = AppState {
                session: Arc::new(session),
                source: Arc::new(client),
                default_top_n: config.season.top_n(),
                cors_origin: config.server.cors_origin.clone(),
            };
            let app = build_router(state);

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Leaderboard {
            team,
            metric,
            top_n,
        } => {
            let session = load_session(&config, &storage)?;
            let metric: Metric = metric.parse()?;
            let team = TeamFilter::parse(Some(&team));
            let top_n = match top_n {
                Some(n) => TopN::new(n)?,
                None => config.season.top_n(),
            };

            let view = session.leaderboard(&team, metric, top_n);
            println!("\n=== {} ({}) ===", view.title(), view.team);
            if let Some(notice) = view.notice() {
                println!("{}", notice);
            }
            for entry in &view.entries {
                println!(
                    "{:>3}. {:<28} {:<4} {:>10.2}",
                    entry.rank, entry.player_name, entry.team_abbreviation, entry.display_value
                );
            }
        }
        Commands::Compare { player1, player2 } => {
            let session = load_session(&config, &storage)?;
            let pair = session.compare(&player1, &player2)?;

            println!("\n=== {} vs {} ===", player1, player2);
            println!("{:<12} {:>14} {:>14}", "Metric", player1, player2);
            let first = pair.values_for(&player1);
            let second = pair.values_for(&player2);
            for ((metric, a), b) in pair.metrics.iter().zip(first).zip(second) {
                println!("{:<12} {:>14.2} {:>14.2}", metric.column(), a, b);
            }
        }
        Commands::Games { date } => {
            let date = parse_date(&date)?;
            let client = StatsClient::new(config.stats_api.fetcher_config())?;
            let games = client.scoreboard(date).await?;

            if games.is_empty() {
                println!("No games found on {}", date);
            }
            for game in &games {
                println!("{}  {}", game.game_id, game.matchup());
            }
        }
        Commands::Boxscore { game_id, date } => {
            let client = StatsClient::new(config.stats_api.fetcher_config())?;

            let label = match date {
                Some(d) => {
                    let games = client.scoreboard(parse_date(&d)?).await?;
                    find_game(&games, &game_id)
                        .map(|g| g.matchup())
                        .unwrap_or_else(|| game_id.clone())
                }
                None => game_id.clone(),
            };

            let rows = client.boxscore(&game_id).await?;
            let points = points_by_player(&rows, &label);

            println!("\n=== {} ===", points.title);
            for team in &points.teams {
                println!("\n{}", team.team);
                for p in &team.players {
                    match p.points {
                        Some(pts) => println!("  {:<28} {:>4}", p.player_name, pts),
                        None => println!("  {:<28} {:>4}", p.player_name, "-"),
                    }
                }
            }
        }
    }

    Ok(())
}

fn load_session(config: &AppConfig, storage: &StorageConfig) -> Result<Session> {
    let calculator = MetricCalculator::new(config.season.epsilon)?;
    let session = Session::load(storage, &config.season.season, &calculator).with_context(|| {
        format!(
            "No stats for season {}; run `nba-dashboard fetch` first",
            config.season.season
        )
    })?;
    Ok(session)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", s))
}
