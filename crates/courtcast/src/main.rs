// Courtcast entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open the roster feed, player directory, and game-log feed
// 4. Resolve platform players to stats ids
// 5. Restore projections from the snapshot, or project and save
// 6. Aggregate teams and rank categories
// 7. Print the rank table and matchup outlooks

use std::path::Path;

use courtcast::config;
use courtcast::feed::{CsvStatsFeed, JsonRosterFeed, PlayerDirectory, RosterFeed};
use courtcast::league::matchup::{expected_category_wins, head_to_head};
use courtcast::league::{AggregationSettings, Player, Team};
use courtcast::pipeline::{self, CancelFlag};
use courtcast::projection::{Breakdowns, PlayerProjector, ProjectionSettings};
use courtcast::snapshot::Snapshot;
use courtcast::stats::{scoring, Scoring};

use anyhow::Context;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Courtcast starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let categories = config.league.categories.clone();
    info!(
        "Config loaded: league={} ({}), {} categories",
        config.league.name,
        config.league.platform,
        categories.len()
    );

    // 3. Feeds
    let roster_feed = JsonRosterFeed::from_path(Path::new(&config.data_paths.roster))
        .context("failed to load league roster export")?;
    let directory = PlayerDirectory::from_path(Path::new(&config.data_paths.directory))
        .context("failed to load player directory")?;
    let stats_feed = CsvStatsFeed::new(&config.data_paths.game_logs);

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Ctrl+C received, stopping after the current item");
                cancel.cancel();
            }
        });
    }

    // 4. Identity resolution
    let listings = roster_feed
        .players()
        .await
        .context("failed to list league players")?;
    let resolution = pipeline::resolve_players(&directory, &listings);
    if !resolution.excluded.is_empty() {
        println!(
            "{} players had no stats match and were excluded",
            resolution.excluded.len()
        );
    }
    let mut players = resolution.players;

    // 5. Projections
    let snapshot_path = Path::new(&config.snapshot.path);
    if config.snapshot.reuse && snapshot_path.exists() {
        restore_snapshot(snapshot_path, &mut players, &categories)?;
    } else {
        let settings = ProjectionSettings::from_config(&config);
        info!(
            "Projecting {} players from {} and {}",
            players.len(),
            settings.current_season,
            settings.current_season.previous()
        );
        let projector = PlayerProjector::new(&stats_feed, &categories, settings);
        let mut breakdowns = Breakdowns::new();
        pipeline::project_players(&mut players, &projector, Some(&mut breakdowns), &cancel)
            .await
            .context("player projection failed")?;
        info!(
            "Breakdowns cover {} opponents and {} locations",
            breakdowns.vs_opponent.keys().count(),
            breakdowns.by_location.keys().count()
        );
        Snapshot::capture(&players)
            .save(snapshot_path)
            .context("failed to save snapshot")?;
    }

    // 6. Aggregate and rank
    let agg_settings = AggregationSettings::from_config(&config);
    let mut teams = pipeline::aggregate_teams(&roster_feed, &players, &categories, &agg_settings, &cancel)
        .await
        .context("team aggregation failed")?;
    pipeline::rank_categories(&mut teams, &categories);

    // 7. Report
    print_rank_table(&teams, &categories);
    print_matchup_outlooks(&teams, &categories);

    info!("Courtcast finished");
    Ok(())
}

/// Restore projections from a saved snapshot. A snapshot that does not
/// cover every current player and category is an error.
fn restore_snapshot(path: &Path, players: &mut [Player], categories: &[String]) -> anyhow::Result<()> {
    let snapshot = Snapshot::load(path).context("failed to load snapshot")?;
    snapshot
        .restore(players, categories)
        .with_context(|| format!("snapshot {} does not cover the current roster", path.display()))?;
    info!("Restored {} players from {}", players.len(), path.display());
    Ok(())
}

/// Rank keys in category order: the key itself, or the percentage label for
/// ratio categories. Attempt-only categories have no rank.
fn rank_keys(categories: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for category in categories {
        let key = match scoring(category) {
            Some(Scoring::Direct) | Some(Scoring::Inverse) => category.clone(),
            Some(Scoring::Ratio { label, .. }) => label.to_string(),
            None => continue,
        };
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

fn print_rank_table(teams: &[Team], categories: &[String]) {
    let keys = rank_keys(categories);
    let mut header = format!("{:<24}", "Team");
    for key in &keys {
        header.push_str(&format!("{key:>8}"));
    }
    println!("{header}");
    for team in teams {
        let mut line = format!("{:<24}", team.name);
        for key in &keys {
            match team.rank(key) {
                Some(rank) => line.push_str(&format!("{rank:>8}")),
                None => line.push_str(&format!("{:>8}", "-")),
            }
        }
        println!("{line}");
    }
}

/// Average expected category wins of each team against every other team.
fn print_matchup_outlooks(teams: &[Team], categories: &[String]) {
    if teams.len() < 2 {
        return;
    }
    println!();
    println!("{:<24}{:>12}", "Team", "Exp. wins");
    for team in teams {
        let total: f64 = teams
            .iter()
            .filter(|other| other.team_id != team.team_id)
            .map(|other| expected_category_wins(&head_to_head(team, other, categories)))
            .sum();
        let average = total / (teams.len() - 1) as f64;
        println!("{:<24}{:>12.2}", team.name, average);
    }
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("courtcast.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("courtcast=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
