// Integration tests for courtcast.
//
// These tests drive the whole run through the library crate's public API:
// identity resolution, two-season projection, team aggregation, category
// ranking, matchup outlooks, and snapshot persistence. Feeds are in-memory
// fakes except for the file-backed scenario at the end.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use courtcast::error::EngineError;
use courtcast::feed::directory::DirectoryEntry;
use courtcast::feed::*;
use courtcast::league::matchup::{expected_category_wins, head_to_head};
use courtcast::league::{AggregationSettings, Player, Team};
use courtcast::pipeline::{self, CancelFlag};
use courtcast::projection::{Breakdowns, PlayerProjector, ProjectionSettings};
use courtcast::snapshot::Snapshot;

const EPS: f64 = 1e-9;

// ===========================================================================
// Test helpers
// ===========================================================================

const CURRENT: i32 = 2024;

/// One game line: minutes, then PTS, TOV, FGM, FGA.
type Line = (f64, f64, f64, f64, f64);

/// Game logs keyed by (stats id, season start year).
struct FakeStats {
    logs: HashMap<(u32, i32), Vec<Line>>,
}

impl FakeStats {
    /// The same lines are used for both the current and previous season.
    fn both_seasons(players: &[(u32, Vec<Line>)]) -> Self {
        let mut logs = HashMap::new();
        for (id, lines) in players {
            logs.insert((*id, CURRENT), lines.clone());
            logs.insert((*id, CURRENT - 1), lines.clone());
        }
        Self { logs }
    }
}

#[async_trait]
impl StatsFeed for FakeStats {
    async fn game_log(&self, player_id: u32, season: Season) -> Result<Vec<GameRecord>, FeedError> {
        let lines = self
            .logs
            .get(&(player_id, season.start_year()))
            .cloned()
            .unwrap_or_default();
        Ok(lines
            .into_iter()
            .map(|(minutes, pts, tov, fgm, fga)| GameRecord {
                minutes,
                location: Location::Home,
                opponent: "BOS".into(),
                stats: [("PTS", pts), ("TOV", tov), ("FGM", fgm), ("FGA", fga)]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            })
            .collect())
    }
}

struct FakeLeague {
    players: Vec<RosterPlayer>,
    teams: Vec<(TeamSummary, Vec<RosterEntry>)>,
}

#[async_trait]
impl RosterFeed for FakeLeague {
    async fn players(&self) -> Result<Vec<RosterPlayer>, FeedError> {
        Ok(self.players.clone())
    }

    async fn teams(&self) -> Result<Vec<TeamSummary>, FeedError> {
        Ok(self.teams.iter().map(|(s, _)| s.clone()).collect())
    }

    async fn team_roster(&self, team_id: &str) -> Result<Vec<RosterEntry>, FeedError> {
        self.teams
            .iter()
            .find(|(s, _)| s.team_id == team_id)
            .map(|(_, roster)| roster.clone())
            .ok_or_else(|| FeedError::UnknownTeam(team_id.to_string()))
    }
}

fn listing(platform_id: &str, name: &str, position: &str) -> RosterPlayer {
    RosterPlayer {
        platform_id: platform_id.into(),
        full_name: name.into(),
        position: position.into(),
        status: None,
        injured: false,
    }
}

fn slot(platform_id: &str, slot: &str) -> RosterEntry {
    RosterEntry {
        platform_id: platform_id.into(),
        slot: Some(slot.into()),
    }
}

fn summary(id: &str, name: &str) -> TeamSummary {
    TeamSummary {
        team_id: id.into(),
        name: name.into(),
    }
}

fn categories() -> Vec<String> {
    ["PTS", "TOV", "FGM", "FGA"].iter().map(|s| s.to_string()).collect()
}

fn projection_settings() -> ProjectionSettings {
    ProjectionSettings {
        current_season: Season::starting(CURRENT),
        rate_floor: Duration::ZERO,
        ..ProjectionSettings::default()
    }
}

fn aggregation_settings() -> AggregationSettings {
    AggregationSettings {
        rate_floor: Duration::ZERO,
        ..AggregationSettings::default()
    }
}

fn directory() -> PlayerDirectory {
    PlayerDirectory::new(vec![
        DirectoryEntry { id: 2544, full_name: "LeBron James".into() },
        DirectoryEntry { id: 1628991, full_name: "Jaren Jackson Jr.".into() },
        DirectoryEntry { id: 1629027, full_name: "Trae Young".into() },
    ])
}

/// Two teams, four platform players, one of whom has no stats identity.
fn league() -> FakeLeague {
    FakeLeague {
        players: vec![
            listing("p1", "LeBron James", "SF"),
            listing("p2", "Jaren Jackson", "PF"),
            listing("p3", "Trae Young", "PG"),
            listing("p4", "Unknown Rookie", "C"),
        ],
        teams: vec![
            (summary("t1", "Alpha"), vec![slot("p1", "SF"), slot("p2", "PF")]),
            (summary("t2", "Bravo"), vec![slot("p3", "PG"), slot("p4", "C")]),
        ],
    }
}

fn stats() -> FakeStats {
    FakeStats::both_seasons(&[
        (
            2544,
            vec![
                (34.0, 20.0, 3.0, 8.0, 16.0),
                (36.0, 22.0, 3.0, 9.0, 18.0),
                (35.0, 24.0, 3.0, 10.0, 20.0),
                // Garbage-time cameo: below the minutes threshold.
                (5.0, 50.0, 0.0, 20.0, 20.0),
            ],
        ),
        (1628991, vec![(28.0, 10.0, 1.0, 4.0, 8.0), (30.0, 12.0, 1.0, 5.0, 10.0)]),
        (1629027, vec![(35.0, 30.0, 5.0, 10.0, 25.0), (35.0, 30.0, 5.0, 10.0, 25.0)]),
    ])
}

/// Resolve, project, aggregate, and rank with the in-memory fakes.
async fn run(league: &FakeLeague, stats: &FakeStats) -> (Vec<Player>, Vec<String>, Vec<Team>) {
    let cats = categories();
    let cancel = CancelFlag::new();
    let listings = league.players().await.unwrap();
    let resolution = pipeline::resolve_players(&directory(), &listings);

    let mut players = resolution.players;
    let projector = PlayerProjector::new(stats, &cats, projection_settings());
    pipeline::project_players(&mut players, &projector, None, &cancel)
        .await
        .unwrap();

    let mut teams = pipeline::aggregate_teams(league, &players, &cats, &aggregation_settings(), &cancel)
        .await
        .unwrap();
    pipeline::rank_categories(&mut teams, &cats);
    (players, resolution.excluded, teams)
}

// ===========================================================================
// End-to-end
// ===========================================================================

#[tokio::test]
async fn end_to_end_team_points_are_weekly_sum_of_player_means() {
    let (players, excluded, teams) = run(&league(), &stats()).await;

    assert_eq!(excluded, vec!["Unknown Rookie".to_string()]);
    assert_eq!(players.len(), 3);

    let lebron = &players[0];
    assert_eq!(lebron.stats_id, 2544);
    assert!((lebron.categories["PTS"].mean().unwrap() - 22.0).abs() < EPS);
    assert_eq!(lebron.categories["PTS"].sample_count(), Some(6));

    let jjj = &players[1];
    assert_eq!(jjj.stats_id, 1628991);
    assert!((jjj.categories["PTS"].mean().unwrap() - 11.0).abs() < EPS);

    let alpha = &teams[0];
    assert_eq!(alpha.name, "Alpha");
    assert!((alpha.categories["PTS"].mean().unwrap() - 3.5 * (22.0 + 11.0)).abs() < EPS);
    // Each player's variance, identical across seasons, scaled by 3.5 and summed.
    let expected_var = 3.5 * (4.0 + 2.0);
    assert!((alpha.categories["PTS"].variance().unwrap() - expected_var).abs() < EPS);

    // Bravo's unresolved player contributes nothing.
    let bravo = &teams[1];
    assert_eq!(bravo.players.len(), 1);
    assert!((bravo.categories["PTS"].mean().unwrap() - 105.0).abs() < EPS);
}

#[tokio::test]
async fn end_to_end_ranks_by_direction_and_ratio() {
    let (_, _, teams) = run(&league(), &stats()).await;
    let (alpha, bravo) = (&teams[0], &teams[1]);

    // PTS: 115.5 vs 105, higher wins.
    assert_eq!(alpha.rank("PTS"), Some(1));
    assert_eq!(bravo.rank("PTS"), Some(2));

    // TOV: 14 vs 17.5, lower wins.
    assert_eq!(alpha.rank("TOV"), Some(1));
    assert_eq!(bravo.rank("TOV"), Some(2));

    // FG_PCT: 47.25/94.5 = .500 vs 35/87.5 = .400.
    assert_eq!(alpha.rank("FG_PCT"), Some(1));
    assert_eq!(bravo.rank("FG_PCT"), Some(2));

    // Makes and attempts never rank on their own.
    assert_eq!(alpha.rank("FGM"), None);
    assert_eq!(alpha.rank("FGA"), None);
}

#[tokio::test]
async fn injured_and_reserve_players_do_not_count() {
    let mut league = league();
    league.players[0].injured = true;
    league.teams[1].1.push(slot("p2", "IL+"));

    let (_, _, teams) = run(&league, &stats()).await;
    // Alpha is down to JJJ alone.
    assert!((teams[0].categories["PTS"].mean().unwrap() - 3.5 * 11.0).abs() < EPS);
    // JJJ on Bravo's IL+ slot adds nothing there.
    assert!((teams[1].categories["PTS"].mean().unwrap() - 105.0).abs() < EPS);
    assert_eq!(teams[0].rank("PTS"), Some(2));
}

#[tokio::test]
async fn matchup_favours_the_stronger_team() {
    let (_, _, teams) = run(&league(), &stats()).await;
    let outlooks = head_to_head(&teams[0], &teams[1], &categories());

    // FGM/FGA are ratio components and have no margin model.
    let names: Vec<&str> = outlooks.iter().map(|o| o.category.as_str()).collect();
    assert_eq!(names, vec!["PTS", "TOV"]);
    for o in &outlooks {
        let p = o.win_probability.unwrap();
        assert!(p > 0.5 && p <= 1.0, "{} {}", o.category, p);
    }

    let reverse = head_to_head(&teams[1], &teams[0], &categories());
    let total = expected_category_wins(&outlooks) + expected_category_wins(&reverse);
    assert!((total - 2.0).abs() < 1e-6);
}

#[tokio::test]
async fn player_without_games_has_empty_projection_and_zero_weight() {
    let mut stats = stats();
    stats.logs.retain(|(id, _), _| *id != 1628991);

    let (players, _, teams) = run(&league(), &stats).await;
    assert!(players[1].categories["PTS"].is_empty());
    assert!((teams[0].categories["PTS"].mean().unwrap() - 3.5 * 22.0).abs() < EPS);
}

#[tokio::test]
async fn breakdowns_collect_values_across_both_seasons() {
    let cats = categories();
    let stats = stats();
    let projector = PlayerProjector::new(&stats, &cats, projection_settings());
    let mut players = vec![Player::new("LeBron James", 2544, "p1", "SF")];
    let mut breakdowns = Breakdowns::new();

    pipeline::project_players(&mut players, &projector, Some(&mut breakdowns), &CancelFlag::new())
        .await
        .unwrap();

    // Three qualifying games per season; the five-minute game is dropped.
    let values = breakdowns.vs_opponent.position_values("BOS", "PTS", "SF");
    assert_eq!(values.len(), 6);
    assert!(values.iter().all(|v| *v < 50.0));
    assert_eq!(breakdowns.by_location.values(&Location::Home, "PTS").len(), 6);
    assert!(breakdowns.by_location.values(&Location::Away, "PTS").is_empty());
}

#[tokio::test]
async fn cancelled_run_stops_before_any_team() {
    let cats = categories();
    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = pipeline::aggregate_teams(&league(), &[], &cats, &aggregation_settings(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Cancelled));
}

// ===========================================================================
// Snapshot
// ===========================================================================

#[tokio::test]
async fn snapshot_restores_identical_team_aggregates() {
    let league = league();
    let (players, _, teams) = run(&league, &stats()).await;

    let path = std::env::temp_dir()
        .join("courtcast_integration_snapshot")
        .join("snapshot.json");
    let _ = std::fs::remove_file(&path);
    Snapshot::capture(&players).save(&path).unwrap();

    // Fresh players, no feed access: restore then aggregate.
    let mut fresh: Vec<Player> = players
        .iter()
        .map(|p| Player::new(p.name.clone(), p.stats_id, p.platform_id.clone(), p.position.clone()))
        .collect();
    Snapshot::load(&path)
        .unwrap()
        .restore(&mut fresh, &categories())
        .unwrap();

    let mut restored = pipeline::aggregate_teams(
        &league,
        &fresh,
        &categories(),
        &aggregation_settings(),
        &CancelFlag::new(),
    )
    .await
    .unwrap();
    pipeline::rank_categories(&mut restored, &categories());

    for (a, b) in teams.iter().zip(&restored) {
        for cat in categories() {
            let (x, y) = (a.categories[&cat], b.categories[&cat]);
            assert!((x.mean().unwrap() - y.mean().unwrap()).abs() < EPS);
            assert!((x.variance().unwrap() - y.variance().unwrap()).abs() < EPS);
        }
        assert_eq!(a.ranks, b.ranks);
    }

    let _ = std::fs::remove_file(&path);
}

// ===========================================================================
// File-backed feeds
// ===========================================================================

#[tokio::test]
async fn file_backed_feeds_drive_the_same_pipeline() {
    let root = std::env::temp_dir().join("courtcast_integration_files");
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(root.join("gamelogs/2024-25")).unwrap();
    std::fs::create_dir_all(root.join("gamelogs/2023-24")).unwrap();

    std::fs::write(
        root.join("players.csv"),
        "id,full_name\n2544,LeBron James\n1628991,Jaren Jackson Jr.\n",
    )
    .unwrap();
    std::fs::write(
        root.join("league.json"),
        r#"{
            "players": [
                { "platform_id": "p1", "full_name": "LeBron James", "position": "SF" },
                { "platform_id": "p2", "full_name": "Jaren Jackson", "position": "PF" }
            ],
            "teams": [
                { "team_id": "t1", "name": "Alpha",
                  "roster": [ { "platform_id": "p1", "slot": "SF" },
                              { "platform_id": "p2", "slot": "PF" } ] }
            ]
        }"#,
    )
    .unwrap();
    let lebron = "GAME_DATE,MATCHUP,WL,MIN,PTS,TOV,FGM,FGA\n\
                  2024-10-22,LAL vs. MIN,L,34,20,3,8,16\n\
                  2024-10-25,LAL @ PHX,W,36:00,22,3,9,18\n\
                  2024-10-27,LAL vs. SAC,W,35,24,3,10,20\n";
    let jjj = "GAME_DATE,MATCHUP,WL,MIN,PTS,TOV,FGM,FGA\n\
               2024-10-23,MEM @ UTA,W,28,10,1,4,8\n\
               2024-10-25,MEM vs. CHI,L,30,12,1,5,10\n";
    // Only the current season is on disk for JJJ; LeBron has both.
    std::fs::write(root.join("gamelogs/2024-25/2544.csv"), lebron).unwrap();
    std::fs::write(root.join("gamelogs/2023-24/2544.csv"), lebron).unwrap();
    std::fs::write(root.join("gamelogs/2024-25/1628991.csv"), jjj).unwrap();

    let roster_feed = JsonRosterFeed::from_path(&root.join("league.json")).unwrap();
    let directory = PlayerDirectory::from_path(&root.join("players.csv")).unwrap();
    let stats_feed = CsvStatsFeed::new(root.join("gamelogs"));

    let cats = categories();
    let listings = roster_feed.players().await.unwrap();
    let mut players = pipeline::resolve_players(&directory, &listings).players;
    assert_eq!(players.len(), 2);

    let projector = PlayerProjector::new(&stats_feed, &cats, projection_settings());
    pipeline::project_players(&mut players, &projector, None, &CancelFlag::new())
        .await
        .unwrap();
    let mut teams = pipeline::aggregate_teams(
        &roster_feed,
        &players,
        &cats,
        &aggregation_settings(),
        &CancelFlag::new(),
    )
    .await
    .unwrap();
    pipeline::rank_categories(&mut teams, &cats);

    // A missing previous season leaves JJJ's current-season numbers as is.
    assert!((players[1].categories["PTS"].mean().unwrap() - 11.0).abs() < EPS);
    assert!((teams[0].categories["PTS"].mean().unwrap() - 3.5 * 33.0).abs() < EPS);
    assert_eq!(teams[0].rank("FG_PCT"), Some(1));

    let _ = std::fs::remove_dir_all(&root);
}
