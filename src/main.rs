use clap::Parser;
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, info, warn};

use waiver_wire::analysis::league::LeagueAnalyzer;
use waiver_wire::analysis::performance::PerformanceAggregator;
use waiver_wire::analysis::recommender::RecommendationRanker;
use waiver_wire::analysis::roster::Position;
use waiver_wire::analysis::scoring::{OverrideStore, PresetCatalog, ScoringResolver, StatSnapshot};
use waiver_wire::analysis::waiver_scorer::{PlayerIdentity, WaiverScorer};
use waiver_wire::api::client::SleeperClient;
use waiver_wire::api::models::{League, LeagueUser, PlayerDirectory, Roster, Transaction, TrendingPlayer};
use waiver_wire::cache::ResponseCache;
use waiver_wire::config::Config;
use waiver_wire::display::output::*;
use waiver_wire::error::AppError;
use waiver_wire::logging;

/// Waiver pool considered per run, in search-rank order.
const CANDIDATE_POOL: usize = 200;
const STATS_LOOKBACK_WEEKS: u32 = 5;
const TRENDING_DISPLAY_LIMIT: usize = 15;
const TRANSACTION_LIMIT: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "Waiver Wire")]
#[command(about = "Sleeper fantasy football waiver wire assistant", long_about = None)]
struct Args {
    /// Sleeper league ID (default: LEAGUE_ID from .env)
    #[arg(long)]
    league_id: Option<String>,

    /// NFL season (default: SEASON from .env, else 2024)
    #[arg(long)]
    season: Option<u16>,

    /// Current NFL week (default: CURRENT_WEEK from .env, else 1)
    #[arg(long)]
    week: Option<u32>,

    /// Username to analyze (prompts when omitted)
    #[arg(long)]
    user: Option<String>,

    /// Only recommend players at this position
    #[arg(long, value_parser = ["QB", "RB", "WR", "TE", "K", "DEF"])]
    position: Option<String>,

    /// Number of recommendations (default: 15)
    #[arg(short, long, default_value = "15")]
    top: usize,

    /// Clear the response cache before running
    #[arg(long)]
    clear_cache: bool,

    /// Scoring preset to use (see --list-presets)
    #[arg(long)]
    scoring: Option<String>,

    /// Don't infer scoring from the league's settings
    #[arg(long)]
    ignore_league_scoring: bool,

    /// Save the resolved scoring table as the custom override
    #[arg(long)]
    save_scoring: bool,

    /// List scoring presets and exit
    #[arg(long)]
    list_presets: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

struct LeagueData {
    league: League,
    rosters: Vec<Roster>,
    users: Vec<LeagueUser>,
    players: PlayerDirectory,
    trending: Vec<TrendingPlayer>,
    weekly_stats: Vec<StatSnapshot>,
    projections: StatSnapshot,
    transactions: Vec<Transaction>,
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = run(args) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = Config::from_env()?;
    let catalog = PresetCatalog::load(&config.presets_path)?;

    if args.list_presets {
        display_presets(&catalog.list_presets());
        return Ok(());
    }

    let league_id = args.league_id.clone().or(config.league_id.clone()).ok_or_else(|| {
        AppError::ConfigError(
            "League ID is required. Set via --league-id or LEAGUE_ID in .env file".to_string(),
        )
    })?;
    let season = args.season.unwrap_or(config.season);
    let week = args.week.unwrap_or(config.current_week);

    let client = SleeperClient::new(ResponseCache::open(&config.cache_dir)?);
    if args.clear_cache {
        let removed = client.clear_cache()?;
        display_success(&format!("Cache cleared! ({} entries)", removed));
    }

    let data = fetch_league_data(&client, &league_id, season, week)?;
    display_banner(&data.league.name, &league_id, season, week);

    // The override file is read once here; resolution itself is pure.
    let override_store = OverrideStore::new(&config.scoring_override_path);
    let resolver = ScoringResolver::new(catalog, override_store.load()?);
    let (scoring, source) = resolver.resolve_with_source(
        args.scoring.as_deref(),
        &data.league.scoring_settings,
        !args.ignore_league_scoring,
    )?;
    display_info(&format!("Scoring: {}", source.describe()));

    if args.save_scoring {
        override_store.save(&scoring)?;
        display_success(&format!(
            "Custom scoring settings saved to {}",
            override_store.path().display()
        ));
    }

    let analyzer = LeagueAnalyzer::new(data.league, data.rosters, data.users, data.players);
    let owner_id = select_user(&analyzer, args.user.as_deref())?;
    let username = analyzer
        .roster_for(&owner_id)
        .map(|r| r.username.clone())
        .unwrap_or_else(|| owner_id.clone());

    let analysis = analyzer
        .analyze_roster(&owner_id)
        .ok_or_else(|| AppError::UserNotFound(username.clone()))?;
    display_roster_analysis(&username, &analysis);

    let position = args.position.as_deref().map(Position::from);

    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Analyzing available players...");

    let candidates: Vec<PlayerIdentity> = analyzer
        .available_players(position.as_ref())
        .into_iter()
        .take(CANDIDATE_POOL)
        .map(|p| p.identity)
        .collect();
    info!("Scoring {} waiver candidates", candidates.len());

    pb.set_message("Scoring waiver candidates...");
    let trending_ids: HashSet<String> = data.trending.iter().map(|t| t.player_id.clone()).collect();
    let aggregator = PerformanceAggregator::new(&scoring);
    let scored = WaiverScorer::default().score_candidates(
        &candidates,
        &aggregator,
        &data.weekly_stats,
        &data.projections,
        &trending_ids,
    );

    pb.set_message("Generating recommendations...");
    let recommendations =
        RecommendationRanker::rank(&scored, &analysis.need, args.top, position.as_ref());
    pb.finish_and_clear();

    display_recommendations(&recommendations, &username);

    if position.is_none() {
        display_trending_players(&analyzer.trending_rows(&data.trending, TRENDING_DISPLAY_LIMIT));
    }
    display_transactions(&analyzer.recent_transactions(&data.transactions, TRANSACTION_LIMIT));
    display_footer();

    Ok(())
}

fn fetch_league_data(
    client: &SleeperClient,
    league_id: &str,
    season: u16,
    week: u32,
) -> Result<LeagueData, AppError> {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Fetching league data...");
    let league = client.get_league(league_id)?;

    pb.set_message("Fetching rosters...");
    let rosters = client.get_rosters(league_id)?;

    pb.set_message("Fetching users...");
    let users = client.get_users(league_id)?;

    pb.set_message("Fetching all players (this may take a moment)...");
    let players = client.get_all_players()?;

    pb.set_message("Fetching trending players...");
    let trending = client.get_trending_players().unwrap_or_else(|e| {
        warn!("Trending players unavailable: {}", e);
        Vec::new()
    });

    let first_week = week.saturating_sub(STATS_LOOKBACK_WEEKS).max(1);
    let mut weekly_stats = Vec::new();
    for w in first_week..=week {
        pb.set_message(format!("Fetching stats for week {}...", w));
        match client.get_stats(season, w) {
            Ok(stats) if !stats.is_empty() => weekly_stats.push(stats),
            Ok(_) => debug!("No stats recorded for week {}", w),
            Err(e) => warn!("Skipping stats for week {}: {}", w, e),
        }
    }

    pb.set_message(format!("Fetching projections for week {}...", week + 1));
    let projections = client.get_projections(season, week + 1).unwrap_or_else(|e| {
        warn!("Projections for week {} unavailable: {}", week + 1, e);
        StatSnapshot::new()
    });

    pb.set_message("Fetching recent transactions...");
    let transactions = client.get_transactions(league_id, week).unwrap_or_else(|e| {
        warn!("Transactions for week {} unavailable: {}", week, e);
        Vec::new()
    });

    pb.finish_with_message("✓ League data fetched");

    Ok(LeagueData {
        league,
        rosters,
        users,
        players,
        trending,
        weekly_stats,
        projections,
        transactions,
    })
}

/// Resolve the team to analyze, by name or by prompting.
fn select_user(analyzer: &LeagueAnalyzer, username: Option<&str>) -> Result<String, AppError> {
    if let Some(name) = username {
        return match analyzer.find_user(name) {
            Some(roster) => Ok(roster.owner_id.clone()),
            None => {
                display_warning("Available users:");
                for roster in analyzer.rosters() {
                    println!("  - {}", roster.username);
                }
                Err(AppError::UserNotFound(name.to_string()))
            }
        };
    }

    let rosters = analyzer.rosters();
    display_user_choices(rosters);
    print!("Enter number [1]: ");
    io::stdout()
        .flush()
        .map_err(|e| AppError::InvalidSelection(e.to_string()))?;

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(|e| AppError::InvalidSelection(e.to_string()))?;

    let input = input.trim();
    let selection = if input.is_empty() {
        1
    } else {
        input
            .parse::<usize>()
            .map_err(|_| AppError::InvalidSelection(input.to_string()))?
    };

    selection
        .checked_sub(1)
        .and_then(|idx| rosters.get(idx))
        .map(|roster| roster.owner_id.clone())
        .ok_or_else(|| AppError::InvalidSelection(selection.to_string()))
}
