use crate::analysis::league::{RosterAnalysis, RosterInfo, TransactionRow, TrendingRow, TrendingStatus};
use crate::analysis::recommender::Recommendation;
use crate::analysis::roster::NeedTier;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct RecommendationRow {
    rank: String,
    player: String,
    pos: String,
    team: String,
    score: String,
    #[tabled(rename = "avg pts")]
    avg_pts: String,
    recent: String,
    proj: String,
    need: String,
    status: String,
}

#[derive(Tabled)]
struct NeedRow {
    priority: String,
    positions: String,
}

#[derive(Tabled)]
struct CompositionRow {
    position: String,
    count: String,
    players: String,
}

#[derive(Tabled)]
struct TrendingTableRow {
    #[tabled(rename = "#")]
    number: String,
    player: String,
    position: String,
    team: String,
    status: String,
}

#[derive(Tabled)]
struct TransactionTableRow {
    #[tabled(rename = "type")]
    kind: String,
    player: String,
    position: String,
    team: String,
    user: String,
    when: String,
}

#[derive(Tabled)]
struct PresetRow {
    preset: String,
    description: String,
}

fn paint_tier(tier: NeedTier, text: &str) -> String {
    match tier {
        NeedTier::Critical => text.red().to_string(),
        NeedTier::Moderate => text.yellow().to_string(),
        NeedTier::Depth => text.green().to_string(),
        NeedTier::Luxury => text.dimmed().to_string(),
    }
}

fn colored_tier(tier: NeedTier) -> String {
    paint_tier(tier, tier.label())
}

fn section(title: String) {
    println!("\n{}", title.bold().cyan());
    println!("{}\n", "=".repeat(80).cyan());
}

pub fn display_banner(league_name: &str, league_id: &str, season: u16, week: u32) {
    section("🏈 Sleeper Waiver Wire Assistant".to_string());
    println!("League: {} ({})", league_name.bold(), league_id);
    println!("Season: {} | Week: {}", season, week);
}

pub fn display_recommendations(recommendations: &[Recommendation], username: &str) {
    section(format!("📋 Waiver Wire Recommendations for {}", username));

    if recommendations.is_empty() {
        println!("{}", "No recommendations found matching your criteria".yellow());
        return;
    }

    let rows: Vec<RecommendationRow> = recommendations
        .iter()
        .enumerate()
        .map(|(idx, rec)| {
            let player = &rec.scored.candidate.player;
            let profile = &rec.scored.candidate.profile;

            // Injury outranks the trending flag.
            let status = match (&player.injury_status, rec.scored.candidate.trending) {
                (Some(injury), _) => format!("⚠️ {}", injury).red().to_string(),
                (None, true) => "🔥 TRENDING".magenta().to_string(),
                (None, false) => String::new(),
            };

            RecommendationRow {
                rank: format!("{}", idx + 1),
                player: player.name.clone(),
                pos: player.position.to_string(),
                team: player.team.clone().unwrap_or_else(|| "FA".to_string()),
                score: format!("{:.1}", rec.adjusted_score),
                avg_pts: format!("{:.1}", profile.season_average),
                recent: format!("{:.1}", profile.recent_average),
                proj: format!("{:.1}", profile.projected_points),
                need: colored_tier(rec.need_tier),
                status,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Score: waiver score boosted by how badly your roster needs the position");
    println!("• Avg Pts / Recent: season average and last-3-games average");
    println!("• Proj: projected points for next week\n");
}

pub fn display_roster_analysis(username: &str, analysis: &RosterAnalysis) {
    section(format!("🧮 Roster Analysis for {}", username));

    let need_rows: Vec<NeedRow> = analysis
        .need
        .tiers()
        .iter()
        .filter(|(_, positions)| !positions.is_empty())
        .map(|(tier, positions)| NeedRow {
            priority: paint_tier(*tier, &tier.label().to_uppercase()),
            positions: positions.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", "),
        })
        .collect();

    if need_rows.is_empty() {
        println!("{}", "No positional needs, roster is at or above target everywhere".green());
    } else {
        let mut table = Table::new(need_rows);
        table.with(Style::blank());
        println!("{}", table);
    }

    println!("\n{}", "Current Roster Composition:".bold());
    let composition: Vec<CompositionRow> = analysis
        .position_players
        .iter()
        .map(|(position, players)| {
            let names: Vec<String> = players
                .iter()
                .take(5)
                .map(|p| match &p.injury_status {
                    Some(injury) => format!("{} {}", p.name, format!("({})", injury).red()),
                    None => p.name.clone(),
                })
                .collect();

            CompositionRow {
                position: position.to_string(),
                count: players.len().to_string(),
                players: names.join(", "),
            }
        })
        .collect();

    let mut table = Table::new(composition);
    table.with(Style::blank());
    println!("{}", table);
}

pub fn display_trending_players(rows: &[TrendingRow]) {
    if rows.is_empty() {
        return;
    }

    section("🔥 Trending Players (Last 24 Hours)".to_string());

    let table_rows: Vec<TrendingTableRow> = rows
        .iter()
        .map(|row| TrendingTableRow {
            number: row.rank.to_string(),
            player: row.name.clone(),
            position: row
                .position
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            team: row.team.clone().unwrap_or_else(|| "FA".to_string()),
            status: match &row.status {
                TrendingStatus::Available => "Available".green().to_string(),
                TrendingStatus::Rostered => "Rostered".red().to_string(),
                TrendingStatus::Injured(injury) => injury.yellow().to_string(),
            },
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_transactions(rows: &[TransactionRow]) {
    if rows.is_empty() {
        return;
    }

    section("🔁 Recent League Transactions".to_string());

    let table_rows: Vec<TransactionTableRow> = rows
        .iter()
        .map(|row| TransactionTableRow {
            kind: "ADD".green().to_string(),
            player: row.player.clone(),
            position: row.position.as_ref().map(|p| p.to_string()).unwrap_or_default(),
            team: row.team.clone().unwrap_or_else(|| "FA".to_string()),
            user: row.user.clone(),
            when: row.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_presets(presets: &[(String, String)]) {
    section("⚙️ Available Scoring Presets".to_string());

    let rows: Vec<PresetRow> = presets
        .iter()
        .map(|(preset, description)| PresetRow {
            preset: preset.clone(),
            description: description.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_user_choices(rosters: &[RosterInfo]) {
    println!("\n{}", "Select a team to analyze:".bold());
    for (idx, roster) in rosters.iter().enumerate() {
        println!("  {}. {}", idx + 1, roster.username);
    }
}

pub fn display_footer() {
    println!(
        "\n{}",
        "Recommendations based on recent performance, projections, and roster needs".dimmed()
    );
    println!(
        "{}",
        "Cache expires after 24 hours for league data, 1 hour for roster data".dimmed()
    );
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message);
}
