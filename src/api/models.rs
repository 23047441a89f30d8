use crate::analysis::roster::Position;
use crate::analysis::scoring::ScoringTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// GET /league/{league_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub league_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub total_rosters: u32,
    #[serde(default)]
    pub scoring_settings: ScoringTable,
    #[serde(default)]
    pub roster_positions: Vec<String>,
}

// GET /league/{league_id}/rosters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(default)]
    pub starters: Option<Vec<String>>,
    #[serde(default)]
    pub reserve: Option<Vec<String>>,
    #[serde(default)]
    pub taxi: Option<Vec<String>>,
    #[serde(default)]
    pub settings: RosterSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSettings {
    #[serde(default)]
    pub waiver_position: Option<u32>,
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub losses: Option<u32>,
}

// GET /league/{league_id}/users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
}

// GET /players/nfl, keyed by player id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub fantasy_positions: Option<Vec<Position>>,
    #[serde(default)]
    pub injury_status: Option<String>,
    #[serde(default)]
    pub search_rank: Option<u32>,
    #[serde(default)]
    pub depth_chart_order: Option<u32>,
}

impl PlayerRecord {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    pub fn is_active(&self) -> bool {
        self.active == Some(true)
    }
}

pub type PlayerDirectory = HashMap<String, PlayerRecord>;

// GET /players/nfl/trending/add
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingPlayer {
    pub player_id: String,
    #[serde(default)]
    pub count: u32,
}

// GET /league/{league_id}/transactions/{week}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    /// Player id -> roster id that picked the player up.
    #[serde(default)]
    pub adds: Option<HashMap<String, u32>>,
    #[serde(default)]
    pub drops: Option<HashMap<String, u32>>,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub created: i64,
}

impl Transaction {
    pub fn is_pickup(&self) -> bool {
        matches!(self.kind.as_str(), "waiver" | "free_agent")
    }
}
