use super::roster::{NeedAnalyzer, Position, RosterNeed};
use super::waiver_scorer::PlayerIdentity;
use crate::api::models::{League, LeagueUser, PlayerDirectory, Roster, Transaction, TrendingPlayer};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

const UNRANKED: u32 = 99_999;
const NO_WAIVER_POSITION: u32 = 999;

#[derive(Debug, Clone)]
pub struct RosterInfo {
    pub owner_id: String,
    pub username: String,
    pub roster_id: u32,
    pub players: Vec<String>,
    pub starters: Vec<String>,
    pub reserve: Vec<String>,
    pub taxi: Vec<String>,
    pub waiver_position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailablePlayer {
    pub identity: PlayerIdentity,
    pub fantasy_positions: Vec<Position>,
    pub depth_chart_order: Option<u32>,
    pub search_rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosteredPlayer {
    pub name: String,
    pub team: Option<String>,
    pub injury_status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterAnalysis {
    pub need: RosterNeed,
    pub position_counts: BTreeMap<Position, usize>,
    pub position_players: BTreeMap<Position, Vec<RosteredPlayer>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub player: String,
    pub position: Option<Position>,
    pub team: Option<String>,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendingStatus {
    Available,
    Rostered,
    Injured(String),
}

#[derive(Debug, Clone)]
pub struct TrendingRow {
    pub rank: usize,
    pub name: String,
    pub position: Option<Position>,
    pub team: Option<String>,
    pub status: TrendingStatus,
}

/// League-wide view: who owns whom, who is still on the wire.
pub struct LeagueAnalyzer {
    league: League,
    players: PlayerDirectory,
    rosters: Vec<RosterInfo>,
    rostered: HashSet<String>,
}

impl LeagueAnalyzer {
    pub fn new(league: League, rosters: Vec<Roster>, users: Vec<LeagueUser>, players: PlayerDirectory) -> Self {
        let user_map: HashMap<String, String> = users
            .into_iter()
            .map(|u| (u.user_id, u.display_name))
            .collect();

        let mut rostered = HashSet::new();
        let rosters: Vec<RosterInfo> = rosters
            .into_iter()
            .map(|roster| {
                let owner_id = roster.owner_id.unwrap_or_default();
                let players = roster.players.unwrap_or_default();
                rostered.extend(players.iter().cloned());

                RosterInfo {
                    username: user_map
                        .get(&owner_id)
                        .cloned()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    owner_id,
                    roster_id: roster.roster_id,
                    players,
                    starters: roster.starters.unwrap_or_default(),
                    reserve: roster.reserve.unwrap_or_default(),
                    taxi: roster.taxi.unwrap_or_default(),
                    waiver_position: roster.settings.waiver_position,
                }
            })
            .collect();

        LeagueAnalyzer {
            league,
            players,
            rosters,
            rostered,
        }
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    pub fn players(&self) -> &PlayerDirectory {
        &self.players
    }

    pub fn rosters(&self) -> &[RosterInfo] {
        &self.rosters
    }

    pub fn is_rostered(&self, player_id: &str) -> bool {
        self.rostered.contains(player_id)
    }

    pub fn roster_for(&self, owner_id: &str) -> Option<&RosterInfo> {
        self.rosters.iter().find(|r| r.owner_id == owner_id)
    }

    pub fn find_user(&self, username: &str) -> Option<&RosterInfo> {
        let wanted = username.to_lowercase();
        self.rosters.iter().find(|r| r.username.to_lowercase() == wanted)
    }

    fn identity(&self, player_id: &str) -> Option<PlayerIdentity> {
        let record = self.players.get(player_id)?;
        Some(PlayerIdentity {
            player_id: player_id.to_string(),
            name: record.full_name(),
            position: record.position.clone().unwrap_or_else(|| Position::from("")),
            team: record.team.clone(),
            injury_status: record.injury_status.clone(),
        })
    }

    /// Active, unrostered players, best search rank first.
    pub fn available_players(&self, position: Option<&Position>) -> Vec<AvailablePlayer> {
        let mut available: Vec<AvailablePlayer> = self
            .players
            .iter()
            .filter(|(id, _)| !self.rostered.contains(id.as_str()))
            .filter(|(_, record)| record.is_active())
            .filter(|(_, record)| match position {
                Some(pos) => record
                    .fantasy_positions
                    .as_ref()
                    .map(|fp| fp.contains(pos))
                    .unwrap_or(false),
                None => true,
            })
            .filter_map(|(id, record)| {
                Some(AvailablePlayer {
                    identity: self.identity(id)?,
                    fantasy_positions: record.fantasy_positions.clone().unwrap_or_default(),
                    depth_chart_order: record.depth_chart_order,
                    search_rank: record.search_rank.unwrap_or(UNRANKED),
                })
            })
            .collect();

        // Directory order is a hash order; break rank ties by id so runs repeat.
        available.sort_by(|a, b| {
            a.search_rank
                .cmp(&b.search_rank)
                .then_with(|| a.identity.player_id.cmp(&b.identity.player_id))
        });
        available
    }

    pub fn analyze_roster(&self, owner_id: &str) -> Option<RosterAnalysis> {
        let roster = self.roster_for(owner_id)?;

        let mut position_players: BTreeMap<Position, Vec<RosteredPlayer>> = BTreeMap::new();
        let mut positions = Vec::new();

        for player_id in &roster.players {
            let Some(record) = self.players.get(player_id) else {
                continue;
            };
            let Some(position) = record.position.clone() else {
                continue;
            };

            position_players
                .entry(position.clone())
                .or_default()
                .push(RosteredPlayer {
                    name: record.full_name(),
                    team: record.team.clone(),
                    injury_status: record.injury_status.clone(),
                });
            positions.push(position);
        }

        Some(RosterAnalysis {
            need: NeedAnalyzer::analyze(&positions),
            position_counts: NeedAnalyzer::position_counts(&positions),
            position_players,
        })
    }

    pub fn waiver_priority(&self) -> Vec<(String, u32)> {
        let mut priority: Vec<(String, u32)> = self
            .rosters
            .iter()
            .map(|r| (r.username.clone(), r.waiver_position.unwrap_or(NO_WAIVER_POSITION)))
            .collect();
        priority.sort_by_key(|(_, position)| *position);
        priority
    }

    /// Pickups (waiver claims and free-agent adds) among the first `limit`
    /// transactions, newest first.
    pub fn recent_transactions(&self, transactions: &[Transaction], limit: usize) -> Vec<TransactionRow> {
        let owner_by_roster: HashMap<u32, &str> = self
            .rosters
            .iter()
            .map(|r| (r.roster_id, r.username.as_str()))
            .collect();

        let mut rows: Vec<TransactionRow> = transactions
            .iter()
            .take(limit)
            .filter(|txn| txn.is_pickup())
            .flat_map(|txn| {
                let timestamp = Utc
                    .timestamp_millis_opt(txn.created)
                    .single()
                    .unwrap_or_default();

                txn.adds
                    .iter()
                    .flatten()
                    .map(move |(player_id, roster_id)| (player_id, *roster_id, timestamp))
            })
            .map(|(player_id, roster_id, timestamp)| {
                let record = self.players.get(player_id);
                TransactionRow {
                    player: record.map(|p| p.full_name()).unwrap_or_default(),
                    position: record.and_then(|p| p.position.clone()),
                    team: record.and_then(|p| p.team.clone()),
                    user: owner_by_roster
                        .get(&roster_id)
                        .map(|name| name.to_string())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    timestamp,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows
    }

    pub fn trending_rows(&self, trending: &[TrendingPlayer], limit: usize) -> Vec<TrendingRow> {
        trending
            .iter()
            .take(limit)
            .enumerate()
            .filter_map(|(idx, t)| {
                let record = self.players.get(&t.player_id)?;
                let status = if self.is_rostered(&t.player_id) {
                    TrendingStatus::Rostered
                } else if let Some(injury) = &record.injury_status {
                    TrendingStatus::Injured(injury.clone())
                } else {
                    TrendingStatus::Available
                };

                Some(TrendingRow {
                    rank: idx + 1,
                    name: record.full_name(),
                    position: record.position.clone(),
                    team: record.team.clone(),
                    status,
                })
            })
            .collect()
    }
}
