use super::performance::{PerformanceAggregator, PerformanceProfile};
use super::roster::Position;
use super::round2;
use super::scoring::StatSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Consistency sits in roughly [0, 1]; scale it onto the same footing as points.
const CONSISTENCY_SCALE: f64 = 10.0;
/// Flat bonus for a player being added league-wide right now.
const TRENDING_BONUS: f64 = 5.0;
const MOMENTUM_PER_TREND_POINT: f64 = 0.1;
const MOMENTUM_CAP: f64 = 0.3;

/// Blend weights for the composite waiver score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub recent_performance: f64,
    pub season_average: f64,
    pub projections: f64,
    pub consistency: f64,
    pub trending: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            recent_performance: 0.35,
            season_average: 0.20,
            projections: 0.25,
            consistency: 0.10,
            trending: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    pub team: Option<String>,
    pub injury_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaiverCandidate {
    pub player: PlayerIdentity,
    pub profile: PerformanceProfile,
    pub trending: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CompositeScore {
    pub recent: f64,
    pub average: f64,
    pub projected: f64,
    pub consistency: f64,
    pub trending: f64,
    pub waiver_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: WaiverCandidate,
    pub score: CompositeScore,
}

impl ScoredCandidate {
    pub fn position(&self) -> &Position {
        &self.candidate.player.position
    }

    pub fn waiver_score(&self) -> f64 {
        self.score.waiver_score
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaiverScorer {
    weights: ScoreWeights,
}

impl WaiverScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        WaiverScorer { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Capped bonus for players on an upswing. Flat or falling form is left alone.
    pub fn momentum_multiplier(trend: f64) -> f64 {
        if trend > 0.0 {
            1.0 + (trend * MOMENTUM_PER_TREND_POINT).min(MOMENTUM_CAP)
        } else {
            1.0
        }
    }

    /// Composite score:
    /// - 0.35 × recent average
    /// - 0.20 × season average
    /// - 0.25 × projected points
    /// - 0.10 × consistency (scaled ×10)
    /// - 0.10 × trending bonus
    ///
    /// then the momentum multiplier. A player with no games scores exactly 0.
    pub fn score(
        &self,
        player: &PlayerIdentity,
        profile: &PerformanceProfile,
        trending: &HashSet<String>,
    ) -> CompositeScore {
        if profile.games_played == 0 {
            return CompositeScore::default();
        }

        let w = &self.weights;
        let is_trending = trending.contains(&player.player_id);

        let recent = profile.recent_average * w.recent_performance;
        let average = profile.season_average * w.season_average;
        let projected = profile.projected_points * w.projections;
        let consistency = profile.consistency * CONSISTENCY_SCALE * w.consistency;
        let trending_part = if is_trending { TRENDING_BONUS * w.trending } else { 0.0 };

        let blended = recent + average + projected + consistency + trending_part;
        let waiver_score = round2(blended * Self::momentum_multiplier(profile.trend));

        CompositeScore {
            recent,
            average,
            projected,
            consistency,
            trending: trending_part,
            waiver_score,
        }
    }

    /// Profile and score every player, best first. Players without history
    /// stay in the list with a zero score.
    pub fn score_candidates(
        &self,
        players: &[PlayerIdentity],
        aggregator: &PerformanceAggregator<'_>,
        weekly_stats: &[StatSnapshot],
        projections: &StatSnapshot,
        trending: &HashSet<String>,
    ) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = players
            .iter()
            .map(|player| {
                let profile = aggregator.profile(&player.player_id, weekly_stats, projections);
                let score = self.score(player, &profile, trending);
                ScoredCandidate {
                    candidate: WaiverCandidate {
                        player: player.clone(),
                        trending: trending.contains(&player.player_id),
                        profile,
                    },
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.waiver_score()
                .partial_cmp(&a.waiver_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        scored
    }
}
