use super::roster::{NeedTier, Position, RosterNeed};
use super::round2;
use super::waiver_scorer::ScoredCandidate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub scored: ScoredCandidate,
    pub need_tier: NeedTier,
    pub adjusted_score: f64,
}

impl Recommendation {
    pub fn new(scored: ScoredCandidate, need_tier: NeedTier) -> Self {
        let adjusted_score = round2(scored.waiver_score() * need_tier.boost());
        Recommendation {
            scored,
            need_tier,
            adjusted_score,
        }
    }
}

pub struct RecommendationRanker;

impl RecommendationRanker {
    /// Boost each candidate by how badly the roster needs its position, then
    /// keep the best `top_n`. Equal scores keep their input order.
    pub fn rank(
        candidates: &[ScoredCandidate],
        need: &RosterNeed,
        top_n: usize,
        position_filter: Option<&Position>,
    ) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = candidates
            .iter()
            .filter(|c| position_filter.map_or(true, |pos| c.position() == pos))
            .map(|c| Recommendation::new(c.clone(), need.tier(c.position())))
            .collect();

        recommendations.sort_by(|a, b| {
            b.adjusted_score
                .partial_cmp(&a.adjusted_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        recommendations.truncate(top_n);

        recommendations
    }
}
