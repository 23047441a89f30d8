use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    Qb,
    Rb,
    Wr,
    Te,
    K,
    Def,
    Other(String),
}

impl Position {
    pub fn as_str(&self) -> &str {
        match self {
            Position::Qb => "QB",
            Position::Rb => "RB",
            Position::Wr => "WR",
            Position::Te => "TE",
            Position::K => "K",
            Position::Def => "DEF",
            Position::Other(raw) => raw,
        }
    }
}

impl From<&str> for Position {
    fn from(raw: &str) -> Self {
        match raw {
            "QB" => Position::Qb,
            "RB" => Position::Rb,
            "WR" => Position::Wr,
            "TE" => Position::Te,
            "K" => Position::K,
            "DEF" => Position::Def,
            other => Position::Other(other.to_string()),
        }
    }
}

impl From<String> for Position {
    fn from(raw: String) -> Self {
        Position::from(raw.as_str())
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.as_str().to_string()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target head count per tracked position.
pub const IDEAL_ROSTER: [(Position, usize); 6] = [
    (Position::Qb, 2),
    (Position::Rb, 5),
    (Position::Wr, 5),
    (Position::Te, 2),
    (Position::K, 1),
    (Position::Def, 1),
];

/// How badly a roster needs help at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedTier {
    /// Two or more short of the target.
    Critical,
    /// One short of the target.
    Moderate,
    /// At target at a high-churn position (RB, WR).
    Depth,
    /// Everything else.
    Luxury,
}

impl NeedTier {
    pub fn boost(&self) -> f64 {
        match self {
            NeedTier::Critical => 1.5,
            NeedTier::Moderate => 1.2,
            NeedTier::Depth => 1.0,
            NeedTier::Luxury => 1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NeedTier::Critical => "critical",
            NeedTier::Moderate => "moderate",
            NeedTier::Depth => "depth",
            NeedTier::Luxury => "luxury",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RosterNeed {
    pub critical: Vec<Position>,
    pub moderate: Vec<Position>,
    pub depth: Vec<Position>,
}

impl RosterNeed {
    /// First matching tier in priority order, luxury when none match.
    pub fn tier(&self, position: &Position) -> NeedTier {
        if self.critical.contains(position) {
            NeedTier::Critical
        } else if self.moderate.contains(position) {
            NeedTier::Moderate
        } else if self.depth.contains(position) {
            NeedTier::Depth
        } else {
            NeedTier::Luxury
        }
    }

    pub fn tiers(&self) -> [(NeedTier, &[Position]); 3] {
        [
            (NeedTier::Critical, self.critical.as_slice()),
            (NeedTier::Moderate, self.moderate.as_slice()),
            (NeedTier::Depth, self.depth.as_slice()),
        ]
    }
}

pub struct NeedAnalyzer;

impl NeedAnalyzer {
    pub fn classify(position: &Position, deficit: i64) -> NeedTier {
        match deficit {
            d if d > 1 => NeedTier::Critical,
            1 => NeedTier::Moderate,
            0 if matches!(position, Position::Rb | Position::Wr) => NeedTier::Depth,
            _ => NeedTier::Luxury,
        }
    }

    pub fn position_counts<'a, I>(positions: I) -> BTreeMap<Position, usize>
    where
        I: IntoIterator<Item = &'a Position>,
    {
        let mut counts = BTreeMap::new();
        for position in positions {
            *counts.entry(position.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn analyze<'a, I>(positions: I) -> RosterNeed
    where
        I: IntoIterator<Item = &'a Position>,
    {
        let counts = Self::position_counts(positions);
        let mut need = RosterNeed::default();

        for (position, ideal) in IDEAL_ROSTER.iter() {
            let current = counts.get(position).copied().unwrap_or(0);
            let deficit = *ideal as i64 - current as i64;

            match Self::classify(position, deficit) {
                NeedTier::Critical => need.critical.push(position.clone()),
                NeedTier::Moderate => need.moderate.push(position.clone()),
                NeedTier::Depth => need.depth.push(position.clone()),
                NeedTier::Luxury => {}
            }
        }

        need
    }
}
