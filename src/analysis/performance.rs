use super::round2;
use super::scoring::{ScoringTable, StatSnapshot};
use serde::Serialize;

const RECENT_WINDOW: usize = 3;
const MIN_TREND_POINTS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceProfile {
    pub player_id: String,
    pub points_history: Vec<f64>, // chronological, one entry per week played
    pub season_average: f64,
    pub recent_average: f64,
    pub consistency: f64,
    pub trend: f64,
    pub games_played: usize,
    pub projected_points: f64,
}

impl PerformanceProfile {
    pub fn empty(player_id: &str) -> Self {
        PerformanceProfile {
            player_id: player_id.to_string(),
            ..Default::default()
        }
    }
}

/// Turns weekly stat snapshots into per-player performance profiles under
/// one scoring table.
pub struct PerformanceAggregator<'a> {
    scoring: &'a ScoringTable,
}

impl<'a> PerformanceAggregator<'a> {
    pub fn new(scoring: &'a ScoringTable) -> Self {
        PerformanceAggregator { scoring }
    }

    pub fn scoring(&self) -> &ScoringTable {
        self.scoring
    }

    /// Weeks where the player has no stat line are skipped entirely; a bye or
    /// a healthy scratch is not a zero-point game.
    pub fn points_history(&self, player_id: &str, weekly_stats: &[StatSnapshot]) -> Vec<f64> {
        weekly_stats
            .iter()
            .filter_map(|week| week.get(player_id))
            .map(|stats| self.scoring.fantasy_points(stats))
            .collect()
    }

    pub fn profile(
        &self,
        player_id: &str,
        weekly_stats: &[StatSnapshot],
        projections: &StatSnapshot,
    ) -> PerformanceProfile {
        let history = self.points_history(player_id, weekly_stats);
        if history.is_empty() {
            return PerformanceProfile::empty(player_id);
        }

        let season_average = mean(&history);
        let recent = &history[history.len() - history.len().min(RECENT_WINDOW)..];
        let recent_average = mean(recent);

        // +1 keeps the ratio finite and damps the metric for low scorers.
        // Not clamped: very volatile low scorers can go negative.
        let consistency = if season_average > 0.0 {
            1.0 - population_std_dev(&history, season_average) / (season_average + 1.0)
        } else {
            0.0
        };

        let trend = if history.len() >= MIN_TREND_POINTS {
            least_squares_slope(&history)
        } else {
            0.0
        };

        let projected_points = projections
            .get(player_id)
            .map(|stats| self.scoring.fantasy_points(stats))
            .unwrap_or(0.0);

        PerformanceProfile {
            player_id: player_id.to_string(),
            games_played: history.len(),
            season_average: round2(season_average),
            recent_average: round2(recent_average),
            consistency: round2(consistency),
            trend: round2(trend),
            projected_points: round2(projected_points),
            points_history: history,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Slope of the ordinary least-squares fit of value against index.
fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);

    let (covariance, variance) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(cov, var), (i, y)| {
            let dx = i as f64 - x_mean;
            (cov + dx * (y - y_mean), var + dx * dx)
        });

    if variance == 0.0 {
        0.0
    } else {
        covariance / variance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::scoring::StatRecord;

    /// One point per rushing yard keeps the arithmetic readable.
    fn yard_table() -> ScoringTable {
        ScoringTable::new().with("pts_rush_yd", 1.0)
    }

    fn weeks(player_id: &str, points: &[Option<f64>]) -> Vec<StatSnapshot> {
        points
            .iter()
            .map(|p| {
                let mut week = StatSnapshot::new();
                week.insert("filler".to_string(), StatRecord::new().with("rush_yd", 3.0));
                if let Some(yards) = p {
                    week.insert(player_id.to_string(), StatRecord::new().with("rush_yd", *yards));
                }
                week
            })
            .collect()
    }

    #[test]
    fn test_rising_history_profile() {
        let table = yard_table();
        let aggregator = PerformanceAggregator::new(&table);
        let stats = weeks("4046", &[Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);

        let profile = aggregator.profile("4046", &stats, &StatSnapshot::new());

        assert_eq!(profile.games_played, 4);
        assert_eq!(profile.season_average, 25.0);
        assert_eq!(profile.recent_average, 30.0);
        assert_eq!(profile.trend, 10.0);
        // 1 - sqrt(125) / 26
        assert_eq!(profile.consistency, 0.57);
        assert_eq!(profile.projected_points, 0.0);
        assert_eq!(profile.points_history, vec![10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_missing_weeks_are_not_zero_games() {
        let table = yard_table();
        let aggregator = PerformanceAggregator::new(&table);
        let stats = weeks("4046", &[Some(12.0), None, Some(8.0), None, None, Some(10.0)]);

        let profile = aggregator.profile("4046", &stats, &StatSnapshot::new());

        assert_eq!(profile.games_played, 3);
        assert!(profile.games_played <= stats.len());
        assert_eq!(profile.season_average, 10.0);
        assert_eq!(profile.points_history, vec![12.0, 8.0, 10.0]);
    }

    #[test]
    fn test_no_history_gives_empty_profile() {
        let table = yard_table();
        let aggregator = PerformanceAggregator::new(&table);
        let stats = weeks("4046", &[None, None]);
        let mut projections = StatSnapshot::new();
        projections.insert("4046".to_string(), StatRecord::new().with("rush_yd", 55.0));

        let profile = aggregator.profile("4046", &stats, &projections);

        assert_eq!(profile, PerformanceProfile::empty("4046"));
        assert_eq!(profile.games_played, 0);
    }

    #[test]
    fn test_short_history_has_no_trend() {
        let table = yard_table();
        let aggregator = PerformanceAggregator::new(&table);

        for history in [vec![Some(5.0)], vec![Some(5.0), Some(25.0)]] {
            let stats = weeks("1", &history);
            let profile = aggregator.profile("1", &stats, &StatSnapshot::new());
            assert_eq!(profile.trend, 0.0);
        }
    }

    #[test]
    fn test_recent_average_uses_last_three() {
        let table = yard_table();
        let aggregator = PerformanceAggregator::new(&table);
        let stats = weeks("1", &[Some(10.0), Some(0.0), Some(20.0), Some(5.0)]);

        let profile = aggregator.profile("1", &stats, &StatSnapshot::new());
        assert_eq!(profile.recent_average, 8.33);
        assert_eq!(profile.season_average, 8.75);

        let stats = weeks("1", &[Some(7.0), Some(9.0)]);
        let profile = aggregator.profile("1", &stats, &StatSnapshot::new());
        assert_eq!(profile.recent_average, 8.0);
    }

    #[test]
    fn test_falling_trend_is_negative() {
        let table = yard_table();
        let aggregator = PerformanceAggregator::new(&table);
        let stats = weeks("1", &[Some(30.0), Some(20.0), Some(10.0)]);

        let profile = aggregator.profile("1", &stats, &StatSnapshot::new());
        assert_eq!(profile.trend, -10.0);
    }

    #[test]
    fn test_zero_average_has_zero_consistency() {
        let table = yard_table();
        let aggregator = PerformanceAggregator::new(&table);
        let stats = weeks("1", &[Some(0.0), Some(0.0), Some(0.0)]);

        let profile = aggregator.profile("1", &stats, &StatSnapshot::new());
        assert_eq!(profile.games_played, 3);
        assert_eq!(profile.consistency, 0.0);
        assert_eq!(profile.trend, 0.0);
    }

    #[test]
    fn test_volatile_low_scorer_consistency_goes_negative() {
        let table = yard_table();
        let aggregator = PerformanceAggregator::new(&table);
        let stats = weeks("1", &[Some(-6.0), Some(0.0), Some(8.0)]);

        let profile = aggregator.profile("1", &stats, &StatSnapshot::new());
        // mean 0.67, population std ~5.73
        assert!(profile.consistency < 0.0);
    }

    #[test]
    fn test_projection_uses_same_formula() {
        let table = yard_table();
        let aggregator = PerformanceAggregator::new(&table);
        let stats = weeks("1", &[Some(10.0)]);
        let mut projections = StatSnapshot::new();
        projections.insert("1".to_string(), StatRecord::new().with("rush_yd", 64.333));

        let profile = aggregator.profile("1", &stats, &projections);
        assert_eq!(profile.projected_points, 64.33);
    }
}
