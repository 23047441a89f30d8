pub mod league;
pub mod performance;
pub mod recommender;
pub mod roster;
pub mod scoring;
pub mod waiver_scorer;

/// Round to two decimal places, the precision every derived figure is reported in.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
