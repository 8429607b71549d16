//! Self-calibrating certainty estimate.
//!
//! Each company's confidence score is its own recent hit rate for
//! forecasts in the same direction, with a coin-flip prior when there
//! is no track record and a ceiling on short perfect streaks.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use common::config::EngineConfig;
use common::types::{Direction, Prediction};

/// Estimate certainty for a forecast in `direction`, given the
/// company's prior predictions (most recent first or not — order is
/// irrelevant).
pub fn estimate(
    predictions: &[Prediction],
    direction: Direction,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> f64 {
    let window_start = now - Duration::days(config.certainty_lookback_days);

    let matching: Vec<&Prediction> = predictions
        .iter()
        .filter(|p| !p.is_open())
        .filter(|p| p.direction == direction)
        .filter(|p| p.prediction_date > window_start)
        .collect();

    let correct = matching.iter().filter(|p| p.correct == Some(true)).count();

    let mut certainty = config.default_certainty;
    if !matching.is_empty() {
        certainty = correct as f64 / matching.len() as f64;
    }

    // A short perfect streak is not full confidence.
    if certainty == 1.0 && matching.len() < config.min_streak {
        certainty = config.streak_clamp;
    }

    info!(
        "Correct predictions [{}] / Matching predictions [{}]. Resulting in certainty of [{}]",
        correct,
        matching.len(),
        certainty
    );

    certainty
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 3, 16, 12, 0, 0).unwrap()
    }

    fn prior(days_ago: i64, direction: Direction, correct: Option<bool>) -> Prediction {
        Prediction {
            id: format!("prior-{days_ago}-{direction:?}-{correct:?}"),
            company: "acme".into(),
            prediction_date: now() - Duration::days(days_ago),
            validity_period_ms: 86_400_000,
            direction,
            predicted_change: -2.0,
            predicted_change_percent: -2.0,
            certainty: 0.5,
            last_bid: 100.0,
            last_ask: 102.0,
            potential_earning_per_share: 4.0,
            correct,
            actual_change: None,
            actual_earning_per_share: None,
        }
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn no_track_record_is_a_coin_flip() {
        assert_eq!(estimate(&[], Direction::Down, now(), &config()), 0.5);
    }

    #[test]
    fn open_predictions_do_not_count() {
        let priors = vec![prior(2, Direction::Down, None)];
        assert_eq!(estimate(&priors, Direction::Down, now(), &config()), 0.5);
    }

    #[test]
    fn other_directions_do_not_count() {
        let priors = vec![prior(2, Direction::Up, Some(true))];
        assert_eq!(estimate(&priors, Direction::Down, now(), &config()), 0.5);
    }

    #[test]
    fn stale_predictions_fall_out_of_the_window() {
        let priors = vec![prior(31, Direction::Down, Some(true))];
        assert_eq!(estimate(&priors, Direction::Down, now(), &config()), 0.5);
    }

    #[test]
    fn short_perfect_streak_is_clamped() {
        let priors = vec![prior(2, Direction::Down, Some(true))];
        assert_eq!(estimate(&priors, Direction::Down, now(), &config()), 0.6);

        let priors = vec![
            prior(2, Direction::Down, Some(true)),
            prior(3, Direction::Down, Some(true)),
        ];
        assert_eq!(estimate(&priors, Direction::Down, now(), &config()), 0.6);
    }

    #[test]
    fn long_perfect_streak_reports_full_confidence() {
        let priors: Vec<Prediction> = (2..6)
            .map(|d| prior(d, Direction::Down, Some(true)))
            .collect();
        assert_eq!(estimate(&priors, Direction::Down, now(), &config()), 1.0);
    }

    #[test]
    fn mixed_record_reports_exact_hit_rate() {
        let priors = vec![
            prior(2, Direction::Down, Some(true)),
            prior(3, Direction::Down, Some(true)),
            prior(4, Direction::Down, Some(false)),
            prior(5, Direction::Down, Some(false)),
        ];
        assert_eq!(estimate(&priors, Direction::Down, now(), &config()), 0.5);

        let priors = vec![
            prior(2, Direction::Down, Some(true)),
            prior(3, Direction::Down, Some(true)),
            prior(4, Direction::Down, Some(true)),
            prior(5, Direction::Down, Some(false)),
        ];
        assert_eq!(estimate(&priors, Direction::Down, now(), &config()), 0.75);
    }
}
