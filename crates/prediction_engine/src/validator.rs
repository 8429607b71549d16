//! Grading of overdue forecasts against realized quotes.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use common::error::{Error, Result};
use common::stores::{CompanyStore, EventSink, PredictionStore, QuoteStore};
use common::types::{Exchange, Prediction, Quote};

use crate::calendar::{roll_off_weekend, Roll};
use crate::signals::direction_of;

/// Counts from one validation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Predictions graded and persisted this sweep.
    pub resolved: usize,
    /// Overdue predictions left open for lack of realized data.
    pub still_open: usize,
    /// Distinct (exchange, date) missing-data requests emitted.
    pub missing_requests: usize,
}

/// Resolves all overdue open forecasts across every company. Safe to
/// re-run: resolved predictions drop out of the open scan. Concurrent
/// sweeps over the same prediction are not guarded; serialize
/// invocations externally.
pub struct PredictionValidator {
    companies: Arc<dyn CompanyStore>,
    quotes: Arc<dyn QuoteStore>,
    predictions: Arc<dyn PredictionStore>,
    events: Arc<dyn EventSink>,
}

impl PredictionValidator {
    pub fn new(
        companies: Arc<dyn CompanyStore>,
        quotes: Arc<dyn QuoteStore>,
        predictions: Arc<dyn PredictionStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            companies,
            quotes,
            predictions,
            events,
        }
    }

    /// Grade every overdue open prediction as of now.
    pub fn validate_all(&self) -> Result<ValidationSummary> {
        self.validate_all_at(Utc::now())
    }

    /// Grade with an explicit clock, for deterministic invocation from
    /// tests and backfills.
    pub fn validate_all_at(&self, now: DateTime<Utc>) -> Result<ValidationSummary> {
        let mut missing: HashSet<(String, NaiveDate)> = HashSet::new();
        let mut summary = ValidationSummary::default();

        let open = self.predictions.open_all()?;
        let overdue = open.into_iter().filter(|p| now > p.expiry());

        for prediction in overdue {
            let company = self
                .companies
                .company(&prediction.company)?
                .ok_or_else(|| {
                    Error::Store(format!("unknown company [{}]", prediction.company))
                })?;
            let exchange = self.companies.exchange(&company.exchange)?.ok_or_else(|| {
                Error::Store(format!("unknown exchange [{}]", company.exchange))
            })?;

            // Grade from the most recent business day at or before issue.
            let start_date = roll_off_weekend(prediction.prediction_date, Roll::Backward);
            let Some(quote_at_start) =
                self.quote_at(&exchange, &prediction.company, start_date)?
            else {
                debug!(
                    "Quote at prediction not present for date [{}] Requesting retrieval",
                    start_date.date_naive()
                );
                missing.insert((exchange.id.clone(), start_date.date_naive()));
                summary.still_open += 1;
                continue;
            };

            // The first business day at or after expiry.
            let end_date = roll_off_weekend(
                prediction.prediction_date + Duration::milliseconds(prediction.validity_period_ms),
                Roll::Forward,
            );
            let Some(quote_at_end) = self.quote_at(&exchange, &prediction.company, end_date)?
            else {
                debug!(
                    "Quote at end of prediction not present for date [{}] Requesting retrieval",
                    end_date.date_naive()
                );
                missing.insert((exchange.id.clone(), end_date.date_naive()));
                summary.still_open += 1;
                continue;
            };

            let actual_change = quote_at_end.close - quote_at_start.open;
            let actual_direction = direction_of(actual_change);

            let mut resolved = prediction.clone();
            resolved.correct = Some(actual_direction == prediction.direction);
            resolved.actual_change = Some(actual_change);
            resolved.actual_earning_per_share =
                Some((prediction.last_bid - (prediction.last_ask - actual_change)).abs());

            info!(
                "Prediction Validated for Company [{}] Direction [{:?}] - Correct? [{:?}]",
                company.name, resolved.direction, resolved.correct
            );
            self.predictions.upsert(&resolved)?;
            summary.resolved += 1;
        }

        summary.missing_requests = missing.len();
        for (exchange_id, date) in missing {
            debug!(
                "Requesting Retrieval of Quote data for Date [{}] for Exchange [{}]",
                date, exchange_id
            );
            self.events.missing_quote_data(&exchange_id, date)?;
        }

        Ok(summary)
    }

    /// Realized-quote lookup. Intraday-capable exchanges prefer the
    /// most recent end-of-day quote strictly before the date; otherwise
    /// (or when that search misses) fall back to an exact match on the
    /// day-truncated date.
    fn quote_at(
        &self,
        exchange: &Exchange,
        company: &str,
        date: DateTime<Utc>,
    ) -> Result<Option<Quote>> {
        if exchange.intraday {
            if let Some(quote) = self.quotes.end_of_day_before(company, date)? {
                return Ok(Some(quote));
            }
        }
        self.quotes.end_of_day_on(company, date.date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::types::{Company, Direction};
    use market_store::MemoryStore;

    use crate::testutil::RecordingSink;

    struct Harness {
        store: Arc<MemoryStore>,
        sink: Arc<RecordingSink>,
        validator: PredictionValidator,
    }

    fn harness(intraday: bool) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let validator = PredictionValidator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            sink.clone(),
        );
        store
            .insert_company(Company {
                id: "acme".into(),
                name: "Acme Corp".into(),
                exchange: "NYSE".into(),
            })
            .unwrap();
        store
            .insert_exchange(Exchange {
                id: "NYSE".into(),
                name: "New York".into(),
                intraday,
            })
            .unwrap();
        Harness {
            store,
            sink,
            validator,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn open_prediction(id: &str, issued: DateTime<Utc>, direction: Direction) -> Prediction {
        Prediction {
            id: id.into(),
            company: "acme".into(),
            prediction_date: issued,
            validity_period_ms: 86_400_000,
            direction,
            predicted_change: -2.0,
            predicted_change_percent: -2.0,
            certainty: 0.5,
            last_bid: 100.0,
            last_ask: 102.0,
            potential_earning_per_share: 4.0,
            correct: None,
            actual_change: None,
            actual_earning_per_share: None,
        }
    }

    fn eod_quote(store: &MemoryStore, when: DateTime<Utc>, open: f64, close: f64) {
        store
            .insert_quote(Quote {
                company: "acme".into(),
                date: when,
                open,
                close,
                bid: close,
                ask: close,
                intraday: false,
            })
            .unwrap();
    }

    #[test]
    fn correct_down_prediction_is_resolved() {
        // Issued 2016-03-01 (a Tuesday), one-day validity.
        let h = harness(false);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 1), Direction::Down))
            .unwrap();
        eod_quote(&h.store, date(2016, 3, 1), 100.0, 99.0);
        eod_quote(&h.store, date(2016, 3, 2), 98.5, 98.0);

        let summary = h.validator.validate_all_at(date(2016, 3, 3)).unwrap();
        assert_eq!(
            summary,
            ValidationSummary {
                resolved: 1,
                still_open: 0,
                missing_requests: 0
            }
        );

        let p = &h.store.predictions().unwrap()[0];
        assert_eq!(p.correct, Some(true));
        assert_eq!(p.actual_change, Some(-2.0));
        // |100 - (102 - (-2))|
        assert_eq!(p.actual_earning_per_share, Some(4.0));
    }

    #[test]
    fn wrong_direction_is_resolved_incorrect() {
        let h = harness(false);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 1), Direction::Up))
            .unwrap();
        eod_quote(&h.store, date(2016, 3, 1), 100.0, 99.0);
        eod_quote(&h.store, date(2016, 3, 2), 98.5, 98.0);

        h.validator.validate_all_at(date(2016, 3, 3)).unwrap();

        let p = &h.store.predictions().unwrap()[0];
        assert_eq!(p.correct, Some(false));
        assert_eq!(p.actual_change, Some(-2.0));
    }

    #[test]
    fn flat_close_resolves_to_none_direction() {
        let h = harness(false);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 1), Direction::None))
            .unwrap();
        eod_quote(&h.store, date(2016, 3, 1), 100.0, 101.0);
        eod_quote(&h.store, date(2016, 3, 2), 99.0, 100.0);

        h.validator.validate_all_at(date(2016, 3, 3)).unwrap();

        let p = &h.store.predictions().unwrap()[0];
        assert_eq!(p.correct, Some(true));
        assert_eq!(p.actual_change, Some(0.0));
    }

    #[test]
    fn non_overdue_predictions_are_untouched() {
        let h = harness(false);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 1), Direction::Down))
            .unwrap();
        eod_quote(&h.store, date(2016, 3, 1), 100.0, 99.0);
        eod_quote(&h.store, date(2016, 3, 2), 98.5, 98.0);

        // Still within the validity window.
        let summary = h
            .validator
            .validate_all_at(date(2016, 3, 1) + Duration::hours(12))
            .unwrap();

        assert_eq!(summary.resolved, 0);
        assert!(h.store.predictions().unwrap()[0].is_open());
    }

    #[test]
    fn missing_start_quote_leaves_open_and_requests_data() {
        let h = harness(false);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 1), Direction::Down))
            .unwrap();
        eod_quote(&h.store, date(2016, 3, 2), 98.5, 98.0);

        let summary = h.validator.validate_all_at(date(2016, 3, 3)).unwrap();
        assert_eq!(
            summary,
            ValidationSummary {
                resolved: 0,
                still_open: 1,
                missing_requests: 1
            }
        );
        assert!(h.store.predictions().unwrap()[0].is_open());
        assert_eq!(h.sink.missing(), vec![("NYSE".into(), day(2016, 3, 1))]);
    }

    #[test]
    fn missing_end_quote_leaves_open_and_requests_data() {
        let h = harness(false);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 1), Direction::Down))
            .unwrap();
        eod_quote(&h.store, date(2016, 3, 1), 100.0, 99.0);

        let summary = h.validator.validate_all_at(date(2016, 3, 3)).unwrap();
        assert_eq!(summary.still_open, 1);
        assert_eq!(h.sink.missing(), vec![("NYSE".into(), day(2016, 3, 2))]);
    }

    #[test]
    fn missing_data_requests_are_deduplicated_per_run() {
        let h = harness(false);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 1), Direction::Down))
            .unwrap();
        h.store
            .upsert(&open_prediction("p2", date(2016, 3, 1), Direction::Up))
            .unwrap();

        let summary = h.validator.validate_all_at(date(2016, 3, 3)).unwrap();
        assert_eq!(summary.still_open, 2);
        assert_eq!(summary.missing_requests, 1);
        assert_eq!(h.sink.missing().len(), 1);
    }

    #[test]
    fn weekend_issue_date_grades_from_friday() {
        // Issued Saturday 2016-03-05; start rolls back to Friday the
        // 4th, expiry Sunday rolls forward to Monday the 7th.
        let h = harness(false);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 5), Direction::Down))
            .unwrap();
        eod_quote(&h.store, date(2016, 3, 4), 100.0, 99.0);
        eod_quote(&h.store, date(2016, 3, 7), 98.5, 98.0);

        let summary = h.validator.validate_all_at(date(2016, 3, 8)).unwrap();
        assert_eq!(summary.resolved, 1);
        let p = &h.store.predictions().unwrap()[0];
        assert_eq!(p.correct, Some(true));
        assert_eq!(p.actual_change, Some(-2.0));
    }

    #[test]
    fn intraday_exchange_prefers_quote_strictly_before_date() {
        let h = harness(true);
        h.store
            .upsert(&open_prediction(
                "p1",
                date(2016, 3, 1) + Duration::hours(9),
                Direction::Down,
            ))
            .unwrap();
        // Start lookup at 03-01T09:00 finds the previous evening's
        // close; end lookup at 03-02T09:00 finds 03-01's.
        eod_quote(&h.store, date(2016, 2, 29) + Duration::hours(21), 100.0, 99.0);
        eod_quote(&h.store, date(2016, 3, 1) + Duration::hours(21), 98.5, 98.0);

        let summary = h.validator.validate_all_at(date(2016, 3, 3)).unwrap();
        assert_eq!(summary.resolved, 1);
        let p = &h.store.predictions().unwrap()[0];
        assert_eq!(p.actual_change, Some(-2.0));
        assert_eq!(p.correct, Some(true));
    }

    #[test]
    fn intraday_exchange_falls_back_to_exact_day_match() {
        let h = harness(true);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 1), Direction::Down))
            .unwrap();
        // Nothing strictly before the start instant; the exact-day
        // fallback still grades the prediction. The end lookup finds
        // the 03-01 close (the most recent strictly before 03-02).
        eod_quote(&h.store, date(2016, 3, 1), 100.0, 99.0);

        let summary = h.validator.validate_all_at(date(2016, 3, 3)).unwrap();
        assert_eq!(summary.resolved, 1);
        let p = &h.store.predictions().unwrap()[0];
        assert_eq!(p.actual_change, Some(-1.0));
        assert_eq!(p.correct, Some(true));
    }

    #[test]
    fn resolved_predictions_drop_out_of_later_sweeps() {
        let h = harness(false);
        h.store
            .upsert(&open_prediction("p1", date(2016, 3, 1), Direction::Down))
            .unwrap();
        eod_quote(&h.store, date(2016, 3, 1), 100.0, 99.0);
        eod_quote(&h.store, date(2016, 3, 2), 98.5, 98.0);

        let first = h.validator.validate_all_at(date(2016, 3, 3)).unwrap();
        assert_eq!(first.resolved, 1);
        let second = h.validator.validate_all_at(date(2016, 3, 3)).unwrap();
        assert_eq!(second.resolved, 0);
        assert_eq!(h.store.prediction_count().unwrap(), 1);
    }
}
