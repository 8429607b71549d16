//! Forecast generation for a single company.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};
use uuid::Uuid;

use common::config::EngineConfig;
use common::error::{Error, Result};
use common::stores::{
    CompanyStore, EventSink, LearningModelStore, PredictionStore, QuoteStore, SentimentStore,
};
use common::types::Prediction;

use crate::analogue;
use crate::calendar::{roll_off_weekend, Roll};
use crate::certainty;
use crate::reconcile::{reconcile, Reconciliation};
use crate::signals;

/// Observable result of one generator invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// A new forecast was stored and announced.
    Created(String),
    /// An open duplicate's certainty was refreshed in place.
    UpdatedCertainty(String),
    /// An identical open forecast already existed; nothing written.
    DuplicateDiscarded,
    /// Insufficient data; nothing written.
    Skipped(String),
}

/// Synthesizes a forecast for one company from historical analogues
/// and sentiment signals. One invocation per company at a time; the
/// duplicate reconciliation is not safe against concurrent runs for
/// the same company.
pub struct PredictionGenerator {
    companies: Arc<dyn CompanyStore>,
    quotes: Arc<dyn QuoteStore>,
    sentiments: Arc<dyn SentimentStore>,
    learning_models: Arc<dyn LearningModelStore>,
    predictions: Arc<dyn PredictionStore>,
    events: Arc<dyn EventSink>,
    config: EngineConfig,
}

impl PredictionGenerator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        companies: Arc<dyn CompanyStore>,
        quotes: Arc<dyn QuoteStore>,
        sentiments: Arc<dyn SentimentStore>,
        learning_models: Arc<dyn LearningModelStore>,
        predictions: Arc<dyn PredictionStore>,
        events: Arc<dyn EventSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            companies,
            quotes,
            sentiments,
            learning_models,
            predictions,
            events,
            config,
        }
    }

    /// Generate a forecast for `company_id` as of now.
    pub fn generate(&self, company_id: &str) -> Result<GenerateOutcome> {
        self.generate_at(company_id, Utc::now())
    }

    /// Generate a forecast with an explicit clock, for deterministic
    /// invocation from tests and backfills.
    pub fn generate_at(&self, company_id: &str, now: DateTime<Utc>) -> Result<GenerateOutcome> {
        match self.try_generate(company_id, now) {
            Err(e) if e.is_expected_insufficiency() => {
                info!("{}", e);
                Ok(GenerateOutcome::Skipped(e.to_string()))
            }
            Err(e) => {
                error!("Prediction generation failed for company [{}]: {}", company_id, e);
                Err(e)
            }
            ok => ok,
        }
    }

    fn try_generate(&self, company_id: &str, now: DateTime<Utc>) -> Result<GenerateOutcome> {
        let company = self
            .companies
            .company(company_id)?
            .ok_or_else(|| Error::Store(format!("unknown company [{company_id}]")))?;

        info!(
            "Prediction Generator running for company [{}] [{}]",
            company.id, company.name
        );

        let quotes = self
            .quotes
            .recent_end_of_day(&company.id, self.config.quote_window)?;
        if quotes.len() < self.config.quote_window {
            info!(
                "Company [{}] has {} of {} end-of-day quotes, skipping",
                company.id,
                quotes.len(),
                self.config.quote_window
            );
            return Ok(GenerateOutcome::Skipped("not enough quote history".into()));
        }
        let Some(last_quote) = quotes.last() else {
            return Ok(GenerateOutcome::Skipped("not enough quote history".into()));
        };

        let sentiments = self.sentiments.for_company(&company.id)?;

        let quote_direction = signals::previous_quote_direction(&quotes)?;
        let sentiment_direction =
            signals::previous_sentiment_direction(&sentiments, last_quote.date)?;

        let records =
            self.learning_models
                .matching(&company.id, quote_direction, sentiment_direction)?;

        let sentiment_difference =
            signals::last_sentiment_difference_from_average(&sentiments, last_quote.date)?;

        let candidates = analogue::candidate_changes(&records, sentiment_difference);
        if candidates.is_empty() {
            info!("Not enough quote data to predict average change");
            return Ok(GenerateOutcome::Skipped("no qualifying analogues".into()));
        }

        let predicted_change: f64 = candidates.iter().sum::<f64>() / candidates.len() as f64;
        let predicted_change_percent = predicted_change / last_quote.close * 100.0;
        let direction = signals::direction_of(predicted_change);

        // Expire one validity period out, never on a weekend day.
        let expiry = roll_off_weekend(
            now + Duration::days(self.config.validity_days),
            Roll::Forward,
        );
        let validity_period_ms = (expiry - now).num_milliseconds();

        let priors = self
            .predictions
            .recent_for_company(&company.id, self.config.prediction_history_limit)?;
        let certainty = certainty::estimate(&priors, direction, now, &self.config);

        let potential_earning_per_share =
            (last_quote.bid - (last_quote.ask - predicted_change)).abs();

        let candidate = Prediction {
            id: Uuid::new_v4().to_string(),
            company: company.id.clone(),
            prediction_date: now,
            validity_period_ms,
            direction,
            predicted_change,
            predicted_change_percent,
            certainty,
            last_bid: last_quote.bid,
            last_ask: last_quote.ask,
            potential_earning_per_share,
            correct: None,
            actual_change: None,
            actual_earning_per_share: None,
        };

        let open = self.predictions.open_for_company(&company.id)?;
        match reconcile(&candidate, &open) {
            Reconciliation::Discard => {
                info!(
                    "Duplicate Prediction generated for company [{}] - Ignoring prediction",
                    company.name
                );
                Ok(GenerateOutcome::DuplicateDiscarded)
            }
            Reconciliation::UpdateExisting {
                target_id,
                new_certainty,
            } => {
                let mut existing = open
                    .into_iter()
                    .find(|p| p.id == target_id)
                    .ok_or_else(|| Error::Store(format!("open prediction [{target_id}] vanished")))?;
                existing.certainty = new_certainty;
                self.predictions.upsert(&existing)?;
                info!(
                    "Duplicate Prediction generated for company [{}] with different Certainty - Updating prediction",
                    company.name
                );
                Ok(GenerateOutcome::UpdatedCertainty(target_id))
            }
            Reconciliation::CreateNew => {
                self.predictions.upsert(&candidate)?;
                self.events.prediction_generated(&candidate.id)?;
                info!(
                    "Prediction Generated for company [{}] [{}]",
                    company.id, company.name
                );
                Ok(GenerateOutcome::Created(candidate.id))
            }
        }
    }
}
