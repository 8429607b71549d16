//! Collaborator contracts consumed by the prediction engine.
//!
//! Persistence and transport are external concerns; the engine only
//! sees these narrow, synchronous interfaces, injected at construction.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::types::{
    Company, Direction, Exchange, LearningModelRecord, Prediction, Quote, StorySentiment,
};

/// Company and exchange reference data.
pub trait CompanyStore: Send + Sync {
    fn company(&self, id: &str) -> Result<Option<Company>>;
    fn exchange(&self, id: &str) -> Result<Option<Exchange>>;
    /// All known company ids, for scheduled generator sweeps.
    fn company_ids(&self) -> Result<Vec<String>>;
}

/// Realized quote lookups.
pub trait QuoteStore: Send + Sync {
    /// The most recent `limit` end-of-day quotes, ascending by date.
    fn recent_end_of_day(&self, company: &str, limit: usize) -> Result<Vec<Quote>>;

    /// The most recent end-of-day quote strictly before `date`.
    fn end_of_day_before(&self, company: &str, date: DateTime<Utc>) -> Result<Option<Quote>>;

    /// The end-of-day quote whose day-truncated date equals `day`.
    fn end_of_day_on(&self, company: &str, day: NaiveDate) -> Result<Option<Quote>>;
}

/// Story sentiment lookups.
pub trait SentimentStore: Send + Sync {
    fn for_company(&self, company: &str) -> Result<Vec<StorySentiment>>;
}

/// Historical analogue lookups.
pub trait LearningModelStore: Send + Sync {
    fn matching(
        &self,
        company: &str,
        quote_direction: Direction,
        sentiment_direction: Direction,
    ) -> Result<Vec<LearningModelRecord>>;
}

/// Prediction persistence.
pub trait PredictionStore: Send + Sync {
    /// Open (ungraded) predictions for one company.
    fn open_for_company(&self, company: &str) -> Result<Vec<Prediction>>;

    /// Up to `limit` most recent predictions for one company.
    fn recent_for_company(&self, company: &str, limit: usize) -> Result<Vec<Prediction>>;

    /// All open predictions across every company.
    fn open_all(&self) -> Result<Vec<Prediction>>;

    /// Insert or replace by id.
    fn upsert(&self, prediction: &Prediction) -> Result<()>;
}

/// Outbound event publication. Delivery semantics are the transport's
/// responsibility.
pub trait EventSink: Send + Sync {
    /// A new forecast was stored; payload is its identity.
    fn prediction_generated(&self, prediction_id: &str) -> Result<()>;

    /// A realized quote needed for grading is missing upstream.
    fn missing_quote_data(&self, exchange_id: &str, date: NaiveDate) -> Result<()>;
}
