//! Domain records shared across the bot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Market reference data ─────────────────────────────────────────────

/// A tradable instrument (company/stock).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Id of the exchange this company is listed on.
    pub exchange: String,
}

/// An exchange a company is listed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Whether the exchange supplies sub-day (intraday) quote samples.
    #[serde(default)]
    pub intraday: bool,
}

// ── Market data inputs ────────────────────────────────────────────────

/// A realized price sample. `intraday = false` means end-of-day.
/// Consumed, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub company: String,
    pub date: DateTime<Utc>,
    pub open: f64,
    pub close: f64,
    pub bid: f64,
    pub ask: f64,
    #[serde(default)]
    pub intraday: bool,
}

/// A signed sentiment score for one named entity in a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySentiment {
    pub entity: String,
    pub sentiment: f64,
}

/// Sentiment extracted from one news story about a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySentiment {
    pub company: String,
    pub story_date: DateTime<Utc>,
    #[serde(default)]
    pub entity_sentiments: Vec<EntitySentiment>,
}

/// A precomputed historical analogue: the pattern that was observed and
/// the quote change that followed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningModelRecord {
    pub company: String,
    pub previous_quote_direction: Direction,
    pub previous_sentiment_direction: Direction,
    pub last_sentiment_difference_from_average: f64,
    pub resulting_quote_change: f64,
}

// ── Predictions ───────────────────────────────────────────────────────

/// Direction of a price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    None,
}

/// A directional forecast for a company's near-term price movement.
///
/// Created Open (`correct` absent); a later validator pass sets the
/// outcome fields and the record becomes terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub company: String,
    /// When the forecast was issued.
    pub prediction_date: DateTime<Utc>,
    /// Milliseconds from creation to expiry.
    pub validity_period_ms: i64,
    pub direction: Direction,
    pub predicted_change: f64,
    pub predicted_change_percent: f64,
    /// Confidence in [0,1] from the historical hit rate.
    pub certainty: f64,
    pub last_bid: f64,
    pub last_ask: f64,
    pub potential_earning_per_share: f64,
    #[serde(default)]
    pub correct: Option<bool>,
    #[serde(default)]
    pub actual_change: Option<f64>,
    #[serde(default)]
    pub actual_earning_per_share: Option<f64>,
}

impl Prediction {
    /// A prediction is open until a validator pass grades it.
    pub fn is_open(&self) -> bool {
        self.correct.is_none()
    }

    /// The instant this prediction stops accepting and starts awaiting
    /// realized data.
    pub fn expiry(&self) -> DateTime<Utc> {
        self.prediction_date + chrono::Duration::milliseconds(self.validity_period_ms)
    }
}
