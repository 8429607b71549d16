//! Unified error type for the prediction bot.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Quote-derived signal could not be computed (expected insufficiency).
    #[error("quote derivation failed: {0}")]
    QuoteDerivation(String),

    /// Sentiment-derived signal could not be computed (expected insufficiency).
    #[error("sentiment derivation failed: {0}")]
    SentimentDerivation(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Domain-level derivation failures are downgraded by the generator
    /// to a "no forecast produced" outcome instead of failing the run.
    pub fn is_expected_insufficiency(&self) -> bool {
        matches!(
            self,
            Error::QuoteDerivation(_) | Error::SentimentDerivation(_)
        )
    }
}
