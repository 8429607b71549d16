//! Shared domain types, error type, configuration, and the collaborator
//! contracts consumed by the prediction engine.

pub mod config;
pub mod error;
pub mod stores;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    Company, Direction, EntitySentiment, Exchange, LearningModelRecord, Prediction, Quote,
    StorySentiment,
};
