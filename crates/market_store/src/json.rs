//! JSON data-directory loading and flushing.
//!
//! Each collection lives in one JSON file holding an array of records.
//! Missing files are treated as empty collections so a data directory
//! can be built up incrementally.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use common::error::{Error, Result};
use common::stores::PredictionStore;
use common::types::{Company, Exchange, LearningModelRecord, Prediction, Quote, StorySentiment};

use crate::memory::MemoryStore;

const COMPANIES_FILE: &str = "companies.json";
const EXCHANGES_FILE: &str = "exchanges.json";
const QUOTES_FILE: &str = "quotes.json";
const SENTIMENTS_FILE: &str = "sentiments.json";
const LEARNING_FILE: &str = "learning_records.json";
const PREDICTIONS_FILE: &str = "predictions.json";

fn read_collection<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>> {
    let path = dir.join(file);
    if !path.exists() {
        debug!("{} not present, treating as empty", path.display());
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(&path)?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::Store(format!("failed to parse {}: {}", path.display(), e)))
}

/// Load every collection from `dir` into a fresh `MemoryStore`.
pub fn load_data_dir(dir: &Path) -> Result<MemoryStore> {
    let store = MemoryStore::new();

    for company in read_collection::<Company>(dir, COMPANIES_FILE)? {
        store.insert_company(company)?;
    }
    for exchange in read_collection::<Exchange>(dir, EXCHANGES_FILE)? {
        store.insert_exchange(exchange)?;
    }
    for quote in read_collection::<Quote>(dir, QUOTES_FILE)? {
        store.insert_quote(quote)?;
    }
    for sentiment in read_collection::<StorySentiment>(dir, SENTIMENTS_FILE)? {
        store.insert_sentiment(sentiment)?;
    }
    for record in read_collection::<LearningModelRecord>(dir, LEARNING_FILE)? {
        store.insert_learning_record(record)?;
    }
    for prediction in read_collection::<Prediction>(dir, PREDICTIONS_FILE)? {
        store.upsert(&prediction)?;
    }

    info!(
        "Loaded data directory {} ({} predictions)",
        dir.display(),
        store.prediction_count()?
    );
    Ok(store)
}

/// Write the prediction collection back to `dir`.
pub fn flush_predictions(store: &MemoryStore, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let predictions = store.predictions()?;
    let contents = serde_json::to_string_pretty(&predictions)?;
    fs::write(dir.join(PREDICTIONS_FILE), contents)?;
    debug!("Flushed {} predictions", predictions.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::types::Direction;

    #[test]
    fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_data_dir(dir.path()).unwrap();
        assert_eq!(store.prediction_count().unwrap(), 0);
    }

    #[test]
    fn predictions_survive_flush_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        store
            .upsert(&Prediction {
                id: "p1".into(),
                company: "acme".into(),
                prediction_date: Utc.with_ymd_and_hms(2016, 3, 1, 0, 0, 0).unwrap(),
                validity_period_ms: 86_400_000,
                direction: Direction::Down,
                predicted_change: -2.0,
                predicted_change_percent: -2.0,
                certainty: 0.5,
                last_bid: 100.0,
                last_ask: 102.0,
                potential_earning_per_share: 4.0,
                correct: None,
                actual_change: None,
                actual_earning_per_share: None,
            })
            .unwrap();

        flush_predictions(&store, dir.path()).unwrap();
        let reloaded = load_data_dir(dir.path()).unwrap();

        let predictions = reloaded.predictions().unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].id, "p1");
        assert_eq!(predictions[0].direction, Direction::Down);
        assert!(predictions[0].correct.is_none());
    }

    #[test]
    fn malformed_collection_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(QUOTES_FILE), "not json").unwrap();
        let err = load_data_dir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }
}
