//! `MemoryStore` — a `RwLock`-backed implementation of every store
//! contract. Used directly by the binary (populated from the data
//! directory) and by engine tests.

use std::sync::RwLock;

use chrono::{DateTime, NaiveDate, Utc};

use common::error::{Error, Result};
use common::stores::{
    CompanyStore, LearningModelStore, PredictionStore, QuoteStore, SentimentStore,
};
use common::types::{
    Company, Direction, Exchange, LearningModelRecord, Prediction, Quote, StorySentiment,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    companies: RwLock<Vec<Company>>,
    exchanges: RwLock<Vec<Exchange>>,
    quotes: RwLock<Vec<Quote>>,
    sentiments: RwLock<Vec<StorySentiment>>,
    learning_records: RwLock<Vec<LearningModelRecord>>,
    predictions: RwLock<Vec<Prediction>>,
}

fn poisoned() -> Error {
    Error::Store("store lock poisoned".into())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_company(&self, company: Company) -> Result<()> {
        self.companies.write().map_err(|_| poisoned())?.push(company);
        Ok(())
    }

    pub fn insert_exchange(&self, exchange: Exchange) -> Result<()> {
        self.exchanges.write().map_err(|_| poisoned())?.push(exchange);
        Ok(())
    }

    pub fn insert_quote(&self, quote: Quote) -> Result<()> {
        self.quotes.write().map_err(|_| poisoned())?.push(quote);
        Ok(())
    }

    pub fn insert_sentiment(&self, sentiment: StorySentiment) -> Result<()> {
        self.sentiments.write().map_err(|_| poisoned())?.push(sentiment);
        Ok(())
    }

    pub fn insert_learning_record(&self, record: LearningModelRecord) -> Result<()> {
        self.learning_records
            .write()
            .map_err(|_| poisoned())?
            .push(record);
        Ok(())
    }

    /// All predictions, for flushing back to disk and for tests.
    pub fn predictions(&self) -> Result<Vec<Prediction>> {
        Ok(self.predictions.read().map_err(|_| poisoned())?.clone())
    }

    pub fn prediction_count(&self) -> Result<usize> {
        Ok(self.predictions.read().map_err(|_| poisoned())?.len())
    }
}

impl CompanyStore for MemoryStore {
    fn company(&self, id: &str) -> Result<Option<Company>> {
        let companies = self.companies.read().map_err(|_| poisoned())?;
        Ok(companies.iter().find(|c| c.id == id).cloned())
    }

    fn exchange(&self, id: &str) -> Result<Option<Exchange>> {
        let exchanges = self.exchanges.read().map_err(|_| poisoned())?;
        Ok(exchanges.iter().find(|e| e.id == id).cloned())
    }

    fn company_ids(&self) -> Result<Vec<String>> {
        let companies = self.companies.read().map_err(|_| poisoned())?;
        Ok(companies.iter().map(|c| c.id.clone()).collect())
    }
}

impl QuoteStore for MemoryStore {
    fn recent_end_of_day(&self, company: &str, limit: usize) -> Result<Vec<Quote>> {
        let quotes = self.quotes.read().map_err(|_| poisoned())?;
        let mut matched: Vec<Quote> = quotes
            .iter()
            .filter(|q| q.company == company && !q.intraday)
            .cloned()
            .collect();
        matched.sort_by_key(|q| q.date);
        if matched.len() > limit {
            matched.drain(..matched.len() - limit);
        }
        Ok(matched)
    }

    fn end_of_day_before(&self, company: &str, date: DateTime<Utc>) -> Result<Option<Quote>> {
        let quotes = self.quotes.read().map_err(|_| poisoned())?;
        Ok(quotes
            .iter()
            .filter(|q| q.company == company && !q.intraday && q.date < date)
            .max_by_key(|q| q.date)
            .cloned())
    }

    fn end_of_day_on(&self, company: &str, day: NaiveDate) -> Result<Option<Quote>> {
        let quotes = self.quotes.read().map_err(|_| poisoned())?;
        Ok(quotes
            .iter()
            .filter(|q| q.company == company && !q.intraday && q.date.date_naive() == day)
            .max_by_key(|q| q.date)
            .cloned())
    }
}

impl SentimentStore for MemoryStore {
    fn for_company(&self, company: &str) -> Result<Vec<StorySentiment>> {
        let sentiments = self.sentiments.read().map_err(|_| poisoned())?;
        Ok(sentiments
            .iter()
            .filter(|s| s.company == company)
            .cloned()
            .collect())
    }
}

impl LearningModelStore for MemoryStore {
    fn matching(
        &self,
        company: &str,
        quote_direction: Direction,
        sentiment_direction: Direction,
    ) -> Result<Vec<LearningModelRecord>> {
        let records = self.learning_records.read().map_err(|_| poisoned())?;
        Ok(records
            .iter()
            .filter(|r| {
                r.company == company
                    && r.previous_quote_direction == quote_direction
                    && r.previous_sentiment_direction == sentiment_direction
            })
            .cloned()
            .collect())
    }
}

impl PredictionStore for MemoryStore {
    fn open_for_company(&self, company: &str) -> Result<Vec<Prediction>> {
        let predictions = self.predictions.read().map_err(|_| poisoned())?;
        Ok(predictions
            .iter()
            .filter(|p| p.company == company && p.is_open())
            .cloned()
            .collect())
    }

    fn recent_for_company(&self, company: &str, limit: usize) -> Result<Vec<Prediction>> {
        let predictions = self.predictions.read().map_err(|_| poisoned())?;
        let mut matched: Vec<Prediction> = predictions
            .iter()
            .filter(|p| p.company == company)
            .cloned()
            .collect();
        matched.sort_by_key(|p| std::cmp::Reverse(p.prediction_date));
        matched.truncate(limit);
        Ok(matched)
    }

    fn open_all(&self) -> Result<Vec<Prediction>> {
        let predictions = self.predictions.read().map_err(|_| poisoned())?;
        Ok(predictions.iter().filter(|p| p.is_open()).cloned().collect())
    }

    fn upsert(&self, prediction: &Prediction) -> Result<()> {
        let mut predictions = self.predictions.write().map_err(|_| poisoned())?;
        match predictions.iter_mut().find(|p| p.id == prediction.id) {
            Some(existing) => *existing = prediction.clone(),
            None => predictions.push(prediction.clone()),
        }
        Ok(())
    }
}
