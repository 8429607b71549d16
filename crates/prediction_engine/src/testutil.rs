//! Shared test doubles.

use std::sync::Mutex;

use chrono::NaiveDate;

use common::error::Result;
use common::stores::EventSink;

/// An `EventSink` that records everything published.
#[derive(Default)]
pub struct RecordingSink {
    generated: Mutex<Vec<String>>,
    missing: Mutex<Vec<(String, NaiveDate)>>,
}

impl RecordingSink {
    pub fn generated(&self) -> Vec<String> {
        self.generated.lock().unwrap().clone()
    }

    pub fn missing(&self) -> Vec<(String, NaiveDate)> {
        self.missing.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn prediction_generated(&self, prediction_id: &str) -> Result<()> {
        self.generated.lock().unwrap().push(prediction_id.into());
        Ok(())
    }

    fn missing_quote_data(&self, exchange_id: &str, date: NaiveDate) -> Result<()> {
        self.missing.lock().unwrap().push((exchange_id.into(), date));
        Ok(())
    }
}
