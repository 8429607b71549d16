//! Append-only JSONL event journal.
//!
//! Every published event is also a line in a day-keyed journal file,
//! so a run leaves an auditable trail even when no broker is attached.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{NaiveDate, SecondsFormat, Utc};
use serde_json::json;
use tracing::{info, warn};

use common::error::Result;
use common::stores::EventSink;

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

struct JournalFile {
    dir: PathBuf,
    day_key: String,
    file: File,
}

impl JournalFile {
    fn open(dir: PathBuf) -> std::io::Result<Self> {
        create_dir_all(&dir)?;
        let day_key = Utc::now().format("%Y-%m-%d").to_string();
        let file = Self::open_day_file(&dir, &day_key)?;
        Ok(Self { dir, day_key, file })
    }

    fn open_day_file(dir: &Path, day_key: &str) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("events-{}.jsonl", day_key)))
    }

    fn rotate_if_needed(&mut self) -> std::io::Result<()> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        if today != self.day_key {
            self.file = Self::open_day_file(&self.dir, &today)?;
            self.day_key = today;
        }
        Ok(())
    }

    fn write_event(&mut self, event: serde_json::Value) {
        let write_result = (|| -> std::io::Result<()> {
            self.rotate_if_needed()?;
            let line = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            writeln!(self.file, "{}", line)?;
            self.file.flush()?;
            Ok(())
        })();

        if let Err(e) = write_result {
            warn!("Event journal write failed: {}", e);
        }
    }
}

/// `EventSink` that logs each event and appends it to the journal.
pub struct EventJournal {
    inner: Mutex<JournalFile>,
}

impl EventJournal {
    pub fn open(dir: PathBuf) -> std::io::Result<Self> {
        Ok(Self {
            inner: Mutex::new(JournalFile::open(dir)?),
        })
    }

    fn write(&self, event: serde_json::Value) {
        match self.inner.lock() {
            Ok(mut guard) => guard.write_event(event),
            Err(_) => warn!("Event journal lock poisoned, dropping event"),
        }
    }
}

impl EventSink for EventJournal {
    fn prediction_generated(&self, prediction_id: &str) -> Result<()> {
        info!("Publishing prediction generated [{}]", prediction_id);
        self.write(json!({
            "ts": now_iso(),
            "kind": "prediction_generated",
            "prediction_id": prediction_id,
        }));
        Ok(())
    }

    fn missing_quote_data(&self, exchange_id: &str, date: NaiveDate) -> Result<()> {
        info!(
            "Publishing missing quote data for exchange [{}] date [{}]",
            exchange_id, date
        );
        self.write(json!({
            "ts": now_iso(),
            "kind": "missing_quote_data",
            "exchange": exchange_id,
            "date": date.to_string(),
        }));
        Ok(())
    }
}
