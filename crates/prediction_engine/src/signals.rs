//! Signal derivations over raw quote and sentiment inputs.
//!
//! These feed the analogue lookup: the categorical direction of the
//! most recent quote move, the categorical direction of the most
//! recent sentiment move, and the latest sentiment's deviation from
//! the company's historical average. All are deterministic; running
//! out of input is a domain-level derivation failure, which the
//! generator downgrades to "no forecast produced".

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use common::error::{Error, Result};
use common::types::{Direction, Quote, StorySentiment};

/// Categorical direction of a signed change.
pub fn direction_of(change: f64) -> Direction {
    if change > 0.0 {
        Direction::Up
    } else if change < 0.0 {
        Direction::Down
    } else {
        Direction::None
    }
}

/// Direction of the move between the two most recent quotes.
pub fn previous_quote_direction(quotes: &[Quote]) -> Result<Direction> {
    if quotes.len() < 2 {
        return Err(Error::QuoteDerivation(
            "need at least two quotes to derive a price direction".into(),
        ));
    }
    let last = &quotes[quotes.len() - 1];
    let previous = &quotes[quotes.len() - 2];
    Ok(direction_of(last.close - previous.close))
}

/// Sentiment summed per calendar day across all stories, for days on
/// or before `as_of`, ascending by day.
fn daily_totals(sentiments: &[StorySentiment], as_of: DateTime<Utc>) -> Vec<(NaiveDate, f64)> {
    let cutoff = as_of.date_naive();
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for story in sentiments {
        let day = story.story_date.date_naive();
        if day > cutoff {
            continue;
        }
        let story_total: f64 = story.entity_sentiments.iter().map(|e| e.sentiment).sum();
        *totals.entry(day).or_insert(0.0) += story_total;
    }
    totals.into_iter().collect()
}

/// Direction of the move between the two most recent sentiment days.
pub fn previous_sentiment_direction(
    sentiments: &[StorySentiment],
    as_of: DateTime<Utc>,
) -> Result<Direction> {
    let totals = daily_totals(sentiments, as_of);
    if totals.len() < 2 {
        return Err(Error::SentimentDerivation(
            "need sentiment on at least two days to derive a direction".into(),
        ));
    }
    let last = totals[totals.len() - 1].1;
    let previous = totals[totals.len() - 2].1;
    Ok(direction_of(last - previous))
}

/// The latest sentiment day's total minus the mean of all per-day
/// totals up to `as_of`.
pub fn last_sentiment_difference_from_average(
    sentiments: &[StorySentiment],
    as_of: DateTime<Utc>,
) -> Result<f64> {
    let totals = daily_totals(sentiments, as_of);
    if totals.is_empty() {
        return Err(Error::SentimentDerivation(
            "no sentiment data to compare against the average".into(),
        ));
    }
    let last = totals[totals.len() - 1].1;
    let average: f64 = totals.iter().map(|(_, t)| t).sum::<f64>() / totals.len() as f64;
    Ok(last - average)
}
