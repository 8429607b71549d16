//! Historical-analogue filtering.
//!
//! Selects learning-model records relevant to the current sentiment
//! state and reduces them to the candidate values the generator
//! averages into a predicted change.

use common::types::LearningModelRecord;

/// Records whose stored sentiment deviation is strictly below the
/// current one.
fn within_difference<'a>(
    records: &'a [LearningModelRecord],
    sentiment_difference: f64,
) -> impl Iterator<Item = &'a LearningModelRecord> {
    records
        .iter()
        .filter(move |r| r.last_sentiment_difference_from_average < sentiment_difference)
}

fn average_resulting_change(
    records: &[LearningModelRecord],
    sentiment_difference: f64,
) -> Option<f64> {
    let changes: Vec<f64> = within_difference(records, sentiment_difference)
        .map(|r| r.resulting_quote_change)
        .collect();
    if changes.is_empty() {
        return None;
    }
    Some(changes.iter().sum::<f64>() / changes.len() as f64)
}

fn max_resulting_change(
    records: &[LearningModelRecord],
    sentiment_difference: f64,
) -> Option<f64> {
    within_difference(records, sentiment_difference)
        .map(|r| r.resulting_quote_change)
        .fold(None, |acc, change| match acc {
            Some(best) if best >= change => Some(best),
            _ => Some(change),
        })
}

/// Reduce the analogue set to the values averaged into the predicted
/// change. Empty reductions are omitted.
///
/// The third candidate (historically the "above difference" average)
/// applies the same below-difference predicate as the first, so the
/// average is counted twice. Kept as-is so a fix is a deliberate,
/// visible change; `duplicate_above_branch_double_weights_average`
/// pins it.
pub fn candidate_changes(
    records: &[LearningModelRecord],
    sentiment_difference: f64,
) -> Vec<f64> {
    let average_below = average_resulting_change(records, sentiment_difference);
    let max_below = max_resulting_change(records, sentiment_difference);
    let average_above = average_resulting_change(records, sentiment_difference);

    [average_below, max_below, average_above]
        .into_iter()
        .flatten()
        .collect()
}
