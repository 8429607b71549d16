//! Duplicate-forecast reconciliation.
//!
//! A freshly computed forecast may coincide with one already open for
//! the company. Matching is exact on (direction, predicted change):
//! two forecasts from different analogue sets that land on the same
//! change are the same forecast.

use common::types::Prediction;

/// What to do with a candidate forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// An identical open forecast exists; drop the candidate.
    Discard,
    /// Same forecast, new confidence; update the open record in place.
    UpdateExisting {
        target_id: String,
        new_certainty: f64,
    },
    /// Nothing open matches; store the candidate.
    CreateNew,
}

/// Decide the candidate's fate against the company's open predictions.
pub fn reconcile(candidate: &Prediction, open: &[Prediction]) -> Reconciliation {
    for existing in open {
        if existing.direction == candidate.direction
            && existing.predicted_change == candidate.predicted_change
        {
            if existing.certainty == candidate.certainty {
                return Reconciliation::Discard;
            }
            return Reconciliation::UpdateExisting {
                target_id: existing.id.clone(),
                new_certainty: candidate.certainty,
            };
        }
    }
    Reconciliation::CreateNew
}
