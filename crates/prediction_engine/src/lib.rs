//! The prediction engine: forecast generation and validation.
//!
//! Two cooperating batch operations over the store contracts in
//! `common::stores`:
//!
//! 1. [`PredictionGenerator`] synthesizes a forecast for one company
//!    from historical analogues and sentiment signals.
//! 2. [`PredictionValidator`] grades overdue forecasts against
//!    realized quotes and keeps the per-company accuracy record that
//!    feeds the next forecast's certainty.

pub mod analogue;
pub mod calendar;
pub mod certainty;
pub mod generator;
pub mod reconcile;
pub mod signals;
pub mod validator;

#[cfg(test)]
pub(crate) mod testutil;

pub use calendar::{roll_off_weekend, Roll};
pub use generator::{GenerateOutcome, PredictionGenerator};
pub use validator::{PredictionValidator, ValidationSummary};
