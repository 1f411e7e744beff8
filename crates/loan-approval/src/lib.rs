//! Loan approval decisions backed by a pre-fit scaler and classifier bundle.
//!
//! The [`model`] module loads the artifact once at startup; the [`decision`] module validates
//! applicant input against the bundle's feature list and turns the classifier label into an
//! approve/reject outcome.

pub mod config;
pub mod decision;
pub mod error;
pub mod model;
pub mod telemetry;
