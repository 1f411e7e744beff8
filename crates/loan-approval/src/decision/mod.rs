//! Applicant intake, validation, and the approve/reject decision.
//!
//! Input arrives keyed by feature name, is bound to the bundle's column order, then runs through
//! the scaler and classifier. The service holds no mutable state, so one instance serves every
//! request.

pub mod domain;
pub mod form;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{ApplicantInput, ApplicantRecord, Decision, PredictionError};
pub use form::{FieldWidget, FormColumn, FormField, FormSchema};
pub use router::{decision_router, DecisionState, DecisionView};
pub use service::DecisionService;
