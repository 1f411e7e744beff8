use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{ApplicantInput, Decision};
use super::service::DecisionService;
use crate::error::AppError;
use crate::model::{Classifier, FeatureScaler};

/// Shared handler state: the decision service plus presentation-only pacing.
pub struct DecisionState<S, C> {
    pub service: Arc<DecisionService<S, C>>,
    pub presentation_delay: Duration,
}

impl<S, C> Clone for DecisionState<S, C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            presentation_delay: self.presentation_delay,
        }
    }
}

/// Public representation of a decision returned to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionView {
    pub decision: Decision,
    pub approved: bool,
    pub message: &'static str,
}

impl From<Decision> for DecisionView {
    fn from(decision: Decision) -> Self {
        Self {
            decision,
            approved: decision.is_approved(),
            message: decision.message(),
        }
    }
}

/// Router builder exposing the applicant form and the decision endpoint.
pub fn decision_router<S, C>(
    service: Arc<DecisionService<S, C>>,
    presentation_delay: Duration,
) -> Router
where
    S: FeatureScaler + 'static,
    C: Classifier + 'static,
{
    Router::new()
        .route("/api/v1/loan/form", get(form_handler::<S, C>))
        .route("/api/v1/loan/decisions", post(decide_handler::<S, C>))
        .with_state(DecisionState {
            service,
            presentation_delay,
        })
}

pub(crate) async fn form_handler<S, C>(State(state): State<DecisionState<S, C>>) -> Response
where
    S: FeatureScaler + 'static,
    C: Classifier + 'static,
{
    (StatusCode::OK, axum::Json(state.service.form().clone())).into_response()
}

pub(crate) async fn decide_handler<S, C>(
    State(state): State<DecisionState<S, C>>,
    payload: Result<axum::Json<ApplicantInput>, JsonRejection>,
) -> Result<axum::Json<DecisionView>, AppError>
where
    S: FeatureScaler + 'static,
    C: Classifier + 'static,
{
    let axum::Json(input) = payload?;
    let outcome = state.service.decide(&input);

    if !state.presentation_delay.is_zero() {
        tokio::time::sleep(state.presentation_delay).await;
    }

    let decision = outcome.inspect_err(|error| {
        if !error.is_input_error() {
            warn!(%error, "loan decision failed");
        }
    })?;

    info!(decision = decision.label(), "loan application evaluated");
    Ok(axum::Json(DecisionView::from(decision)))
}
