use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::decision::router::{decide_handler, form_handler};
use crate::decision::{DecisionService, DecisionState};

fn post_decision(body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    post_raw_decision(serde_json::to_vec(&body).expect("serializable body"))
}

fn post_raw_decision(body: impl Into<axum::body::Body>) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post("/api/v1/loan/decisions")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("request builds")
}

#[tokio::test]
async fn decision_route_approves_reference_applicant() {
    let response = loan_router()
        .oneshot(post_decision(json!(approved_applicant())))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["decision"], "approved");
    assert_eq!(payload["approved"], true);
    assert_eq!(payload["message"], "Loan Approved! Congratulations!");
}

#[tokio::test]
async fn decision_route_rejects_bad_credit() {
    let response = loan_router()
        .oneshot(post_decision(json!(rejected_applicant())))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["decision"], "rejected");
    assert_eq!(payload["message"], "Loan Rejected. Criteria not met.");
}

#[tokio::test]
async fn decision_route_reports_missing_feature() {
    let mut input = approved_applicant();
    input.remove("Credit_History");

    let response = loan_router()
        .oneshot(post_decision(json!(input)))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["feature"], "Credit_History");
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("Credit_History"));
}

#[tokio::test]
async fn decision_route_answers_non_object_body_with_json_error() {
    let response = loan_router()
        .oneshot(post_raw_decision("[1,2]"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .starts_with("invalid request body"));
}

#[tokio::test]
async fn decision_route_rejects_repeated_feature() {
    let body = r#"{"Gender":1,"Married":1,"Education":1,"Self_Employed":0,"ApplicantIncome":-5000,"ApplicantIncome":5000,"CoapplicantIncome":0,"LoanAmount":128,"Loan_Amount_Term":360,"Credit_History":1,"Property_Area":2}"#;

    let response = loan_router()
        .oneshot(post_raw_decision(body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("`ApplicantIncome` is given more than once"));
}

#[tokio::test]
async fn decide_handler_returns_internal_error_on_model_failure() {
    let state = DecisionState {
        service: Arc::new(DecisionService::new(
            loan_features(),
            FailingScaler,
            FixedLabel(1),
        )),
        presentation_delay: Duration::ZERO,
    };

    let response = decide_handler(State(state), Ok(axum::Json(approved_applicant())))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload.get("feature").is_none());
}

#[tokio::test]
async fn presentation_delay_does_not_change_the_outcome() {
    let state = DecisionState {
        service: Arc::new(loan_service()),
        presentation_delay: Duration::from_millis(5),
    };

    let response = decide_handler(State(state), Ok(axum::Json(approved_applicant())))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["decision"], "approved");
}

#[tokio::test]
async fn form_handler_serves_widgets() {
    let state = DecisionState {
        service: Arc::new(loan_service()),
        presentation_delay: Duration::ZERO,
    };

    let response = form_handler(State(state)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["title"], "Loan Approval Prediction");
    let fields = payload["fields"].as_array().expect("fields array");
    assert_eq!(fields.len(), LOAN_FEATURES.len());
    assert_eq!(fields[0]["name"], "Gender");
    assert_eq!(fields[0]["widget"]["type"], "choice");
    assert_eq!(fields[0]["widget"]["options"], json!([0, 1]));
    assert_eq!(fields[4]["widget"]["type"], "number");
    assert_eq!(fields[9]["column"], "right");
}
