use loan_approval::decision::DecisionService;
use loan_approval::error::AppError;
use loan_approval::model::ModelBundle;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the bundle once; every request and command shares the resulting service.
pub(crate) fn load_decision_service(path: &Path) -> Result<Arc<DecisionService>, AppError> {
    let bundle = ModelBundle::load(path).inspect_err(|err| {
        error!(path = %path.display(), %err, "model bundle unavailable");
    })?;
    let service = DecisionService::from_bundle(bundle);
    info!(
        path = %path.display(),
        features = service.features().len(),
        "decision service initialised"
    );
    Ok(Arc::new(service))
}

/// Splits a `NAME=VALUE` command-line assignment.
pub(crate) fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing feature name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Numbers stay numbers so validation sees what the form would have sent; anything else is
/// passed through as text and rejected by the decision service.
pub(crate) fn assignment_value(raw: &str) -> Value {
    if let Ok(whole) = raw.parse::<u64>() {
        return Value::from(whole);
    }
    if let Ok(signed) = raw.parse::<i64>() {
        return Value::from(signed);
    }
    match raw.parse::<f64>() {
        Ok(number) if number.is_finite() => Value::from(number),
        _ => Value::String(raw.to_string()),
    }
}
