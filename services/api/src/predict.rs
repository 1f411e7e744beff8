use crate::infra::{assignment_value, load_decision_service, parse_assignment};
use clap::Args;
use loan_approval::config::AppConfig;
use loan_approval::decision::{ApplicantInput, DecisionView, FieldWidget, FormColumn, FormSchema};
use loan_approval::error::AppError;
use loan_approval::telemetry;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub(crate) struct PredictArgs {
    /// Model artifact to load (defaults to LOAN_MODEL_PATH)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// JSON object of feature values, keyed by feature name
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Feature value as NAME=VALUE; repeat for each feature. Overrides --input.
    #[arg(long = "value", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub(crate) values: Vec<(String, String)>,
    /// Print the decision as JSON instead of the form message
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FormArgs {
    /// Model artifact to load (defaults to LOAN_MODEL_PATH)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Print the form schema as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs {
        model,
        input,
        values,
        json,
    } = args;

    let config = command_config(model)?;
    let service = load_decision_service(&config.model.path)?;
    let applicant = build_applicant(input.as_deref(), values)?;
    let decision = service.decide(&applicant)?;

    if json {
        let payload = serde_json::to_string_pretty(&DecisionView::from(decision))
            .map_err(std::io::Error::from)?;
        println!("{payload}");
    } else {
        println!("{}", decision.message());
    }
    Ok(())
}

pub(crate) fn run_form(args: FormArgs) -> Result<(), AppError> {
    let config = command_config(args.model)?;
    let service = load_decision_service(&config.model.path)?;
    let form = service.form();

    if args.json {
        let payload = serde_json::to_string_pretty(form).map_err(std::io::Error::from)?;
        println!("{payload}");
    } else {
        print!("{}", render_form(form));
    }
    Ok(())
}

/// Configuration for one-shot commands, with telemetry on stderr so stdout carries only the result.
pub(crate) fn command_config(model: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(model) = model {
        config.model.path = model;
    }

    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn build_applicant(
    input: Option<&Path>,
    values: Vec<(String, String)>,
) -> Result<ApplicantInput, AppError> {
    let mut applicant = match input {
        Some(path) => {
            let bytes = std::fs::read(path)?;
            serde_json::from_slice::<ApplicantInput>(&bytes).map_err(|source| AppError::Input {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => ApplicantInput::new(),
    };

    for (name, raw) in values {
        applicant.insert(name, assignment_value(&raw));
    }
    Ok(applicant)
}

pub(crate) fn render_form(form: &FormSchema) -> String {
    let mut out = format!("{}\n{}\n", form.title, form.subtitle);

    for (heading, column) in [("Amounts", FormColumn::Left), ("Codes", FormColumn::Right)] {
        let fields: Vec<_> = form
            .fields
            .iter()
            .filter(|field| field.column == column)
            .collect();
        if fields.is_empty() {
            continue;
        }

        out.push_str(&format!("\n{heading}:\n"));
        for field in fields {
            let entry = match &field.widget {
                FieldWidget::Number { min, step } => format!("number >= {min} (step {step})"),
                FieldWidget::Choice { options } => {
                    let options: Vec<String> = options.iter().map(u64::to_string).collect();
                    format!("one of {}", options.join(" / "))
                }
            };
            out.push_str(&format!("  - {} [{}]: {}\n", field.label, field.name, entry));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_approval::model::FeatureSchema;
    use serde_json::Value;
    use std::io::Write;

    #[test]
    fn command_line_values_override_input_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(br#"{ "Gender": 1, "LoanAmount": 100 }"#)
            .expect("input written");

        let applicant = build_applicant(
            Some(file.path()),
            vec![("LoanAmount".to_string(), "128".to_string())],
        )
        .expect("applicant builds");

        assert_eq!(applicant.get("Gender"), Some(&Value::from(1u64)));
        assert_eq!(applicant.get("LoanAmount"), Some(&Value::from(128u64)));
    }

    #[test]
    fn malformed_input_file_is_an_input_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[1, 2, 3]").expect("input written");

        let error = build_applicant(Some(file.path()), Vec::new()).expect_err("array rejected");

        assert!(matches!(error, AppError::Input { ref path, .. } if path == file.path()));
        assert!(error.to_string().starts_with("invalid applicant input in"));
    }

    #[test]
    fn commands_install_telemetry_and_honor_model_override() {
        let config = command_config(Some(PathBuf::from("models/override.json")))
            .expect("command config loads");

        assert_eq!(config.model.path, PathBuf::from("models/override.json"));
        assert!(matches!(
            telemetry::init(&config.telemetry),
            Err(loan_approval::telemetry::TelemetryError::Subscriber(_))
        ));
    }

    #[test]
    fn rendered_form_groups_amounts_and_codes() {
        let features = FeatureSchema::new(["Gender", "ApplicantIncome", "Property_Area"])
            .expect("valid features");
        let rendered = render_form(&FormSchema::for_features(&features));

        let amounts = rendered.find("Amounts:").expect("amounts section");
        let codes = rendered.find("Codes:").expect("codes section");
        let income = rendered.find("[ApplicantIncome]").expect("income listed");
        let area = rendered.find("[Property_Area]").expect("area listed");
        assert!(amounts < income && income < codes && codes < area);
        assert!(rendered.contains("one of 0 / 1 / 2"));
    }
}
