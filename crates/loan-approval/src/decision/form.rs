use serde::Serialize;

use crate::model::FeatureSchema;

const FORM_TITLE: &str = "Loan Approval Prediction";
const FORM_SUBTITLE: &str = "Fill out the applicant information below";

const BINARY_FEATURES: [&str; 5] = [
    "Gender",
    "Married",
    "Education",
    "Self_Employed",
    "Credit_History",
];
const AMOUNT_MARKERS: [&str; 3] = ["income", "amount", "term"];

fn known_label(feature: &str) -> Option<&'static str> {
    let label = match feature {
        "Gender" => "Gender (0 = Male, 1 = Female)",
        "Married" => "Married (0 = No, 1 = Yes)",
        "Education" => "Education (0 = Not Graduate, 1 = Graduate)",
        "Self_Employed" => "Self Employed (0 = No, 1 = Yes)",
        "ApplicantIncome" => "Applicant Income (Monthly)",
        "CoapplicantIncome" => "Co-applicant Income (Monthly)",
        "LoanAmount" => "Loan Amount (in Thousands)",
        "Loan_Amount_Term" => "Loan Term (Days)",
        "Credit_History" => "Credit History (0 = Bad, 1 = Good)",
        "Property_Area" => "Property Area (0 = Rural, 1 = Semi-Urban, 2 = Urban)",
        _ => return None,
    };
    Some(label)
}

/// Input control used to collect a feature value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldWidget {
    /// Free entry of a whole number no smaller than `min`.
    Number { min: u64, step: u64 },
    /// Constrained choice among enumerated codes.
    Choice { options: Vec<u64> },
}

impl FieldWidget {
    pub fn accepts(&self, value: u64) -> bool {
        match self {
            FieldWidget::Number { min, .. } => value >= *min,
            FieldWidget::Choice { options } => options.contains(&value),
        }
    }

    pub(crate) fn describe_domain(&self) -> String {
        match self {
            FieldWidget::Number { min, .. } => format!("must be at least {min}"),
            FieldWidget::Choice { options } => {
                let options: Vec<String> = options.iter().map(u64::to_string).collect();
                format!("must be one of {}", options.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormColumn {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub widget: FieldWidget,
    pub column: FormColumn,
}

impl FormField {
    /// Amount-like names win over the binary list, which wins over property codes; anything
    /// unrecognized falls back to a plain number entry.
    pub fn for_feature(feature: &str) -> Self {
        let lowered = feature.to_ascii_lowercase();
        let number = FieldWidget::Number { min: 0, step: 1 };

        let (widget, column) = if AMOUNT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            (number, FormColumn::Left)
        } else if BINARY_FEATURES.contains(&feature) {
            (
                FieldWidget::Choice {
                    options: vec![0, 1],
                },
                FormColumn::Right,
            )
        } else if lowered.contains("property") {
            (
                FieldWidget::Choice {
                    options: vec![0, 1, 2],
                },
                FormColumn::Right,
            )
        } else {
            (number, FormColumn::Left)
        };

        Self {
            name: feature.to_string(),
            label: known_label(feature).unwrap_or(feature).to_string(),
            widget,
            column,
        }
    }
}

/// Applicant form derived from the bundle's feature list, one field per feature in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSchema {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub fields: Vec<FormField>,
}

impl FormSchema {
    pub fn for_features(features: &FeatureSchema) -> Self {
        Self {
            title: FORM_TITLE,
            subtitle: FORM_SUBTITLE,
            fields: features
                .names()
                .iter()
                .map(|name| FormField::for_feature(name))
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }
}
