use thiserror::Error;

use crate::models::Outcome;

/// Failures that end a prediction request. None of them touch the shared
/// artifacts, so the process keeps serving after any of them.
#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("missing artifacts: {}", .missing.join(", "))]
    MissingArtifact { missing: Vec<String> },
    #[error("{field}: {detail}")]
    InvalidInput { field: String, detail: String },
    #[error("{0}")]
    FeatureMismatch(String),
}

impl PredictError {
    pub fn invalid(field: &str, detail: impl Into<String>) -> Self {
        PredictError::InvalidInput {
            field: field.to_string(),
            detail: detail.into(),
        }
    }

    pub fn to_outcome(&self) -> Outcome {
        match self {
            PredictError::MissingArtifact { missing } => Outcome {
                headline: "Server not ready".to_string(),
                detail: match missing.as_slice() {
                    [only] => format!("{only} could not be loaded. Check console logs."),
                    _ => format!(
                        "Either {} could not be loaded. Check console logs.",
                        missing.join(" or ")
                    ),
                },
            },
            PredictError::InvalidInput { .. } => Outcome {
                headline: "Invalid input".to_string(),
                detail: format!("Please check your numbers. Error: {self}"),
            },
            PredictError::FeatureMismatch(detail) => Outcome {
                headline: "Prediction failed".to_string(),
                detail: format!("Error while preparing features or predicting: {detail}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_names_missing_files() {
        let err = PredictError::MissingArtifact {
            missing: vec!["first_telc.csv".to_string(), "model.json".to_string()],
        };
        let outcome = err.to_outcome();
        assert_eq!(outcome.headline, "Server not ready");
        assert_eq!(
            outcome.detail,
            "Either first_telc.csv or model.json could not be loaded. Check console logs."
        );
    }

    #[test]
    fn not_ready_with_one_missing_file() {
        let err = PredictError::MissingArtifact {
            missing: vec!["model.json".to_string()],
        };
        assert_eq!(
            err.to_outcome().detail,
            "model.json could not be loaded. Check console logs."
        );
    }

    #[test]
    fn invalid_input_carries_field_and_detail() {
        let err = PredictError::invalid("MonthlyCharges", "invalid float literal");
        let outcome = err.to_outcome();
        assert_eq!(outcome.headline, "Invalid input");
        assert_eq!(
            outcome.detail,
            "Please check your numbers. Error: MonthlyCharges: invalid float literal"
        );
    }

    #[test]
    fn mismatch_is_a_generic_failure() {
        let outcome = PredictError::FeatureMismatch("unexpected column x".to_string()).to_outcome();
        assert_eq!(outcome.headline, "Prediction failed");
        assert!(outcome.detail.ends_with("unexpected column x"));
    }
}
