use anyhow::Context;
use tracing::debug;

use crate::artifacts::Artifacts;
use crate::classifier::Classifier;
use crate::dataset::ReferenceDataset;
use crate::error::PredictError;
use crate::features;
use crate::form::{self, FormFields};
use crate::models::{Observation, Outcome, Prediction};

/// Score one form submission against the loaded artifacts.
pub fn predict_form(artifacts: &Artifacts, form: &FormFields) -> Result<Prediction, PredictError> {
    let (Some(dataset), Some(model)) = (&artifacts.dataset, &artifacts.model) else {
        return Err(PredictError::MissingArtifact {
            missing: artifacts.missing(),
        });
    };

    let observation = form::parse_observation(form)?;
    predict_observation(&observation, dataset, model)
}

/// Score an observation given as a JSON object keyed by attribute name.
/// Malformed JSON is an error; a failed prediction becomes its outcome text.
pub fn predict_json<C: Classifier>(
    raw: &str,
    dataset: &ReferenceDataset,
    model: &C,
) -> anyhow::Result<Outcome> {
    let observation: Observation =
        serde_json::from_str(raw).context("failed to parse observation")?;
    Ok(match predict_observation(&observation, dataset, model) {
        Ok(prediction) => prediction.to_outcome(),
        Err(err) => err.to_outcome(),
    })
}

pub fn predict_observation<C: Classifier>(
    observation: &Observation,
    dataset: &ReferenceDataset,
    model: &C,
) -> Result<Prediction, PredictError> {
    debug!(
        tenure = observation.tenure,
        monthly_charges = observation.monthly_charges,
        total_charges = observation.total_charges,
        "Aligning observation"
    );
    let features = features::align(observation, dataset)?;
    debug!(columns = features.len(), "Features aligned");
    model.score(&features)
}
