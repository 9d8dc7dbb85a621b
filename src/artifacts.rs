use std::path::Path;

use tracing::{error, info};

use crate::classifier::{Classifier, Model};
use crate::dataset::ReferenceDataset;

/// Read-only inputs loaded once at startup. Either one may be absent; the
/// service then keeps answering with a not-ready message.
#[derive(Debug)]
pub struct Artifacts {
    pub dataset: Option<ReferenceDataset>,
    pub model: Option<Model>,
    dataset_name: String,
    model_name: String,
}

impl Artifacts {
    pub fn load(dataset_path: &Path, model_path: &Path) -> Self {
        info!(
            dataset = %dataset_path.display(),
            dataset_exists = dataset_path.exists(),
            model = %model_path.display(),
            model_exists = model_path.exists(),
            "Loading artifacts"
        );

        let dataset = match ReferenceDataset::from_path(dataset_path) {
            Ok(dataset) => {
                info!(rows = dataset.rows().len(), "Reference dataset loaded");
                Some(dataset)
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "Failed to load reference dataset");
                None
            }
        };

        let model = match Model::from_path(model_path) {
            Ok(model) => {
                info!(
                    kind = model.kind(),
                    features = model.feature_names().len(),
                    "Model loaded"
                );
                Some(model)
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "Failed to load model");
                None
            }
        };

        Self::new(dataset, model, file_name(dataset_path), file_name(model_path))
    }

    pub fn new(
        dataset: Option<ReferenceDataset>,
        model: Option<Model>,
        dataset_name: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            dataset,
            model,
            dataset_name: dataset_name.into(),
            model_name: model_name.into(),
        }
    }

    /// Names of the artifacts that failed to load.
    pub fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.dataset.is_none() {
            missing.push(self.dataset_name.clone());
        }
        if self.model.is_none() {
            missing.push(self.model_name.clone());
        }
        missing
    }

    pub fn is_ready(&self) -> bool {
        self.dataset.is_some() && self.model.is_some()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
