use std::collections::HashSet;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::error::PredictError;
use crate::models::{FeatureVector, Prediction};

/// A fitted binary classifier over named feature columns.
pub trait Classifier {
    /// Columns the classifier was fit on, in fit order.
    fn feature_names(&self) -> &[String];

    /// `[p_class0, p_class1]` for one aligned feature row.
    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], PredictError>;

    fn predict(&self, features: &FeatureVector) -> Result<u8, PredictError> {
        let [_, positive] = self.predict_proba(features)?;
        Ok(label(positive))
    }

    /// Label and positive-class probability from a single model call.
    fn score(&self, features: &FeatureVector) -> Result<Prediction, PredictError> {
        let [_, probability] = self.predict_proba(features)?;
        Ok(Prediction {
            churn: label(probability) == 1,
            probability,
        })
    }
}

/// Class 1 only above one half; a tie goes to class 0.
fn label(positive: f64) -> u8 {
    u8::from(positive > 0.5)
}

/// Serialized model artifact, usually `model.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Model {
    pub feature_names: Vec<String>,
    pub estimator: Estimator,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Estimator {
    Logistic {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    Forest {
        trees: Vec<Tree>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// Node 0 is the root. Splits send `x[feature] <= threshold` left.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: f64,
    },
}

impl Model {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open model artifact {}", path.display()))?;
        let model: Model = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse model artifact {}", path.display()))?;
        model
            .validate()
            .with_context(|| format!("invalid model artifact {}", path.display()))?;
        Ok(model)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let model: Model = serde_json::from_str(json).context("failed to parse model artifact")?;
        model.validate()?;
        Ok(model)
    }

    pub fn kind(&self) -> &'static str {
        match self.estimator {
            Estimator::Logistic { .. } => "logistic",
            Estimator::Forest { .. } => "forest",
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        let width = self.feature_names.len();
        if width == 0 {
            bail!("model declares no feature names");
        }
        let mut seen = HashSet::new();
        for name in self.feature_names.iter() {
            if !seen.insert(name.as_str()) {
                bail!("duplicate feature name {name}");
            }
        }

        match &self.estimator {
            Estimator::Logistic { coefficients, .. } => {
                if coefficients.len() != width {
                    bail!(
                        "expected {width} coefficients, found {}",
                        coefficients.len()
                    );
                }
            }
            Estimator::Forest { trees } => {
                if trees.is_empty() {
                    bail!("forest has no trees");
                }
                for (index, tree) in trees.iter().enumerate() {
                    tree.validate(width)
                        .with_context(|| format!("tree {index} is malformed"))?;
                }
            }
        }

        Ok(())
    }

    /// Reject rows whose columns differ from the fit columns in name or order.
    pub fn check_schema(&self, columns: &[String]) -> Result<(), PredictError> {
        if columns == self.feature_names.as_slice() {
            return Ok(());
        }

        let expected: HashSet<&str> = self.feature_names.iter().map(String::as_str).collect();
        let actual: HashSet<&str> = columns.iter().map(String::as_str).collect();

        if let Some(extra) = columns.iter().find(|name| !expected.contains(name.as_str())) {
            return Err(PredictError::FeatureMismatch(format!(
                "feature {extra:?} was not seen at fit time"
            )));
        }
        if let Some(missing) = self
            .feature_names
            .iter()
            .find(|name| !actual.contains(name.as_str()))
        {
            return Err(PredictError::FeatureMismatch(format!(
                "feature {missing:?} seen at fit time is missing"
            )));
        }

        let position = columns
            .iter()
            .zip(self.feature_names.iter())
            .position(|(got, want)| got != want)
            .unwrap_or(0);
        Err(PredictError::FeatureMismatch(format!(
            "feature names must be in the same order as at fit time (position {position}: expected {:?}, got {:?})",
            self.feature_names[position], columns[position]
        )))
    }
}

impl Classifier for Model {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], PredictError> {
        self.check_schema(&features.columns)?;
        let x = features.values.as_slice();

        let positive = match &self.estimator {
            Estimator::Logistic {
                intercept,
                coefficients,
            } => {
                let z = intercept
                    + coefficients
                        .iter()
                        .zip(x)
                        .map(|(weight, value)| weight * value)
                        .sum::<f64>();
                sigmoid(z)
            }
            Estimator::Forest { trees } => {
                trees.iter().map(|tree| tree.leaf(x)).sum::<f64>() / trees.len() as f64
            }
        };

        Ok([1.0 - positive, positive])
    }
}

impl Tree {
    fn validate(&self, width: usize) -> anyhow::Result<()> {
        if self.nodes.is_empty() {
            bail!("tree has no nodes");
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if feature >= width {
                        bail!("node {index} splits on feature {feature} of {width}");
                    }
                    // Children must come after their parent so walks terminate.
                    for child in [left, right] {
                        if child <= index || child >= self.nodes.len() {
                            bail!("node {index} has invalid child {child}");
                        }
                    }
                }
                Node::Leaf { proba } => {
                    if !(0.0..=1.0).contains(&proba) {
                        bail!("node {index} has probability {proba} outside [0, 1]");
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[feature] <= threshold { left } else { right };
                }
                Node::Leaf { proba } => return proba,
            }
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
