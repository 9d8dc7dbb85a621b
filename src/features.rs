use crate::dataset::ReferenceDataset;
use crate::error::PredictError;
use crate::models::{FeatureVector, Observation, CATEGORY_COLUMNS};

pub const TENURE_BUCKETS: [&str; 6] = [
    "1 - 12", "13 - 24", "25 - 36", "37 - 48", "49 - 60", "61 - 72",
];

/// Right-open twelve month bins starting at one month. Anything outside
/// `[1, 73)` has no bucket.
pub fn tenure_bucket(tenure: i64) -> Option<&'static str> {
    match tenure {
        1..=12 => Some(TENURE_BUCKETS[0]),
        13..=24 => Some(TENURE_BUCKETS[1]),
        25..=36 => Some(TENURE_BUCKETS[2]),
        37..=48 => Some(TENURE_BUCKETS[3]),
        49..=60 => Some(TENURE_BUCKETS[4]),
        61..=72 => Some(TENURE_BUCKETS[5]),
        _ => None,
    }
}

/// Encode one observation exactly as it would come out of one-hot encoding
/// the reference table with the observation appended as its last row.
///
/// `SeniorCitizen` is numeric and passes through first. Each categorical
/// column then contributes one indicator per level, levels sorted, drawn
/// from the reference rows plus the observation itself. `tenure_group`
/// always carries all six bucket labels. A level the reference never saw,
/// including a blank one, therefore shows up as an extra column, which the
/// model rejects. Values are compared trimmed, as the reference is loaded.
pub fn align(
    observation: &Observation,
    dataset: &ReferenceDataset,
) -> Result<FeatureVector, PredictError> {
    let bucket = tenure_bucket(observation.tenure).ok_or_else(|| {
        PredictError::invalid(
            "tenure",
            format!(
                "{} months is outside the supported range 1 to 72",
                observation.tenure
            ),
        )
    })?;

    let mut columns = vec!["SeniorCitizen".to_string()];
    let mut values = vec![observation.senior_citizen as f64];

    for (index, (name, value)) in CATEGORY_COLUMNS
        .iter()
        .zip(observation.categories.values())
        .enumerate()
    {
        let value = value.trim();
        let reference = dataset.levels(index);
        let mut levels: Vec<&str> = reference.iter().map(String::as_str).collect();
        if !reference.contains(value) {
            let at = levels.partition_point(|level| *level < value);
            levels.insert(at, value);
        }

        for level in levels {
            columns.push(format!("{name}_{level}"));
            values.push(indicator(level == value));
        }
    }

    for label in TENURE_BUCKETS {
        columns.push(format!("tenure_group_{label}"));
        values.push(indicator(label == bucket));
    }

    Ok(FeatureVector { columns, values })
}

/// Column names the reference dataset encodes to, assuming every observed
/// level is already in the reference. This is the schema a model has to be
/// fit on.
pub fn expected_columns(dataset: &ReferenceDataset) -> Vec<String> {
    let mut columns = vec!["SeniorCitizen".to_string()];
    for (index, name) in CATEGORY_COLUMNS.iter().enumerate() {
        for level in dataset.levels(index) {
            columns.push(format!("{name}_{level}"));
        }
    }
    for label in TENURE_BUCKETS {
        columns.push(format!("tenure_group_{label}"));
    }
    columns
}

fn indicator(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}
