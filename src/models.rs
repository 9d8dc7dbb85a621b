use serde::{Deserialize, Serialize};

/// One historical customer row from the reference dataset.
///
/// Numeric cells that fail to parse are kept as `None` so a dirty export
/// (blank `TotalCharges`, for instance) still loads. Columns not named here,
/// such as `customerID` and `Churn`, are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferenceRow {
    #[serde(rename = "SeniorCitizen", deserialize_with = "csv::invalid_option")]
    pub senior_citizen: Option<i64>,
    #[serde(rename = "MonthlyCharges", deserialize_with = "csv::invalid_option")]
    pub monthly_charges: Option<f64>,
    #[serde(rename = "TotalCharges", deserialize_with = "csv::invalid_option")]
    pub total_charges: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub tenure: Option<i64>,
    #[serde(flatten)]
    pub categories: Categories,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub unbucketed: usize,
    pub buckets: Vec<(&'static str, usize)>,
    pub mean_monthly_charges: Option<f64>,
    pub mean_total_charges: Option<f64>,
}

/// The fifteen string attributes, in encoding order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Categories {
    pub gender: String,
    #[serde(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    #[serde(rename = "PhoneService")]
    pub phone_service: String,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: String,
    #[serde(rename = "InternetService")]
    pub internet_service: String,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: String,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: String,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: String,
    #[serde(rename = "TechSupport")]
    pub tech_support: String,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: String,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
}

pub const CATEGORY_COLUMNS: [&str; 15] = [
    "gender",
    "Partner",
    "Dependents",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
];

impl Categories {
    /// Values in the same order as [`CATEGORY_COLUMNS`].
    pub fn values(&self) -> [&str; 15] {
        [
            self.gender.as_str(),
            self.partner.as_str(),
            self.dependents.as_str(),
            self.phone_service.as_str(),
            self.multiple_lines.as_str(),
            self.internet_service.as_str(),
            self.online_security.as_str(),
            self.online_backup.as_str(),
            self.device_protection.as_str(),
            self.tech_support.as_str(),
            self.streaming_tv.as_str(),
            self.streaming_movies.as_str(),
            self.contract.as_str(),
            self.paperless_billing.as_str(),
            self.payment_method.as_str(),
        ]
    }
}

/// A single customer submitted for scoring.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Observation {
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: i64,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
    pub tenure: i64,
    #[serde(flatten)]
    pub categories: Categories,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| self.values[index])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub churn: bool,
    pub probability: f64,
}

/// What the page shows after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub headline: String,
    pub detail: String,
}

impl Prediction {
    pub fn to_outcome(&self) -> Outcome {
        let headline = if self.churn {
            "This customer is likely to be churned!!"
        } else {
            "This customer is likely to continue!!"
        };
        Outcome {
            headline: headline.to_string(),
            detail: format!("Confidence: {:.2}%", self.probability * 100.0),
        }
    }
}
