use std::collections::HashMap;
use std::str::FromStr;

use crate::error::PredictError;
use crate::models::{Categories, Observation};

/// Form keys and the attribute each one carries, in form order.
pub const FORM_FIELDS: [(&str, &str); 19] = [
    ("query1", "SeniorCitizen"),
    ("query2", "MonthlyCharges"),
    ("query3", "TotalCharges"),
    ("query4", "gender"),
    ("query5", "Partner"),
    ("query6", "Dependents"),
    ("query7", "PhoneService"),
    ("query8", "MultipleLines"),
    ("query9", "InternetService"),
    ("query10", "OnlineSecurity"),
    ("query11", "OnlineBackup"),
    ("query12", "DeviceProtection"),
    ("query13", "TechSupport"),
    ("query14", "StreamingTV"),
    ("query15", "StreamingMovies"),
    ("query16", "Contract"),
    ("query17", "PaperlessBilling"),
    ("query18", "PaymentMethod"),
    ("query19", "tenure"),
];

/// Raw submitted fields, keyed `query1` to `query19`.
pub type FormFields = HashMap<String, String>;

/// Coerce a submission into a typed observation. Stops at the first field
/// that is missing, blank or does not parse. Every value is trimmed.
pub fn parse_observation(form: &FormFields) -> Result<Observation, PredictError> {
    let reader = FieldReader { form };
    Ok(Observation {
        senior_citizen: reader.number(0)?,
        monthly_charges: reader.number(1)?,
        total_charges: reader.number(2)?,
        categories: Categories {
            gender: reader.text(3)?,
            partner: reader.text(4)?,
            dependents: reader.text(5)?,
            phone_service: reader.text(6)?,
            multiple_lines: reader.text(7)?,
            internet_service: reader.text(8)?,
            online_security: reader.text(9)?,
            online_backup: reader.text(10)?,
            device_protection: reader.text(11)?,
            tech_support: reader.text(12)?,
            streaming_tv: reader.text(13)?,
            streaming_movies: reader.text(14)?,
            contract: reader.text(15)?,
            paperless_billing: reader.text(16)?,
            payment_method: reader.text(17)?,
        },
        tenure: reader.number(18)?,
    })
}

/// The nineteen submitted values in form order, blank where absent, so the
/// page can refill the form.
pub fn echo_fields(form: &FormFields) -> Vec<(&'static str, String)> {
    FORM_FIELDS
        .iter()
        .map(|(key, _)| (*key, form.get(*key).cloned().unwrap_or_default()))
        .collect()
}

struct FieldReader<'a> {
    form: &'a FormFields,
}

impl FieldReader<'_> {
    fn raw(&self, slot: usize) -> Result<&str, PredictError> {
        let (key, attribute) = FORM_FIELDS[slot];
        self.form
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| PredictError::invalid(attribute, format!("missing form field {key}")))
    }

    fn text(&self, slot: usize) -> Result<String, PredictError> {
        let (_, attribute) = FORM_FIELDS[slot];
        let value = self.raw(slot)?.trim();
        if value.is_empty() {
            return Err(PredictError::invalid(attribute, "must not be blank"));
        }
        Ok(value.to_string())
    }

    fn number<T>(&self, slot: usize) -> Result<T, PredictError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let (_, attribute) = FORM_FIELDS[slot];
        let raw = self.raw(slot)?;
        raw.trim().parse().map_err(|err: T::Err| {
            PredictError::invalid(attribute, format!("could not parse {raw:?}: {err}"))
        })
    }
}
