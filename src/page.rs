use std::sync::OnceLock;

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;
use tracing::error;

use crate::form::FORM_FIELDS;
use crate::models::Outcome;

const HOME_TEMPLATE: &str = include_str!("../templates/home.html");

/// Everything the home page can show.
#[derive(Debug, Default)]
pub struct PageContext {
    pub hint: Option<String>,
    pub outcome: Option<Outcome>,
    pub fields: Vec<(&'static str, String)>,
}

pub fn missing_hint(missing: &[String]) -> Option<String> {
    if missing.is_empty() {
        return None;
    }
    Some(format!(
        "Warning: Missing files → {}. Predictions will fail until these are fixed.",
        missing.join(", ")
    ))
}

#[derive(Debug, Serialize)]
struct FieldView<'a> {
    key: &'a str,
    label: &'a str,
    value: &'a str,
}

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        if let Err(err) = env.add_template("home.html", HOME_TEMPLATE) {
            error!(error = %err, "home.html failed to compile");
        }
        env
    })
}

/// Render the form page. Every interpolated value is HTML-escaped.
pub fn render_home(context: &PageContext) -> Result<String, minijinja::Error> {
    let fields: Vec<FieldView> = FORM_FIELDS
        .iter()
        .map(|&(key, label)| FieldView {
            key,
            label,
            value: context
                .fields
                .iter()
                .find(|(field, _)| *field == key)
                .map(|(_, value)| value.as_str())
                .unwrap_or(""),
        })
        .collect();

    environment().get_template("home.html")?.render(context! {
        hint => &context.hint,
        outcome => &context.outcome,
        fields => &fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_page_has_all_fields_and_no_output() {
        let html = render_home(&PageContext::default()).unwrap();
        for (key, _) in FORM_FIELDS {
            assert!(html.contains(&format!("name=\"{key}\" value=\"\"")));
        }
        assert!(!html.contains("output1"));
        assert!(!html.contains("class=\"hint\""));
    }

    #[test]
    fn hint_lists_missing_files() {
        let hint = missing_hint(&["first_telc.csv".to_string(), "model.json".to_string()]);
        assert_eq!(
            hint.as_deref(),
            Some("Warning: Missing files → first_telc.csv, model.json. Predictions will fail until these are fixed.")
        );
        assert_eq!(missing_hint(&[]), None);
    }

    #[test]
    fn outcome_and_echoed_values_are_rendered() {
        let context = PageContext {
            hint: None,
            outcome: Some(Outcome {
                headline: "This customer is likely to continue!!".to_string(),
                detail: "Confidence: 12.50%".to_string(),
            }),
            fields: vec![("query16", "Month-to-month".to_string())],
        };
        let html = render_home(&context).unwrap();
        assert!(html.contains("This customer is likely to continue!!"));
        assert!(html.contains("Confidence: 12.50%"));
        assert!(html.contains("name=\"query16\" value=\"Month-to-month\""));
    }

    #[test]
    fn echoed_input_is_escaped() {
        let context = PageContext {
            fields: vec![("query4", "\"><script>alert(1)</script>".to_string())],
            ..PageContext::default()
        };
        let html = render_home(&context).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;alert(1)&lt;"));
    }

    #[test]
    fn hint_and_outcome_are_escaped_too() {
        let context = PageContext {
            hint: Some("<b>model.json</b>".to_string()),
            outcome: Some(Outcome {
                headline: "Invalid input".to_string(),
                detail: "Error: gender: <i>".to_string(),
            }),
            ..PageContext::default()
        };
        let html = render_home(&context).unwrap();
        assert!(html.contains("&lt;b&gt;model.json&lt;"));
        assert!(html.contains("Error: gender: &lt;i&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn labels_follow_form_order() {
        let html = render_home(&PageContext::default()).unwrap();
        let senior = html.find("SeniorCitizen</label>").unwrap();
        let tenure = html.find("tenure</label>").unwrap();
        assert!(senior < tenure);
        assert!(html.contains("<form method=\"post\" action=\"/\">"));
    }
}
