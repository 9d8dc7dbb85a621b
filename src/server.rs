use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::artifacts::Artifacts;
use crate::error::PredictError;
use crate::form::{self, FormFields};
use crate::page::{self, PageContext};
use crate::predict;

pub type SharedArtifacts = Arc<Artifacts>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    dataset_loaded: bool,
    model_loaded: bool,
}

pub fn router(artifacts: SharedArtifacts) -> Router {
    Router::new()
        .route("/", get(home).post(submit))
        .route("/health", get(health))
        .with_state(artifacts)
}

pub async fn serve(artifacts: SharedArtifacts, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, ready = artifacts.is_ready(), "Listening");
    axum::serve(listener, router(artifacts))
        .await
        .context("server stopped unexpectedly")
}

fn render(context: &PageContext) -> Result<Html<String>, StatusCode> {
    page::render_home(context).map(Html).map_err(|err| {
        error!(error = %err, "Failed to render page");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn home(State(artifacts): State<SharedArtifacts>) -> Result<Html<String>, StatusCode> {
    let context = PageContext {
        hint: page::missing_hint(&artifacts.missing()),
        ..PageContext::default()
    };
    render(&context)
}

async fn submit(
    State(artifacts): State<SharedArtifacts>,
    Form(fields): Form<FormFields>,
) -> Result<Html<String>, StatusCode> {
    let request_id = Uuid::new_v4();
    let outcome = match predict::predict_form(&artifacts, &fields) {
        Ok(prediction) => {
            info!(
                %request_id,
                churn = prediction.churn,
                probability = prediction.probability,
                "Prediction served"
            );
            prediction.to_outcome()
        }
        Err(err) => {
            match &err {
                PredictError::MissingArtifact { .. } => {
                    warn!(%request_id, error = %err, "Prediction requested before artifacts loaded")
                }
                PredictError::InvalidInput { .. } => {
                    info!(%request_id, error = %err, "Rejected invalid input")
                }
                PredictError::FeatureMismatch(_) => {
                    warn!(%request_id, error = %err, "Features did not match the model")
                }
            }
            err.to_outcome()
        }
    };

    let context = PageContext {
        hint: None,
        outcome: Some(outcome),
        fields: form::echo_fields(&fields),
    };
    render(&context)
}

async fn health(State(artifacts): State<SharedArtifacts>) -> Response {
    let ready = artifacts.is_ready();
    let body = HealthResponse {
        status: if ready { "ready" } else { "not_ready" },
        dataset_loaded: artifacts.dataset.is_some(),
        model_loaded: artifacts.model.is_some(),
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::form::tests::sample_form;

    fn shipped() -> SharedArtifacts {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        Arc::new(Artifacts::load(
            &root.join("first_telc.csv"),
            &root.join("model.json"),
        ))
    }

    fn empty() -> SharedArtifacts {
        Arc::new(Artifacts::new(None, None, "first_telc.csv", "model.json"))
    }

    #[tokio::test]
    async fn home_warns_about_missing_files() {
        let Html(body) = home(State(empty())).await.unwrap();
        assert!(body.contains("Warning: Missing files → first_telc.csv, model.json."));
    }

    #[tokio::test]
    async fn home_is_clean_when_ready() {
        let Html(body) = home(State(shipped())).await.unwrap();
        assert!(!body.contains("Warning"));
    }

    #[tokio::test]
    async fn submit_without_artifacts_is_not_ready() {
        let Html(body) = submit(State(empty()), Form(sample_form())).await.unwrap();
        assert!(body.contains("Server not ready"));
        assert!(body.contains("value=\"70.35\""));
    }

    #[tokio::test]
    async fn submit_returns_label_and_confidence() {
        let Html(body) = submit(State(shipped()), Form(sample_form())).await.unwrap();
        assert!(
            body.contains("This customer is likely to be churned!!")
                || body.contains("This customer is likely to continue!!")
        );
        let start = body.find("Confidence: ").unwrap() + "Confidence: ".len();
        let end = start + body[start..].find('%').unwrap();
        let percent: f64 = body[start..end].parse().unwrap();
        assert!((0.0..=100.0).contains(&percent));
        assert_eq!(body[start..end].split('.').nth(1).map(str::len), Some(2));
    }

    #[tokio::test]
    async fn shipped_model_flags_month_to_month_newcomer() {
        let Html(body) = submit(State(shipped()), Form(sample_form())).await.unwrap();
        assert!(body.contains("This customer is likely to be churned!!"));
        assert!(body.contains("Confidence: 67.92%"));
    }

    #[tokio::test]
    async fn submit_reports_invalid_numbers() {
        let mut fields = sample_form();
        fields.insert("query2".to_string(), "abc".to_string());
        let Html(body) = submit(State(shipped()), Form(fields)).await.unwrap();
        assert!(body.contains("Invalid input"));
        assert!(body.contains("Please check your numbers. Error: MonthlyCharges"));
    }

    #[tokio::test]
    async fn submit_rejects_blank_categories() {
        let mut fields = sample_form();
        fields.insert("query4".to_string(), String::new());
        fields.insert("query16".to_string(), String::new());
        let Html(body) = submit(State(shipped()), Form(fields)).await.unwrap();
        assert!(body.contains("Invalid input"));
        assert!(body.contains("Error: gender: must not be blank"));
        assert!(!body.contains("Confidence"));
    }

    #[tokio::test]
    async fn health_reflects_readiness() {
        let response = health(State(shipped())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = health(State(empty())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
