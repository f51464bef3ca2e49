#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Context, Result};
use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    grade::Evaluator,
    request::{RawRequest, RequestError},
    util,
};

/// Minimal grading form served at `/`.
const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Answer Grader</title></head>
<body>
<h1>Answer Grader</h1>
<form method="post" action="/evaluate">
  <p><label>Question<br><textarea name="question_text" rows="3" cols="80" required></textarea></label></p>
  <p><label>Student answer<br><textarea name="student_answer" rows="8" cols="80" required></textarea></label></p>
  <p><label>Reference answer (optional)<br><textarea name="reference_answer" rows="4" cols="80"></textarea></label></p>
  <p><label>Minimum words <input type="number" name="min_words" min="0" value="0"></label>
     <label>Maximum words <input type="number" name="max_words" min="0" value="0"></label></p>
  <p><button type="submit">Evaluate</button></p>
</form>
</body>
</html>
"#;

/// State shared by all handlers.
#[derive(Clone)]
struct AppState {
    /// The grader.
    evaluator: Evaluator,
}

/// Failures surfaced to HTTP clients as `{"error": ...}`.
#[derive(Debug)]
enum ApiError {
    /// The request failed validation.
    Request(RequestError),
    /// The evaluation task did not complete.
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Request(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred on the server.".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Builds the application router.
pub fn router(evaluator: Evaluator) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/evaluate", post(evaluate))
        .route("/health", get(health))
        .with_state(AppState { evaluator })
}

/// Binds `bind` and serves until the process is stopped.
pub async fn serve(evaluator: Evaluator, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Could not bind to {bind}"))?;
    tracing::info!("Listening on http://{bind}");
    axum::serve(listener, router(evaluator))
        .await
        .context("HTTP server stopped unexpectedly")
}

/// Serves the grading form.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Liveness check.
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Validates a submitted form and grades it on the blocking pool.
async fn evaluate(
    State(state): State<AppState>,
    Form(raw): Form<RawRequest>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, "Received evaluation request");

    let input = raw.into_grading_input().map_err(|e| {
        tracing::warn!(%request_id, "Validation error: {e}");
        ApiError::Request(e)
    })?;
    tracing::info!(
        %request_id,
        answer = %util::snippet(&input.student_answer, 50),
        requirement = ?input.word_count_requirement,
        "Constructed grading input"
    );

    let evaluator = state.evaluator.clone();
    let output = tokio::task::spawn_blocking(move || evaluator.evaluate(&input))
        .await
        .map_err(|e| {
            tracing::error!(%request_id, "Evaluation task failed: {e}");
            ApiError::Internal
        })?;

    tracing::info!(
        %request_id,
        total = output.total_score,
        review = output.needs_teacher_review,
        "Evaluation result"
    );
    Ok(Json(output).into_response())
}
