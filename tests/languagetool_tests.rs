use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use aigrade::{
    Evaluator, GradingInput,
    engines::{Embedder, GrammarCheck, GrammarChecker, LanguageTool},
};
use anyhow::Result;
use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Client;
use serde_json::{Value, json};
use tokio::runtime::{Builder, Runtime};

/// Requests seen by the fake LanguageTool server.
#[derive(Default)]
struct Hits {
    languages: AtomicUsize,
    checks:    AtomicUsize,
}

/// A LanguageTool stand-in running on its own runtime.
struct FakeServer {
    runtime:  Runtime,
    base_url: String,
    hits:     Arc<Hits>,
}

impl FakeServer {
    fn start() -> Self {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("runtime");
        let hits = Arc::new(Hits::default());
        let app = Router::new()
            .route("/v2/languages", get(languages))
            .route("/v2/check", post(check))
            .with_state(Arc::clone(&hits));

        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        runtime.spawn(async move { axum::serve(listener, app).await });

        Self {
            runtime,
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    fn tool(&self, language: &str) -> Arc<LanguageTool> {
        Arc::new(LanguageTool::new(self.base_url.clone(), language, Client::new()))
    }

    /// Runs `check` on the blocking pool, the way the CLI and web server do.
    fn check(&self, tool: &Arc<LanguageTool>, text: &'static str) -> Result<GrammarCheck> {
        let tool = Arc::clone(tool);
        self.runtime
            .block_on(self.runtime.spawn_blocking(move || tool.check(text)))
            .expect("join")
    }
}

async fn languages(State(hits): State<Arc<Hits>>) -> Json<Value> {
    hits.languages.fetch_add(1, Ordering::SeqCst);
    // keep the handshake slow enough for concurrent callers to pile up
    tokio::time::sleep(Duration::from_millis(100)).await;
    Json(json!([
        { "name": "English (US)", "code": "en", "longCode": "en-US" },
        { "name": "German (Germany)", "code": "de", "longCode": "de-DE" }
    ]))
}

async fn check(State(hits): State<Arc<Hits>>, Form(form): Form<HashMap<String, String>>) -> Response {
    hits.checks.fetch_add(1, Ordering::SeqCst);
    let text = form.get("text").cloned().unwrap_or_default();

    if form.get("language").map(String::as_str) != Some("en-US") {
        return (StatusCode::BAD_REQUEST, "unexpected language").into_response();
    }
    if text.contains("explode") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
    }
    if !text.contains("plantz") {
        return Json(json!({ "software": { "name": "LanguageTool" }, "matches": [] })).into_response();
    }

    Json(json!({
        "software": { "name": "LanguageTool", "version": "6.4" },
        "language": { "name": "English (US)", "code": "en-US" },
        "matches": [
            {
                "message": "Possible spelling mistake found.",
                "shortMessage": "Spelling mistake",
                "replacements": [{ "value": "plants" }, { "value": "planets" }],
                "offset": 0,
                "length": 6,
                "context": { "text": text, "offset": 0, "length": 6 },
                "sentence": text,
                "rule": {
                    "id": "MORFOLOGIK_RULE_EN_US",
                    "description": "Possible Typo",
                    "issueType": "misspelling",
                    "category": { "id": "TYPOS", "name": "Possible Typo" }
                }
            },
            {
                "message": "This sentence does not start with an uppercase letter.",
                "replacements": [{ "value": "Plantz" }],
                "offset": 0,
                "length": 6,
                "context": { "text": text, "offset": 0, "length": 6 },
                "rule": { "id": "UPPERCASE_SENTENCE_START" }
            }
        ]
    }))
    .into_response()
}

#[test]
fn concurrent_first_use_shakes_hands_once() {
    let server = FakeServer::start();
    let tool = server.tool("en");

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let tool = Arc::clone(&tool);
            server
                .runtime
                .spawn_blocking(move || tool.check("plantz use light"))
        })
        .collect();
    for task in tasks {
        let result = server.runtime.block_on(task).expect("join").expect("check");
        assert!(matches!(result, GrammarCheck::Completed { count: 2, .. }), "{result:?}");
    }

    assert!(tool.is_initialized());
    assert_eq!(server.hits.languages.load(Ordering::SeqCst), 1);
    assert_eq!(server.hits.checks.load(Ordering::SeqCst), 8);

    server.check(&tool, "plantz again").expect("check");
    assert_eq!(server.hits.languages.load(Ordering::SeqCst), 1);
    assert_eq!(server.hits.checks.load(Ordering::SeqCst), 9);
}

#[test]
fn check_response_is_rendered_into_issues() {
    let server = FakeServer::start();
    let tool = server.tool("en-US");

    let result = server.check(&tool, "plantz use light").expect("check");
    assert_eq!(
        result,
        GrammarCheck::Completed {
            issues: vec![
                "Issue: 'Possible spelling mistake found.'. Did you mean: plants, planets?".into(),
                "Issue: 'This sentence does not start with an uppercase letter.'. Context: \
                 ...[plantz] use light..."
                    .into(),
            ],
            count:  2,
        }
    );

    let clean = server.check(&tool, "plants use light").expect("check");
    assert_eq!(clean, GrammarCheck::clean());
}

#[test]
fn failed_check_request_reports_tool_failure() {
    let server = FakeServer::start();
    let tool = server.tool("en-US");

    let result = server.check(&tool, "this will explode").expect("setup succeeds");
    let GrammarCheck::ToolFailed { reason } = result else {
        panic!("expected a tool failure, got {result:?}");
    };
    assert!(
        reason.starts_with("LanguageTool Error: Could not perform grammar/spelling check due to: "),
        "{reason}"
    );
    assert!(
        reason.ends_with(&format!(
            "Please ensure the LanguageTool server at {} is running.",
            server.base_url
        )),
        "{reason}"
    );
    assert!(tool.is_initialized());
}

#[test]
fn unsupported_language_fails_setup() {
    let server = FakeServer::start();
    let tool = server.tool("xx-YY");

    let err = server.check(&tool, "some text").expect_err("language is not offered");
    assert!(err.to_string().contains("does not support language `xx-YY`"), "{err}");
    assert!(!tool.is_initialized());
    assert_eq!(server.hits.checks.load(Ordering::SeqCst), 0);

    // setup failures are not cached
    server.check(&tool, "some text").expect_err("still unsupported");
    assert_eq!(server.hits.languages.load(Ordering::SeqCst), 2);
}

struct SameVector;

impl Embedder for SameVector {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }
}

#[test]
fn evaluator_scores_grammar_through_languagetool() {
    let server = FakeServer::start();
    let evaluator = Evaluator::new(Arc::new(SameVector), server.tool("en"));
    let input = GradingInput::builder()
        .question_text("Explain photosynthesis")
        .student_answer("Plantz use light")
        .reference_answer("Plants use light")
        .build();

    let output = server
        .runtime
        .block_on(server.runtime.spawn_blocking(move || evaluator.evaluate(&input)))
        .expect("join");

    let grammar = &output.sub_scores[1];
    assert_eq!(grammar.criterion_name, "Grammar and Spelling");
    assert_eq!(grammar.score, 4.0);
    assert!(grammar.feedback().starts_with("Found 2 grammar/spelling issue(s)."));
    assert!(!output.needs_teacher_review);
}
