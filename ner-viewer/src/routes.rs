//! Rotas HTTP: página HTML (formulário + resultado) e API JSON

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use ner_spans::{lexicon::demo_texts, Analysis, Segment};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ErrorResponse, ViewerError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: Analysis,
    /// Texto com as entidades embrulhadas em `<span style=...>` (sem escape)
    pub highlighted_html: String,
}

impl From<Analysis> for AnalyzeResponse {
    fn from(analysis: Analysis) -> Self {
        let highlighted_html = analysis.document.render();
        Self {
            analysis,
            highlighted_html,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum BatchItem {
    Ok(AnalyzeResponse),
    Err(ErrorResponse),
}

struct DemoView {
    domain: &'static str,
    text: &'static str,
}

struct LegendView {
    word: String,
    display_name: &'static str,
    color: &'static str,
}

struct SegmentView {
    text: String,
    is_entity: bool,
    color: &'static str,
    label: String,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    text: String,
    demos: Vec<DemoView>,
    has_result: bool,
    legend: Vec<LegendView>,
    segments: Vec<SegmentView>,
    error: String,
    tagger: &'static str,
}

impl IndexTemplate {
    fn new(text: String, tagger: &'static str) -> Self {
        Self {
            text,
            demos: demo_texts()
                .into_iter()
                .map(|(domain, text)| DemoView { domain, text })
                .collect(),
            has_result: false,
            legend: vec![],
            segments: vec![],
            error: String::new(),
            tagger,
        }
    }

    fn with_analysis(mut self, analysis: &Analysis) -> Self {
        self.has_result = true;
        self.legend = analysis
            .legend
            .iter()
            .map(|e| LegendView {
                word: e.word.clone(),
                display_name: e.display_name,
                color: e.color,
            })
            .collect();
        self.segments = analysis
            .document
            .segments()
            .iter()
            .map(|seg| match seg {
                Segment::Plain { text } => SegmentView {
                    text: text.clone(),
                    is_entity: false,
                    color: "",
                    label: String::new(),
                },
                Segment::Entity { text, label, color } => SegmentView {
                    text: text.clone(),
                    is_entity: true,
                    color: *color,
                    label: label.label(),
                },
            })
            .collect();
        self
    }

    fn with_error(mut self, error: &ViewerError) -> Self {
        self.error = error.to_string();
        self
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler).post(submit_handler))
        .route("/analyze", post(analyze_handler))
        .route("/analyze/batch", post(batch_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Página inicial com o formulário vazio
async fn index_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, ViewerError> {
    Ok(Html(IndexTemplate::new(String::new(), state.tagger_name()).render()?))
}

/// Envio do formulário: analisa e renderiza legenda + texto destacado
async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Form(req): Form<AnalyzeRequest>,
) -> Response {
    let page = IndexTemplate::new(req.text.clone(), state.tagger_name());
    if req.text.trim().is_empty() {
        return render(page, None);
    }

    match state.analyze(req.text).await {
        Ok(analysis) => {
            info!(entities = analysis.entities.len(), ms = analysis.processing_ms, "form analysis");
            render(page.with_analysis(&analysis), None)
        }
        Err(e) => {
            let status = e.status_code();
            tracing::warn!(error = %e, "form analysis failed");
            render(page.with_error(&e), Some(status))
        }
    }
}

fn render(page: IndexTemplate, status: Option<axum::http::StatusCode>) -> Response {
    match page.render() {
        Ok(html) => match status {
            Some(status) => (status, Html(html)).into_response(),
            None => Html(html).into_response(),
        },
        Err(e) => ViewerError::from(e).into_response(),
    }
}

/// Análise via JSON
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ViewerError> {
    if req.text.trim().is_empty() {
        return Err(ViewerError::BadRequest("text is empty".into()));
    }
    let analysis = state.analyze(req.text).await?;
    info!(
        tokens = analysis.tokens.len(),
        entities = analysis.entities.len(),
        ms = analysis.processing_ms,
        "analysis done"
    );
    Ok(Json(analysis.into()))
}

/// Análise de vários textos; erros de um texto não derrubam os demais
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<Vec<BatchItem>>, ViewerError> {
    let results = state.analyze_many(req.texts).await?;
    let items = results
        .into_iter()
        .map(|r| match r {
            Ok(analysis) => BatchItem::Ok(analysis.into()),
            Err(e) => BatchItem::Err(ErrorResponse {
                error: e.kind(),
                message: e.to_string(),
            }),
        })
        .collect();
    Ok(Json(items))
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "tagger": state.tagger_name(),
    }))
}
