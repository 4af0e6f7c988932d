//! Erros do servidor e seu mapeamento para respostas HTTP

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ner_spans::NerError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ViewerError {
    /// Saída do tagger que viola o contrato (offsets, rótulos)
    #[error(transparent)]
    Ner(#[from] NerError),

    /// Falha de rede ou de decodificação ao chamar o modelo remoto
    #[error("tagger request failed: {0}")]
    Upstream(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ViewerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ViewerError::Ner(NerError::Tagger(_)) | ViewerError::Upstream(_) => {
                StatusCode::BAD_GATEWAY
            }
            ViewerError::Ner(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ViewerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ViewerError::Template(_) | ViewerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ViewerError::Ner(NerError::Tagger(_)) | ViewerError::Upstream(_) => {
                "tagger_unavailable"
            }
            ViewerError::Ner(_) => "invalid_tagger_output",
            ViewerError::BadRequest(_) => "bad_request",
            ViewerError::Template(_) => "render_error",
            ViewerError::Internal(_) => "internal_error",
        }
    }
}

impl From<tokio::task::JoinError> for ViewerError {
    fn from(e: tokio::task::JoinError) -> Self {
        ViewerError::Internal(e.to_string())
    }
}

impl IntoResponse for ViewerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        let body = ErrorResponse {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
