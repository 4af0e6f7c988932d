//! Adaptador para um modelo de token classification servido por HTTP.
//!
//! Envia `{"inputs": texto, "parameters": {"aggregation_strategy": "none",
//! "ignore_labels": []}}` e espera de volta a lista de predições do pipeline
//! `ner`, uma por fragmento WordPiece, com offsets de caractere.
//!
//! Por padrão o pipeline descarta os fragmentos `O`. Sem eles uma continuação
//! `##` rotulada cujo líder é `O` chegaria sozinha ao reconstrutor, por isso
//! pedimos todos os rótulos.

use ner_spans::{tokens_from_pipeline, PipelinePrediction, Token};
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::ViewerError;

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    aggregation_strategy: &'static str,
    ignore_labels: [&'static str; 0],
}

/// Cliente do endpoint de inferência. Criado uma vez na inicialização e
/// compartilhado entre requisições.
#[derive(Debug, Clone)]
pub struct RemoteTagger {
    client: Client,
    url: Url,
    api_token: Option<String>,
}

impl RemoteTagger {
    pub fn new(config: &RemoteConfig) -> Result<Self, ViewerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ViewerError::Internal(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Rotula o texto no modelo remoto e converte a resposta em tokens.
    pub async fn tag(&self, text: &str) -> Result<Vec<Token>, ViewerError> {
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                aggregation_strategy: "none",
                ignore_labels: [],
            },
        };

        let mut request = self.client.post(self.url.clone()).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ViewerError::Upstream(e.to_string()))?;

        let predictions: Vec<PipelinePrediction> = response
            .json()
            .await
            .map_err(|e| ViewerError::Upstream(format!("invalid pipeline response: {e}")))?;

        debug!(predictions = predictions.len(), "remote tagger answered");
        Ok(tokens_from_pipeline(text, &predictions)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use ner_spans::{EntityCategory, NerError, Tag};
    use serde_json::{json, Value};
    use std::time::Duration;

    /// Sobe um servidor local que responde sempre com `status` e `body`.
    async fn fake_endpoint(status: StatusCode, body: Value) -> Url {
        let app = Router::new().route(
            "/ner",
            post(move |Json(req): Json<Value>| {
                let body = body.clone();
                async move {
                    assert_eq!(req["parameters"]["aggregation_strategy"], "none");
                    assert_eq!(req["parameters"]["ignore_labels"], json!([]));
                    (status, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/ner")).unwrap()
    }

    fn tagger(url: Url) -> RemoteTagger {
        RemoteTagger::new(&RemoteConfig {
            url,
            api_token: Some("token".into()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_remote_predictions_become_tokens() {
        let url = fake_endpoint(
            StatusCode::OK,
            json!([
                {"entity": "B-LOC", "score": 0.99, "index": 1, "word": "Wash", "start": 0, "end": 4},
                {"entity": "I-LOC", "score": 0.95, "index": 2, "word": "##ington", "start": 4, "end": 10}
            ]),
        )
        .await;

        let tokens = tagger(url).tag("Washington").await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].label, Tag::Begin(EntityCategory::Loc));
        assert_eq!(tokens[1].fragment, "##ington");
        assert_eq!((tokens[1].start, tokens[1].end), (4, 10));
    }

    #[tokio::test]
    async fn test_remote_outside_leaders_are_requested_and_kept() {
        // "cats": líder "cat" é O, a continuação "##s" veio rotulada
        let url = fake_endpoint(
            StatusCode::OK,
            json!([
                {"entity": "B-LOC", "score": 0.99, "index": 1, "word": "Paris", "start": 0, "end": 5},
                {"entity": "O", "score": 0.99, "index": 2, "word": "loves", "start": 6, "end": 11},
                {"entity": "O", "score": 0.97, "index": 3, "word": "cat", "start": 12, "end": 15},
                {"entity": "I-LOC", "score": 0.51, "index": 4, "word": "##s", "start": 15, "end": 16}
            ]),
        )
        .await;

        let text = "Paris loves cats";
        let tokens = tagger(url).tag(text).await.unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].label, Tag::Outside);

        let analysis = ner_spans::reconstruct(text, tokens).unwrap();
        assert_eq!(analysis.legend.len(), 1);
        assert_eq!(analysis.legend[0].word, "Paris");
        assert_eq!(analysis.legend[0].end, 5);
    }

    #[tokio::test]
    async fn test_remote_http_error_is_upstream_failure() {
        let url = fake_endpoint(StatusCode::SERVICE_UNAVAILABLE, json!({"error": "loading"})).await;
        let err = tagger(url).tag("Paris").await.unwrap_err();
        assert!(matches!(err, ViewerError::Upstream(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_remote_bad_label_is_contract_violation() {
        let url = fake_endpoint(
            StatusCode::OK,
            json!([{
                "entity": "B-DATE", "score": 0.9, "index": 1,
                "word": "today", "start": 0, "end": 5
            }]),
        )
        .await;
        let err = tagger(url).tag("today").await.unwrap_err();
        assert!(matches!(err, ViewerError::Ner(NerError::UnknownLabel(_))));
    }
}
