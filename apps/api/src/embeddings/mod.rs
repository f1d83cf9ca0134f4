/// Embedding client — every call to the external embedding provider goes through here.
///
/// Model: text-embedding-ada-002 (fixed; query and candidate vectors must come
/// from the same model to be comparable).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
pub const MODEL: &str = "text-embedding-ada-002";

/// Provider-defined dimensionality. Only pairwise cosine similarity is meaningful.
pub type EmbeddingVector = Vec<f32>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("provider response has no embedding vector")]
    MissingEmbedding,
}

/// Text → vector. Carried in `AppState` as `Arc<dyn Embedder>`.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ProviderError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

/// Accepts the OpenAI list shape as well as a bare `{ "embedding": [...] }` body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    List { data: Vec<EmbeddingData> },
    Single { embedding: EmbeddingVector },
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: EmbeddingVector,
}

impl EmbeddingResponse {
    fn into_vector(self) -> Option<EmbeddingVector> {
        match self {
            EmbeddingResponse::List { data } => data.into_iter().next().map(|d| d.embedding),
            EmbeddingResponse::Single { embedding } => Some(embedding),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// Bearer-authenticated client for an OpenAI-compatible embeddings endpoint.
/// One HTTP call per `embed`, no retries.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    url: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, url: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            url,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ProviderError> {
        let request_body = EmbeddingRequest {
            input: text,
            model: MODEL,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let vector = decode_embedding(&body)?;
        debug!("Embedding call succeeded: dimensions={}", vector.len());
        Ok(vector)
    }
}

/// Body must be JSON; JSON without a usable vector is `MissingEmbedding`.
fn decode_embedding(body: &str) -> Result<EmbeddingVector, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let vector = serde_json::from_value::<EmbeddingResponse>(value)
        .ok()
        .and_then(EmbeddingResponse::into_vector)
        .ok_or(ProviderError::MissingEmbedding)?;

    if vector.is_empty() {
        return Err(ProviderError::MissingEmbedding);
    }
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder_for(server: &MockServer) -> OpenAiEmbedder {
        OpenAiEmbedder::new(
            "sk-test".to_string(),
            format!("{}/v1/embeddings", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_openai_list_shape() {
        let body = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,0.2]}],"model":"text-embedding-ada-002"}"#;
        assert_eq!(decode_embedding(body).unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn test_decode_flat_shape() {
        assert_eq!(
            decode_embedding(r#"{"embedding":[1.0,0.0,-1.0]}"#).unwrap(),
            vec![1.0, 0.0, -1.0]
        );
    }

    #[test]
    fn test_decode_missing_vector() {
        assert!(matches!(
            decode_embedding(r#"{"object":"list","data":[]}"#),
            Err(ProviderError::MissingEmbedding)
        ));
        assert!(matches!(
            decode_embedding(r#"{"usage":{"total_tokens":3}}"#),
            Err(ProviderError::MissingEmbedding)
        ));
        assert!(matches!(
            decode_embedding(r#"{"embedding":[]}"#),
            Err(ProviderError::MissingEmbedding)
        ));
    }

    #[test]
    fn test_decode_non_json_is_parse_error() {
        assert!(matches!(
            decode_embedding("<html>bad gateway</html>"),
            Err(ProviderError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_embed_sends_model_and_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_json(json!({
                "input": "Data Scientist SE FT US",
                "model": MODEL
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"embedding": [0.5, 0.25]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vector = embedder_for(&server)
            .embed("Data Scientist SE FT US")
            .await
            .unwrap();
        assert_eq!(vector, vec![0.5, 0.25]);
    }

    #[tokio::test]
    async fn test_embed_surfaces_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        match embedder_for(&server).embed("hello").await {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_does_not_retry_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let result = embedder_for(&server).embed("hello").await;
        assert!(matches!(result, Err(ProviderError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_embed_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"embedding": [1.0]}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedder::new(
            "sk-test".to_string(),
            format!("{}/v1/embeddings", server.uri()),
            Duration::from_millis(100),
        )
        .unwrap();

        assert!(matches!(
            embedder.embed("hello").await,
            Err(ProviderError::Http(_))
        ));
    }
}
