//! Embedder backed by an OpenAI-compatible `/v1/embeddings` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::error::{JurisError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Remote embedder speaking the OpenAI embeddings protocol.
///
/// Works with any server exposing the same request and response shape
/// (OpenAI, Azure deployments, local inference servers).
#[derive(Debug, Clone)]
pub struct OpenAIEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
    send_dimensions: bool,
}

impl OpenAIEmbedder {
    pub fn new(model: impl Into<String>, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(JurisError::invalid_config("embedding dimension must be > 0"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| JurisError::invalid_config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: model.into(),
            dimension,
            send_dimensions: false,
        })
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Ask the server to shorten vectors to `dimension` (text-embedding-3 models).
    pub fn request_dimensions(mut self, enabled: bool) -> Self {
        self.send_dimensions = enabled;
        self
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.send_dimensions.then_some(self.dimension),
        };
        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| JurisError::embedding(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| JurisError::embedding(format!("server error: {e}")))?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| JurisError::embedding(format!("invalid response: {e}")))?;

        let mut data = response.data;
        if data.len() != texts.len() {
            return Err(JurisError::embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }
        data.sort_by_key(|d| d.index);

        data.into_iter()
            .map(|d| {
                if d.embedding.len() == self.dimension {
                    Ok(d.embedding)
                } else {
                    Err(JurisError::embedding(format!(
                        "model {} returned {} dimensions, expected {}",
                        self.model,
                        d.embedding.len(),
                        self.dimension
                    )))
                }
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let input = vec!["제329조 절도".to_string()];
        let body = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &input,
            dimensions: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"][0], "제329조 절도");
        assert!(json.get("dimensions").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let embedder = OpenAIEmbedder::new("m", 8)
            .unwrap()
            .base_url("http://localhost:8080/v1/");
        assert_eq!(embedder.base_url, "http://localhost:8080/v1");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_embedding_failure() {
        let embedder = OpenAIEmbedder::new("m", 8)
            .unwrap()
            .base_url("http://127.0.0.1:9");
        let err = embedder.embed(&["x".to_string()]).await.unwrap_err();
        assert!(err.is_embedding_failure());
    }
}
