//! OpenAI-shaped embedding wire format, shared by every embedding-capable
//! provider (OpenAI, Azure, Google, Bailian all accept or are mapped onto
//! `{model, input: [...]}` → `{data: [{embedding, index}]}`, generalizing
//! the teacher's single-backend `EmbeddingClient`).

use serde::{Deserialize, Serialize};

use super::error::EmbeddingError;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// POST `{model, input}` to `url` with `auth_header`, returning embeddings
/// sorted by the response's own `index` field.
pub async fn embed_batch(
    client: &reqwest::Client,
    provider: &'static str,
    url: &str,
    auth_header: (&str, &str),
    model: &str,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let request = EmbeddingRequest { model, input: texts };
    let response = client
        .post(url)
        .header(auth_header.0, auth_header.1)
        .json(&request)
        .send()
        .await
        .map_err(|source| EmbeddingError::Provider(crate::llm::ProviderError::TransportError {
            provider: provider.to_string(),
            source,
        }))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(EmbeddingError::Provider(crate::llm::ProviderError::UpstreamError {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        }));
    }

    let parsed: EmbeddingResponse =
        serde_json::from_str(&body).map_err(|source| EmbeddingError::ParseFailed { provider, source })?;

    if parsed.data.is_empty() {
        return Err(EmbeddingError::EmptyResponse { provider });
    }

    let mut data = parsed.data;
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}
