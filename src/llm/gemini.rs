//! Google Gemini adapter.
//!
//! Gemini's wire format is unrelated to the OpenAI-compatible one: content
//! is nested under `contents[].parts[].text`, and search grounding is a
//! `tools` entry rather than a boolean flag. The default Gemini Pro tier
//! enables search grounding when the caller doesn't say either way.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::adapter::ProviderAdapter;
use super::error::ProviderError;
use super::sse::{SseDecoder, SseEvent};
use super::types::{GenerateRequest, GenerateResponse, StreamChunk, TokenUsage};
use crate::config::{ProviderCredential, ProviderKind};

const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiAdapter {
    client: reqwest::Client,
}

impl GeminiAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn base(credential: &ProviderCredential) -> &str {
        credential.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// The "Pro" tier defaults search grounding on; other tiers default it
    /// off. An explicit `use_search_grounding` always wins.
    fn resolve_search_grounding(model: &str, request: &GenerateRequest) -> bool {
        request
            .use_search_grounding
            .unwrap_or_else(|| model.contains("pro"))
    }

    fn build_body(model: &str, request: &GenerateRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction: request.system_prompt.as_ref().map(|text| GeminiSystemInstruction {
                parts: vec![GeminiPart { text: text.clone() }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
            tools: if Self::resolve_search_grounding(model, request) {
                Some(vec![GeminiTool { google_search: GeminiGoogleSearch {} }])
            } else {
                None
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn default_model(&self, credential: &ProviderCredential) -> String {
        credential
            .preferred_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    fn list_models(&self, credential: &ProviderCredential) -> Vec<String> {
        if !credential.extras.exposed_models.is_empty() {
            return credential.extras.exposed_models.clone();
        }
        vec![
            "gemini-1.5-pro".to_string(),
            "gemini-1.5-flash".to_string(),
            "gemini-2.0-flash".to_string(),
        ]
    }

    async fn generate(
        &self,
        credential: &ProviderCredential,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, ProviderError> {
        let api_key =
            credential
                .api_key
                .clone()
                .ok_or_else(|| ProviderError::ConfigurationMissing {
                    provider: "google".to_string(),
                })?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));
        let url = format!(
            "{}/models/{model}:generateContent?key={api_key}",
            Self::base(credential)
        );
        let body = Self::build_body(&model, request);

        let send = self.client.post(&url).json(&body).send();
        let response = tokio::select! {
            result = send => result.map_err(|source| ProviderError::TransportError {
                provider: "google".to_string(),
                source,
            })?,
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ProviderError::UpstreamError {
                provider: "google".to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&text).map_err(|_| ProviderError::UpstreamError {
                provider: "google".to_string(),
                status: status.as_u16(),
                body: text.clone(),
            })?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::UpstreamError {
                provider: "google".to_string(),
                status: status.as_u16(),
                body: "response had no candidates".to_string(),
            })?;

        let content = candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(GenerateResponse {
            content,
            finish_reason: candidate.finish_reason,
            usage: parsed.usage_metadata.map(|u| {
                TokenUsage::new(u.prompt_token_count, u.candidates_token_count)
            }),
            model,
        })
    }

    async fn stream_generate(
        &self,
        credential: &ProviderCredential,
        request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError> {
        let api_key =
            credential
                .api_key
                .clone()
                .ok_or_else(|| ProviderError::ConfigurationMissing {
                    provider: "google".to_string(),
                })?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));
        let url = format!(
            "{}/models/{model}:streamGenerateContent?alt=sse&key={api_key}",
            Self::base(credential)
        );
        let body = Self::build_body(&model, request);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::TransportError {
                provider: "google".to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::UpstreamError {
                provider: "google".to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        let stream = try_stream! {
            let mut byte_stream = response.bytes_stream();
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = byte_stream.next().await {
                if cancel.is_cancelled() {
                    Err(ProviderError::Cancelled)?;
                }
                let chunk = chunk.map_err(|source| ProviderError::TransportError {
                    provider: "google".to_string(),
                    source,
                })?;
                let text = String::from_utf8_lossy(&chunk).into_owned();

                for event in decoder.push(&text) {
                    match event {
                        SseEvent::Done => {
                            yield StreamChunk::Done { usage: None, finish_reason: None };
                            return;
                        }
                        SseEvent::Data(payload) => {
                            let parsed: Result<GeminiResponse, _> = serde_json::from_str(&payload);
                            let Ok(parsed) = parsed else { continue };
                            let Some(candidate) = parsed.candidates.into_iter().next() else { continue };
                            let text: String = candidate.content.parts.into_iter().map(|p| p.text).collect();
                            if !text.is_empty() {
                                yield StreamChunk::Content(text);
                            }
                            if let Some(finish_reason) = candidate.finish_reason {
                                yield StreamChunk::Done {
                                    usage: parsed.usage_metadata.map(|u| {
                                        TokenUsage::new(u.prompt_token_count, u.candidates_token_count)
                                    }),
                                    finish_reason: Some(finish_reason),
                                };
                            }
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    generation_config: GeminiGenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "maxOutputTokens")]
    max_output_tokens: Option<u64>,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    #[serde(rename = "googleSearch")]
    google_search: GeminiGoogleSearch,
}

#[derive(Debug, Serialize)]
struct GeminiGoogleSearch {}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default, rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiUsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: u64,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pro_tier_defaults_search_grounding_on() {
        let request = GenerateRequest::default();
        assert!(GeminiAdapter::resolve_search_grounding(
            "gemini-1.5-pro",
            &request
        ));
    }

    #[test]
    fn flash_tier_defaults_search_grounding_off() {
        let request = GenerateRequest::default();
        assert!(!GeminiAdapter::resolve_search_grounding(
            "gemini-1.5-flash",
            &request
        ));
    }

    #[test]
    fn explicit_flag_overrides_default() {
        let mut request = GenerateRequest::default();
        request.use_search_grounding = Some(false);
        assert!(!GeminiAdapter::resolve_search_grounding(
            "gemini-1.5-pro",
            &request
        ));
    }
}
