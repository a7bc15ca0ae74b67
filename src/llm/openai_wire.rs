//! Shared OpenAI-compatible chat-completions wire format, reused by the
//! `openai`, `azure`, `grok`, `bailian`, and `compatible` adapters. Each of
//! those differs only in base URL, auth header shape, and which quirks
//! (reasoning-model temperature override, `reasoningEffort`) apply.

use async_stream::try_stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::error::ProviderError;
use super::sse::{SseDecoder, SseEvent};
use super::types::{
    accepts_reasoning_effort, is_reasoning_model, GenerateRequest, GenerateResponse, StreamChunk,
    TokenUsage,
};

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'static str>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<WireResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct StreamChunkWire {
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Behavioral knobs distinguishing the OpenAI-wire adapters from each other.
pub struct WireQuirks {
    /// `o1*`/`o3*`/`gpt-5*` models must be sent with `temperature = 1.0`.
    pub force_reasoning_temperature: bool,
    /// Whether this provider accepts the `reasoning_effort` field at all.
    pub supports_reasoning_effort: bool,
    /// When `supports_reasoning_effort` is set, whether every model this
    /// provider serves accepts it (Grok) or only the `o1*`/`o3*` reasoning
    /// models do (OpenAI, Azure).
    pub reasoning_effort_any_model: bool,
}

fn build_request(model: &str, request: &GenerateRequest, quirks: &WireQuirks, stream: bool) -> ChatCompletionRequest {
    let mut messages = Vec::new();
    if let Some(system_prompt) = &request.system_prompt {
        messages.push(WireMessage {
            role: "system",
            content: system_prompt.clone(),
        });
    }
    messages.push(WireMessage {
        role: "user",
        content: request.prompt.clone(),
    });

    let temperature = if quirks.force_reasoning_temperature && is_reasoning_model(model) {
        Some(1.0)
    } else {
        request.temperature
    };

    let reasoning_effort = if quirks.supports_reasoning_effort
        && (quirks.reasoning_effort_any_model || accepts_reasoning_effort(model))
    {
        Some(request.reasoning_effort.unwrap_or_default().as_str())
    } else {
        None
    };

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        temperature,
        max_tokens: request.max_output_tokens,
        reasoning_effort,
        stream,
    }
}

pub async fn generate(
    client: &reqwest::Client,
    provider_label: &str,
    url: &str,
    auth_header: (&str, String),
    model: &str,
    request: &GenerateRequest,
    quirks: &WireQuirks,
    cancel: &CancellationToken,
) -> Result<GenerateResponse, ProviderError> {
    let body = build_request(model, request, quirks, false);

    let send = client
        .post(url)
        .header(auth_header.0, auth_header.1)
        .header("Content-Type", "application/json")
        .json(&body)
        .send();

    let response = tokio::select! {
        result = send => result.map_err(|source| ProviderError::TransportError {
            provider: provider_label.to_string(),
            source,
        })?,
        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
    };

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(ProviderError::UpstreamError {
            provider: provider_label.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }

    let parsed: ChatCompletionResponse =
        serde_json::from_str(&text).map_err(|_| ProviderError::UpstreamError {
            provider: provider_label.to_string(),
            status: status.as_u16(),
            body: text.clone(),
        })?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::UpstreamError {
            provider: provider_label.to_string(),
            status: status.as_u16(),
            body: "response had no choices".to_string(),
        })?;

    Ok(GenerateResponse {
        content: choice
            .message
            .and_then(|m| m.content)
            .unwrap_or_default(),
        finish_reason: choice.finish_reason,
        usage: parsed
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
        model: parsed.model.unwrap_or_else(|| model.to_string()),
    })
}

pub async fn stream_generate(
    client: reqwest::Client,
    provider_label: String,
    url: String,
    auth_header: (String, String),
    model: String,
    request: GenerateRequest,
    quirks: WireQuirks,
    cancel: CancellationToken,
) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError> {
    let body = build_request(&model, &request, &quirks, true);

    let response = client
        .post(&url)
        .header(auth_header.0.clone(), auth_header.1.clone())
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|source| ProviderError::TransportError {
            provider: provider_label.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ProviderError::UpstreamError {
            provider: provider_label,
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
                provider: provider_label.clone(),
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
                        let parsed: Result<StreamChunkWire, _> = serde_json::from_str(&payload);
                        let Ok(parsed) = parsed else { continue };
                        let Some(choice) = parsed.choices.into_iter().next() else { continue };
                        if let Some(content) = choice.delta.content {
                            if !content.is_empty() {
                                yield StreamChunk::Content(content);
                            }
                        }
                        if let Some(finish_reason) = choice.finish_reason {
                            yield StreamChunk::Done {
                                usage: parsed.usage.map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
                                finish_reason: Some(finish_reason),
                            };
                            return;
                        }
                    }
                }
            }
        }
    };

    Ok(Box::pin(stream))
}
