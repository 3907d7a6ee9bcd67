use crate::config::GenerationConfig;
use crate::domain::ports::{ChatMessage, ChatRole, TextGenerator};
use crate::utils::error::GenerationError;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use serde_json::{json, Value};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

pub const TRUNCATED_RESPONSE: &str =
    "response was cut off at the max_tokens limit; shorten study_notes so the whole JSON fits";

/// 依模型 id 決定 payload 格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Anthropic,
    Titan,
}

impl ModelFamily {
    pub fn from_model_id(model_id: &str) -> Self {
        if model_id.contains("amazon.titan") {
            ModelFamily::Titan
        } else {
            ModelFamily::Anthropic
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl From<&GenerationConfig> for InferenceParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

pub fn build_request_body(model_id: &str, messages: &[ChatMessage], params: &InferenceParams) -> Value {
    match ModelFamily::from_model_id(model_id) {
        ModelFamily::Anthropic => {
            let messages: Vec<Value> = messages
                .iter()
                .map(|m| {
                    json!({
                        "role": m.role.as_str(),
                        "content": [{ "type": "text", "text": m.text }]
                    })
                })
                .collect();
            json!({
                "anthropic_version": ANTHROPIC_VERSION,
                "max_tokens": params.max_tokens,
                "temperature": params.temperature,
                "top_p": params.top_p,
                "messages": messages
            })
        }
        ModelFamily::Titan => json!({
            "inputText": titan_transcript(messages),
            "textGenerationConfig": {
                "maxTokenCount": params.max_tokens,
                "temperature": params.temperature,
                "topP": params.top_p
            }
        }),
    }
}

/// Titan 只吃單一字串，對話以 User/Bot 輪流串起來
fn titan_transcript(messages: &[ChatMessage]) -> String {
    if let [only] = messages {
        return only.text.clone();
    }

    let mut transcript = String::new();
    for message in messages {
        let speaker = match message.role {
            ChatRole::User => "User",
            ChatRole::Assistant => "Bot",
        };
        transcript.push_str(&format!("{}: {}\n\n", speaker, message.text));
    }
    transcript.push_str("Bot:");
    transcript
}

pub fn parse_response_body(model_id: &str, body: &[u8]) -> Result<String, GenerationError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| GenerationError::MalformedResponse {
        message: format!("response body is not JSON: {}", e),
    })?;

    let family = ModelFamily::from_model_id(model_id);
    // 被 max_tokens 截斷的 JSON 必定不完整，直接回報原因
    let truncated = match family {
        ModelFamily::Anthropic => value["stop_reason"] == "max_tokens",
        ModelFamily::Titan => value["results"][0]["completionReason"] == "LENGTH",
    };
    if truncated {
        return Err(GenerationError::MalformedResponse {
            message: TRUNCATED_RESPONSE.to_string(),
        });
    }

    let text = match family {
        ModelFamily::Anthropic => value["content"].as_array().map(|blocks| {
            blocks
                .iter()
                .filter(|b| b["type"] == "text")
                .filter_map(|b| b["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        }),
        ModelFamily::Titan => value["results"][0]["outputText"].as_str().map(str::to_string),
    };

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerationError::MalformedResponse {
            message: "response contained no text".to_string(),
        }),
    }
}

fn classify_error<R>(err: SdkError<InvokeModelError, R>) -> GenerationError
where
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(context) => {
            let service_err = context.err();
            if service_err.is_throttling_exception() {
                GenerationError::Throttled {
                    attempts: 1,
                    message,
                }
            } else {
                let transient = service_err.is_service_unavailable_exception()
                    || service_err.is_model_timeout_exception()
                    || service_err.is_internal_server_exception()
                    || service_err.is_model_not_ready_exception();
                GenerationError::UpstreamUnavailable { message, transient }
            }
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            GenerationError::UpstreamUnavailable {
                message,
                transient: true,
            }
        }
        _ => GenerationError::UpstreamUnavailable {
            message,
            transient: false,
        },
    }
}

pub struct BedrockGenerator {
    client: BedrockClient,
    params: InferenceParams,
}

impl BedrockGenerator {
    pub fn new(client: BedrockClient, params: InferenceParams) -> Self {
        Self { client, params }
    }
}

#[async_trait]
impl TextGenerator for BedrockGenerator {
    async fn complete(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<String, GenerationError> {
        let body = build_request_body(model_id, messages, &self.params);
        let bytes = serde_json::to_vec(&body).map_err(|e| GenerationError::MalformedResponse {
            message: format!("failed to encode request: {}", e),
        })?;

        tracing::debug!("📡 Invoking Bedrock model {}", model_id);
        let resp = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(bytes))
            .send()
            .await
            .map_err(classify_error)?;

        parse_response_body(model_id, resp.body().as_ref())
    }
}
