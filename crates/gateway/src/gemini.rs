//! Google generative-language backend adapter.
//!
//! Talks to the `generateContent` REST endpoint directly.
//!
//! Features:
//! - API key as a query parameter (not a Bearer header)
//! - System instruction as a top-level field, never inside `contents`
//! - Conversational payloads replayed role-tagged (`user` / `model`)
//! - Analysis payloads with base64 `inlineData` parts and a pinned
//!   sampling temperature

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use medtriage_config::{AppConfig, ConfigError};
use medtriage_core::error::GatewayError;
use medtriage_core::request::{Gateway, RequestPayload, TriageRequest};
use medtriage_core::turn::Role;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gateway implementation over the Google generative-language REST API.
pub struct GeminiGateway {
    name: String,
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiGateway {
    /// Create a new gateway with the default model and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            api_key: api_key.into(),
            client: build_client(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a gateway from validated configuration.
    ///
    /// Fails with [`ConfigError::MissingApiKey`] when no credential is
    /// available — the fatal startup path.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();
        let mut gateway = Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: config.model.clone(),
            api_key,
            client: build_client(config.request_timeout_secs),
        };
        if let Some(base_url) = &config.base_url {
            gateway = gateway.with_base_url(base_url);
        }
        Ok(gateway)
    }

    /// Override the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert an assembled triage request into the wire body.
    fn build_body(request: &TriageRequest) -> GenerateContentRequest {
        let system_instruction = Some(Content {
            role: "system".into(),
            parts: vec![Part::Text {
                text: request.instruction.clone(),
            }],
        });

        match &request.payload {
            RequestPayload::Conversational { history } => {
                let contents = history
                    .iter()
                    .map(|turn| Content {
                        role: match turn.role {
                            Role::User => "user".into(),
                            Role::Assistant => "model".into(),
                        },
                        parts: vec![Part::Text {
                            text: turn.content.clone(),
                        }],
                    })
                    .collect();

                GenerateContentRequest {
                    contents,
                    system_instruction,
                    generation_config: None,
                }
            }
            RequestPayload::Analysis {
                text,
                artifact,
                temperature,
            } => {
                let mut parts = vec![Part::Text { text: text.clone() }];
                if let Some(artifact) = artifact {
                    parts.push(Part::InlineData {
                        inline_data: InlineDataPayload {
                            mime_type: artifact.mime_type().into(),
                            data: BASE64_STANDARD.encode(&artifact.data),
                        },
                    });
                }

                GenerateContentRequest {
                    contents: vec![Content {
                        role: "user".into(),
                        parts,
                    }],
                    system_instruction,
                    generation_config: Some(GenerationConfig {
                        temperature: *temperature,
                    }),
                }
            }
        }
    }
}

#[async_trait]
impl Gateway for GeminiGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: TriageRequest,
    ) -> std::result::Result<String, GatewayError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = Self::build_body(&request);

        debug!(backend = "gemini", model = %self.model, "Sending generation request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(e.to_string())
                } else {
                    GatewayError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5);
            return Err(GatewayError::RateLimited { retry_after_secs });
        }
        if status == 401 || status == 403 {
            return Err(GatewayError::AuthenticationFailed(
                "Invalid or unauthorized API key".into(),
            ));
        }
        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Backend API error");
            return Err(GatewayError::ApiError {
                status_code: status,
                message: extract_error_message(&error_body),
            });
        }

        let api_resp: GenerateContentResponse =
            response.json().await.map_err(|e| GatewayError::ApiError {
                status_code: 200,
                message: format!("Failed to parse backend response: {e}"),
            })?;

        extract_text(api_resp)
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to create HTTP client")
}

/// Pull the reply text out of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, GatewayError> {
    let text = response
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                Some(candidates.swap_remove(0))
            }
        })
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text));

    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(GatewayError::EmptyResponse),
    }
}

/// Prefer the structured error message over the raw body when present.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|w| w.error.message)
        .unwrap_or_else(|| body.to_string())
}

// --- Wire types ---

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
