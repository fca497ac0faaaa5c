//! Gateway trait — the abstraction over the generative-language backend.
//!
//! A Gateway knows how to send an assembled triage request to a backend and
//! return the reply text. The orchestrator calls `generate()` without knowing
//! which backend is behind it — pure polymorphism.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::artifact::DecodedArtifact;
use crate::error::GatewayError;
use crate::turn::Turn;

/// Fixed sampling temperature for single-shot analysis requests.
pub const ANALYSIS_TEMPERATURE: f32 = 0.7;

/// Which assembly strategy a session runs under.
///
/// The two variants are parallel, deliberately un-merged behaviors: one
/// replays the whole consultation, the other analyzes a single turn with an
/// optional attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// Full ordered history, no attachment support, backend-default sampling
    #[default]
    Conversational,
    /// Current turn only, optional attachment, fixed sampling temperature
    Analysis,
}

/// A fully assembled request for one backend call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRequest {
    /// The freshly built system instruction — always a separate system-level
    /// field, never mixed into the content
    pub instruction: String,

    /// The conversational content
    pub payload: RequestPayload,
}

/// The content of a request, per [`RequestMode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RequestPayload {
    /// Replay the full session history, role-tagged, in order.
    Conversational { history: Vec<Turn> },

    /// Send only the current turn, optionally with a decoded artifact.
    Analysis {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact: Option<DecodedArtifact>,
        temperature: f32,
    },
}

impl TriageRequest {
    /// Build a conversational request from the full session history.
    pub fn conversational(instruction: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            instruction: instruction.into(),
            payload: RequestPayload::Conversational { history },
        }
    }

    /// Build a single-shot analysis request for the current turn.
    pub fn analysis(
        instruction: impl Into<String>,
        text: impl Into<String>,
        artifact: Option<DecodedArtifact>,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            payload: RequestPayload::Analysis {
                text: text.into(),
                artifact,
                temperature: ANALYSIS_TEMPERATURE,
            },
        }
    }
}

/// The core Gateway trait.
///
/// The backend may be unreachable, rate-limited, or return malformed output;
/// every such failure surfaces as a recoverable [`GatewayError`] — never a
/// panic, never a crashed session.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// A human-readable name for this backend (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send one request and return the generated reply text.
    async fn generate(&self, request: TriageRequest)
        -> std::result::Result<String, GatewayError>;
}
