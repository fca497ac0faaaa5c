//! Multi-modal request assembly.
//!
//! Merges the session history, the current user text, and an optional
//! attached artifact into one [`TriageRequest`]. The user turn is appended to
//! the session *before* the request is built, so the replayed history always
//! includes the turn being answered.

use medtriage_core::artifact::Artifact;
use medtriage_core::request::{RequestMode, TriageRequest};
use medtriage_core::turn::{Session, Turn};
use serde::Serialize;
use tracing::warn;

/// A recoverable, caller-visible signal raised during assembly.
///
/// Warnings never abort the turn — the request proceeds text-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnWarning {
    /// The attachment could not be decoded and was dropped.
    AttachmentDropped { file_name: String, reason: String },

    /// The active mode does not support attachments; the file was ignored.
    AttachmentIgnored { file_name: String },
}

impl std::fmt::Display for TurnWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnWarning::AttachmentDropped { file_name, reason } => {
                write!(
                    f,
                    "{file_name} could not be read ({reason}); continuing with text only"
                )
            }
            TurnWarning::AttachmentIgnored { file_name } => {
                write!(
                    f,
                    "{file_name} ignored: attachments are only sent in analysis mode"
                )
            }
        }
    }
}

/// Append the user turn, then build the backend request for it.
///
/// The instruction travels as a separate system-level field on the request;
/// it is never mixed into the content.
pub fn assemble(
    session: &mut Session,
    new_user_text: &str,
    attachment: Option<&Artifact>,
    instruction: String,
    mode: RequestMode,
) -> (TriageRequest, Option<TurnWarning>) {
    session.append(Turn::user(new_user_text));

    match mode {
        RequestMode::Conversational => {
            let warning = attachment.map(|artifact| {
                warn!(file = %artifact.file_name, "Attachment ignored in conversational mode");
                TurnWarning::AttachmentIgnored {
                    file_name: artifact.file_name.clone(),
                }
            });
            let request = TriageRequest::conversational(instruction, session.turns().to_vec());
            (request, warning)
        }
        RequestMode::Analysis => {
            let (decoded, warning) = match attachment {
                None => (None, None),
                Some(artifact) => match artifact.decode() {
                    Ok(decoded) => (Some(decoded), None),
                    Err(e) => {
                        warn!(file = %artifact.file_name, error = %e, "Dropping undecodable attachment");
                        let warning = TurnWarning::AttachmentDropped {
                            file_name: artifact.file_name.clone(),
                            reason: e.to_string(),
                        };
                        (None, Some(warning))
                    }
                },
            };
            let request = TriageRequest::analysis(instruction, new_user_text, decoded);
            (request, warning)
        }
    }
}
