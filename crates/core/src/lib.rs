//! # MedTriage Core
//!
//! Domain types, traits, and error definitions for the MedTriage session
//! orchestrator. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The backend is defined as a trait here; implementations live in their own
//! crates. This enables:
//! - Swapping backends via configuration
//! - Easy testing with scripted/stub gateways
//! - Clean dependency graph (all crates depend inward on core)

pub mod artifact;
pub mod classify;
pub mod error;
pub mod instruction;
pub mod location;
pub mod request;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use artifact::{Artifact, ArtifactKind, DecodedArtifact};
pub use classify::{classify, Severity, EMERGENCY_TOKEN};
pub use error::{AttachmentError, Error, GatewayError, Result};
pub use instruction::build_instruction;
pub use location::Location;
pub use request::{Gateway, RequestMode, RequestPayload, TriageRequest, ANALYSIS_TEMPERATURE};
pub use turn::{Role, Session, SessionId, Turn, TRANSCRIPT_FILE_NAME, TRANSCRIPT_MIME};
