//! # MedTriage Session
//!
//! The triage session orchestrator: maintains conversation state across
//! turns, assembles (optionally multi-modal) backend requests with a freshly
//! parameterized safety instruction, classifies replies for emergency
//! signaling, and exports transcripts.

pub mod assembler;
pub mod orchestrator;

pub use assembler::{assemble, TurnWarning};
pub use orchestrator::{TriageContext, TriageOrchestrator, TurnOutcome, MAX_MESSAGE_CHARS};
