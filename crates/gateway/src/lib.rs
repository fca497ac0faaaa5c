//! Backend gateway implementations for MedTriage.
//!
//! One adapter per generative-language backend, all implementing
//! [`medtriage_core::Gateway`].

pub mod gemini;

pub use gemini::GeminiGateway;
