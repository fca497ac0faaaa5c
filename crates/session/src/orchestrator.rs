//! The triage session orchestrator.
//!
//! Wires instruction building, request assembly, the backend gateway, and
//! emergency classification around one per-visit session. Turns are processed
//! strictly sequentially: one user turn, at most one in-flight backend call.

use std::sync::Arc;

use medtriage_core::artifact::Artifact;
use medtriage_core::classify::{classify, Severity};
use medtriage_core::error::Error;
use medtriage_core::instruction::build_instruction;
use medtriage_core::location::Location;
use medtriage_core::request::{Gateway, RequestMode};
use medtriage_core::turn::{Session, Turn};
use serde::Serialize;
use tracing::{debug, info};

use crate::assembler::{assemble, TurnWarning};

/// Maximum user message length in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Per-visit state: the conversation log and the user's current jurisdiction.
///
/// Created when a visit starts, dropped when it ends. Never shared between
/// visits — each interaction owns its own context, so no locking is needed.
#[derive(Debug, Clone)]
pub struct TriageContext {
    pub session: Session,
    pub location: Location,
}

impl TriageContext {
    pub fn new(location: Location) -> Self {
        Self {
            session: Session::new(),
            location,
        }
    }

    /// Change the jurisdiction mid-session. Takes effect on the next turn —
    /// the instruction is rebuilt from the current value on every request.
    pub fn set_location(&mut self, location: Location) {
        if self.location != location {
            info!(from = %self.location, to = %location, "Location changed");
            self.location = location;
        }
    }
}

impl Default for TriageContext {
    fn default() -> Self {
        Self::new(Location::default())
    }
}

/// What the UI shell receives for one completed turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// The assistant's reply text
    pub reply: String,

    /// Emergency flag — `true` obliges the caller to render a blocking,
    /// high-visibility directive to seek immediate care
    pub emergency: bool,

    /// Severity tag detected in the reply, when present
    pub severity: Option<Severity>,

    /// Recoverable signal raised during assembly (e.g. a dropped attachment)
    pub warning: Option<TurnWarning>,
}

/// Central orchestrator coordinating one consultation against a backend.
pub struct TriageOrchestrator {
    gateway: Arc<dyn Gateway>,
    mode: RequestMode,
}

impl TriageOrchestrator {
    /// Create a new orchestrator over the given backend gateway.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            mode: RequestMode::default(),
        }
    }

    /// Select the request assembly strategy.
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Process one user turn.
    ///
    /// Appends the user turn, builds the request with a freshly generated
    /// instruction for the context's *current* location, calls the backend,
    /// classifies the reply, and appends the assistant turn.
    ///
    /// On a gateway failure no assistant turn is appended: the session keeps
    /// the user turn and the caller may retry the same turn. Input validation
    /// failures reject the turn before anything is appended.
    pub async fn handle_turn(
        &self,
        ctx: &mut TriageContext,
        user_text: &str,
        attachment: Option<&Artifact>,
    ) -> Result<TurnOutcome, Error> {
        if user_text.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }
        if user_text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(Error::MessageTooLong(MAX_MESSAGE_CHARS));
        }

        let instruction = build_instruction(ctx.location);
        let (request, warning) = assemble(
            &mut ctx.session,
            user_text,
            attachment,
            instruction,
            self.mode,
        );

        debug!(
            backend = self.gateway.name(),
            mode = ?self.mode,
            location = %ctx.location,
            turns = ctx.session.len(),
            "Dispatching turn"
        );

        let reply = self.gateway.generate(request).await?;

        let emergency = classify(&reply);
        let severity = Severity::detect(&reply);
        if emergency {
            info!(session = %ctx.session.id, "Emergency marker detected in reply");
        }

        ctx.session.append(Turn::assistant(&reply));

        Ok(TurnOutcome {
            reply,
            emergency,
            severity,
            warning,
        })
    }

    /// Export the session transcript, if there is anything to export.
    pub fn export(&self, ctx: &TriageContext) -> Option<String> {
        ctx.session.export_transcript()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medtriage_core::error::GatewayError;
    use medtriage_core::request::{RequestPayload, TriageRequest};
    use medtriage_core::turn::Role;
    use std::sync::Mutex;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    /// A gateway that returns scripted results and records every request.
    struct ScriptedGateway {
        results: Mutex<Vec<Result<String, GatewayError>>>,
        requests: Mutex<Vec<TriageRequest>>,
    }

    impl ScriptedGateway {
        fn new(results: Vec<Result<String, GatewayError>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn single_text(text: &str) -> Arc<Self> {
            Self::new(vec![Ok(text.to_string())])
        }

        fn last_request(&self) -> TriageRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl Gateway for ScriptedGateway {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: TriageRequest) -> Result<String, GatewayError> {
            self.requests.lock().unwrap().push(request);
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                panic!("ScriptedGateway: no more scripted results");
            }
            results.remove(0)
        }
    }

    #[tokio::test]
    async fn lagos_chest_pain_scenario() {
        let gateway = ScriptedGateway::single_text("EMERGENCY: seek care at LUTH");
        let orch = TriageOrchestrator::new(gateway.clone());
        let mut ctx = TriageContext::new(Location::Lagos);

        let outcome = orch
            .handle_turn(&mut ctx, "I have chest pain and can't breathe", None)
            .await
            .unwrap();

        assert!(outcome.emergency);
        assert_eq!(outcome.severity, Some(Severity::Emergency));
        assert_eq!(ctx.session.len(), 2);
        assert_eq!(ctx.session.turns()[0].role, Role::User);
        assert_eq!(ctx.session.turns()[1].role, Role::Assistant);
        assert_eq!(ctx.session.turns()[1].content, "EMERGENCY: seek care at LUTH");
    }

    #[tokio::test]
    async fn benign_reply_is_not_an_emergency() {
        let gateway = ScriptedGateway::single_text("[SELF-CARE/PHARMACY] rest and hydrate");
        let orch = TriageOrchestrator::new(gateway);
        let mut ctx = TriageContext::default();

        let outcome = orch.handle_turn(&mut ctx, "mild headache", None).await.unwrap();

        assert!(!outcome.emergency);
        assert_eq!(outcome.severity, Some(Severity::SelfCare));
    }

    #[tokio::test]
    async fn gateway_failure_preserves_session_state() {
        let gateway = ScriptedGateway::new(vec![Err(GatewayError::Network(
            "connection refused".into(),
        ))]);
        let orch = TriageOrchestrator::new(gateway);
        let mut ctx = TriageContext::default();

        let result = orch.handle_turn(&mut ctx, "I feel dizzy", None).await;

        let err = result.unwrap_err();
        match err {
            Error::Gateway(gw) => assert!(gw.diagnostic().contains("connection refused")),
            other => panic!("expected gateway error, got {other}"),
        }
        // Odd length: only the user turn — no synthetic assistant turn
        assert_eq!(ctx.session.len(), 1);
        assert_eq!(ctx.session.turns()[0].role, Role::User);
    }

    #[tokio::test]
    async fn retry_after_gateway_failure_succeeds() {
        let gateway = ScriptedGateway::new(vec![
            Err(GatewayError::RateLimited { retry_after_secs: 1 }),
            Ok("[URGENT CONSULT] see a doctor this week".into()),
        ]);
        let orch = TriageOrchestrator::new(gateway);
        let mut ctx = TriageContext::default();

        assert!(orch.handle_turn(&mut ctx, "I feel dizzy", None).await.is_err());
        let outcome = orch.handle_turn(&mut ctx, "I feel dizzy", None).await.unwrap();

        assert_eq!(outcome.severity, Some(Severity::UrgentConsult));
        // Retried turn appended again: user, user, assistant
        assert_eq!(ctx.session.len(), 3);
    }

    #[tokio::test]
    async fn conversational_request_replays_full_history() {
        let gateway = ScriptedGateway::new(vec![Ok("first reply".into()), Ok("second reply".into())]);
        let orch = TriageOrchestrator::new(gateway.clone());
        let mut ctx = TriageContext::default();

        orch.handle_turn(&mut ctx, "first", None).await.unwrap();
        orch.handle_turn(&mut ctx, "second", None).await.unwrap();

        match gateway.last_request().payload {
            RequestPayload::Conversational { history } => {
                let contents: Vec<&str> = history.iter().map(|t| t.content.as_str()).collect();
                assert_eq!(contents, ["first", "first reply", "second"]);
            }
            _ => panic!("expected conversational payload"),
        }
    }

    #[tokio::test]
    async fn analysis_mode_sends_current_turn_only() {
        let gateway = ScriptedGateway::new(vec![Ok("a".into()), Ok("b".into())]);
        let orch = TriageOrchestrator::new(gateway.clone()).with_mode(RequestMode::Analysis);
        let mut ctx = TriageContext::default();

        orch.handle_turn(&mut ctx, "first", None).await.unwrap();
        orch.handle_turn(&mut ctx, "second", None).await.unwrap();

        match gateway.last_request().payload {
            RequestPayload::Analysis { text, temperature, .. } => {
                assert_eq!(text, "second");
                assert!((temperature - 0.7).abs() < f32::EPSILON);
            }
            _ => panic!("expected analysis payload"),
        }
    }

    #[tokio::test]
    async fn instruction_tracks_location_changes() {
        let gateway = ScriptedGateway::new(vec![Ok("a".into()), Ok("b".into())]);
        let orch = TriageOrchestrator::new(gateway.clone());
        let mut ctx = TriageContext::new(Location::Lagos);

        orch.handle_turn(&mut ctx, "hello", None).await.unwrap();
        assert!(gateway.last_request().instruction.contains("Lagos"));

        ctx.set_location(Location::Kaduna);
        orch.handle_turn(&mut ctx, "hello again", None).await.unwrap();
        let instruction = gateway.last_request().instruction;
        assert!(instruction.contains("Kaduna"));
        assert!(!instruction.contains("Lagos"));
    }

    #[tokio::test]
    async fn failed_attachment_decode_appends_exactly_one_user_turn() {
        let gateway = ScriptedGateway::single_text("reply");
        let orch = TriageOrchestrator::new(gateway.clone()).with_mode(RequestMode::Analysis);
        let mut ctx = TriageContext::default();
        let artifact = Artifact::new("garbled.pdf", b"not a pdf".to_vec());

        let before = ctx.session.len();
        let outcome = orch
            .handle_turn(&mut ctx, "see attached", Some(&artifact))
            .await
            .unwrap();

        assert!(matches!(
            outcome.warning,
            Some(TurnWarning::AttachmentDropped { .. })
        ));
        // One user turn plus the assistant reply — the failed decode adds nothing
        assert_eq!(ctx.session.len(), before + 2);
        match gateway.last_request().payload {
            RequestPayload::Analysis { artifact, .. } => assert!(artifact.is_none()),
            _ => panic!("expected analysis payload"),
        }
    }

    #[tokio::test]
    async fn valid_attachment_reaches_the_gateway() {
        let gateway = ScriptedGateway::single_text("that scan looks normal");
        let orch = TriageOrchestrator::new(gateway.clone()).with_mode(RequestMode::Analysis);
        let mut ctx = TriageContext::default();
        let artifact = Artifact::new("scan.png", PNG_HEADER.to_vec());

        let outcome = orch
            .handle_turn(&mut ctx, "explain this", Some(&artifact))
            .await
            .unwrap();

        assert!(outcome.warning.is_none());
        match gateway.last_request().payload {
            RequestPayload::Analysis { artifact, .. } => {
                assert_eq!(artifact.unwrap().mime_type(), "image/png");
            }
            _ => panic!("expected analysis payload"),
        }
    }

    #[tokio::test]
    async fn empty_message_rejected_before_append() {
        let gateway = ScriptedGateway::new(vec![]);
        let orch = TriageOrchestrator::new(gateway);
        let mut ctx = TriageContext::default();

        let result = orch.handle_turn(&mut ctx, "   ", None).await;

        assert!(matches!(result, Err(Error::EmptyMessage)));
        assert!(ctx.session.is_empty());
    }

    #[tokio::test]
    async fn overlong_message_rejected_before_append() {
        let gateway = ScriptedGateway::new(vec![]);
        let orch = TriageOrchestrator::new(gateway);
        let mut ctx = TriageContext::default();
        let long = "a".repeat(MAX_MESSAGE_CHARS + 1);

        let result = orch.handle_turn(&mut ctx, &long, None).await;

        assert!(matches!(result, Err(Error::MessageTooLong(_))));
        assert!(ctx.session.is_empty());
    }

    #[tokio::test]
    async fn message_at_max_length_accepted() {
        let gateway = ScriptedGateway::single_text("ok");
        let orch = TriageOrchestrator::new(gateway);
        let mut ctx = TriageContext::default();
        let msg = "a".repeat(MAX_MESSAGE_CHARS);

        assert!(orch.handle_turn(&mut ctx, &msg, None).await.is_ok());
    }

    #[tokio::test]
    async fn export_is_unavailable_for_empty_session() {
        let gateway = ScriptedGateway::new(vec![]);
        let orch = TriageOrchestrator::new(gateway);
        let ctx = TriageContext::default();

        assert!(orch.export(&ctx).is_none());
    }

    #[tokio::test]
    async fn export_reflects_completed_turns() {
        let gateway = ScriptedGateway::single_text("[SELF-CARE/PHARMACY] drink water");
        let orch = TriageOrchestrator::new(gateway);
        let mut ctx = TriageContext::default();

        orch.handle_turn(&mut ctx, "I feel tired", None).await.unwrap();

        let transcript = orch.export(&ctx).unwrap();
        let blocks: Vec<&str> = transcript.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "USER: I feel tired");
        assert_eq!(blocks[1], "ASSISTANT: [SELF-CARE/PHARMACY] drink water");
    }
}
