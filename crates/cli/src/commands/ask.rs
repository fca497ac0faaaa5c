//! `medtriage ask` — single-shot analysis of one complaint.

use std::path::PathBuf;

use medtriage_core::error::Error;
use medtriage_core::request::RequestMode;
use medtriage_session::{TriageContext, TriageOrchestrator};

use super::{bootstrap, load_attachment, print_emergency_banner, resolve_location};

pub async fn run(
    message: String,
    attach: Option<PathBuf>,
    location: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, gateway) = bootstrap()?;
    let location = resolve_location(location, &config)?;

    let orchestrator = TriageOrchestrator::new(gateway).with_mode(RequestMode::Analysis);
    let mut ctx = TriageContext::new(location);

    let artifact = attach.as_deref().and_then(load_attachment);

    eprint!("  Analyzing...");
    let result = orchestrator
        .handle_turn(&mut ctx, &message, artifact.as_ref())
        .await;
    eprint!("\r             \r");

    match result {
        Ok(outcome) => {
            if let Some(warning) = &outcome.warning {
                println!("  [Warning] {warning}");
            }
            if outcome.emergency {
                print_emergency_banner();
            }
            println!("{}", outcome.reply);
            if let Some(severity) = outcome.severity {
                println!();
                println!("Severity: {severity}");
            }
            Ok(())
        }
        Err(Error::Gateway(e)) => Err(format!(
            "The assistant is temporarily unavailable. ({})",
            e.diagnostic()
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}
