//! `medtriage chat` — interactive triage consultation.

use std::path::PathBuf;

use medtriage_core::error::Error;
use medtriage_core::request::RequestMode;
use medtriage_core::turn::TRANSCRIPT_FILE_NAME;
use medtriage_core::Location;
use medtriage_session::{TriageContext, TriageOrchestrator};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{bootstrap, load_attachment, print_emergency_banner, resolve_location};

pub async fn run(
    location: Option<String>,
    analysis: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, gateway) = bootstrap()?;
    let location = resolve_location(location, &config)?;

    let mode = if analysis {
        RequestMode::Analysis
    } else {
        RequestMode::Conversational
    };
    let orchestrator = TriageOrchestrator::new(gateway).with_mode(mode);
    let mut ctx = TriageContext::new(location);

    // One attachment at most, valid only for the next turn
    let mut pending_attachment: Option<PathBuf> = None;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        MedTriage — Health Consultation       ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Location:  {}", ctx.location);
    println!("  Mode:      {mode:?}");
    println!();
    println!("  Describe your symptoms and press Enter.");
    println!("  Commands: /location <name>, /attach <file>, /save, exit");
    println!();

    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    print_prompt()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            print_prompt()?;
            continue;
        }

        if matches!(line.as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q") {
            break;
        }

        if let Some(raw) = line.strip_prefix("/location") {
            match raw.trim().parse::<Location>() {
                Ok(new_location) => {
                    ctx.set_location(new_location);
                    println!("  Now providing guidance for: {new_location}");
                }
                Err(e) => {
                    let options: Vec<&str> = Location::ALL.iter().map(|l| l.name()).collect();
                    println!("  {e}. Valid locations: {}", options.join(", "));
                }
            }
            print_prompt()?;
            continue;
        }

        if let Some(raw) = line.strip_prefix("/attach") {
            let path = PathBuf::from(raw.trim());
            if path.as_os_str().is_empty() {
                println!("  Usage: /attach <path to PDF/PNG/JPEG>");
            } else {
                println!("  File attached. Ask about your results in the next message.");
                pending_attachment = Some(path);
            }
            print_prompt()?;
            continue;
        }

        if line == "/save" {
            match orchestrator.export(&ctx) {
                Some(transcript) => {
                    std::fs::write(TRANSCRIPT_FILE_NAME, transcript)?;
                    println!("  Consultation saved to {TRANSCRIPT_FILE_NAME}");
                }
                None => println!("  Nothing to save yet."),
            }
            print_prompt()?;
            continue;
        }

        // Attachment is consumed by this turn whether or not it decodes
        let artifact = pending_attachment
            .take()
            .and_then(|path| load_attachment(&path));

        eprint!("  ...");
        let result = orchestrator
            .handle_turn(&mut ctx, &line, artifact.as_ref())
            .await;
        eprint!("\r     \r");

        match result {
            Ok(outcome) => {
                if let Some(warning) = &outcome.warning {
                    println!("  [Warning] {warning}");
                }
                if outcome.emergency {
                    print_emergency_banner();
                }
                println!();
                for reply_line in outcome.reply.lines() {
                    println!("  Assistant > {reply_line}");
                }
                if let Some(severity) = outcome.severity {
                    println!();
                    println!("  Severity: {severity}");
                }
                println!();
            }
            Err(Error::Gateway(e)) => {
                eprintln!(
                    "  📡 The assistant is temporarily unavailable. ({})",
                    e.diagnostic()
                );
                eprintln!("  Your message is kept — you can retry by sending it again.");
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print_prompt()?;
    }

    println!();
    println!("  Take care! 👋");
    println!();

    Ok(())
}

fn print_prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()
}
