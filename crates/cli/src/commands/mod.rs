pub mod ask;
pub mod chat;

use std::path::Path;
use std::sync::Arc;

use medtriage_config::{AppConfig, ConfigError};
use medtriage_core::{Artifact, Location};
use medtriage_gateway::GeminiGateway;

/// Load config and build the backend gateway, or fail fatally with setup
/// guidance. No orchestrator is constructed unless this succeeds.
pub(crate) fn bootstrap() -> Result<(AppConfig, Arc<GeminiGateway>), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let gateway = match GeminiGateway::from_config(&config) {
        Ok(gateway) => gateway,
        Err(ConfigError::MissingApiKey) => {
            eprintln!();
            eprintln!("  ERROR: No API key configured!");
            eprintln!();
            eprintln!("  Set one of these environment variables:");
            eprintln!("    GEMINI_API_KEY    (recommended)");
            eprintln!("    GOOGLE_API_KEY");
            eprintln!("    MEDTRIAGE_API_KEY");
            eprintln!();
            eprintln!("  Or add it to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            return Err("No API key found. See above for setup instructions.".into());
        }
        Err(e) => return Err(e.into()),
    };

    Ok((config, Arc::new(gateway)))
}

/// Resolve the session location from a CLI flag, falling back to config.
pub(crate) fn resolve_location(
    flag: Option<String>,
    config: &AppConfig,
) -> Result<Location, Box<dyn std::error::Error>> {
    match flag {
        None => Ok(config.default_location),
        Some(raw) => raw.parse::<Location>().map_err(|e| {
            let options: Vec<&str> = Location::ALL.iter().map(|l| l.name()).collect();
            format!("{e}. Valid locations: {}", options.join(", ")).into()
        }),
    }
}

/// Read an attachment from disk. A missing or unreadable file is reported and
/// skipped — the consultation continues text-only.
pub(crate) fn load_attachment(path: &Path) -> Option<Artifact> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("attachment")
                .to_string();
            Some(Artifact::new(file_name, bytes))
        }
        Err(e) => {
            eprintln!("  [Warning] Could not read {}: {e}. Continuing with text only.", path.display());
            None
        }
    }
}

/// The blocking, high-visibility directive for emergency-flagged replies.
pub(crate) fn print_emergency_banner() {
    println!();
    println!("  ╔══════════════════════════════════════════════════════════╗");
    println!("  ║  🚨 IMMEDIATE ACTION REQUIRED                            ║");
    println!("  ║  Please proceed to the nearest Emergency Room            ║");
    println!("  ║  or call 112 now.                                        ║");
    println!("  ╚══════════════════════════════════════════════════════════╝");
    println!();
}
