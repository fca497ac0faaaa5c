//! Emergency classification of backend output.
//!
//! The safety instruction asks the model to *start* high-risk responses with
//! the emergency token, but the authoritative trigger is the token appearing
//! anywhere in the output — a reply that buries it mid-sentence still has to
//! raise the banner.

use serde::{Deserialize, Serialize};

/// The literal token that marks a high-risk presentation.
pub const EMERGENCY_TOKEN: &str = "EMERGENCY";

/// Inspect backend output for the emergency marker.
///
/// Case-insensitive substring match, anywhere in the text. `true` means the
/// caller must render a blocking, high-visibility directive to seek immediate
/// emergency care.
pub fn classify(output_text: &str) -> bool {
    output_text
        .to_uppercase()
        .contains(EMERGENCY_TOKEN)
}

/// The severity tag the instruction requires on every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Emergency,
    UrgentConsult,
    SelfCare,
}

impl Severity {
    /// The bracketed tag as the instruction spells it.
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Emergency => "[EMERGENCY]",
            Severity::UrgentConsult => "[URGENT CONSULT]",
            Severity::SelfCare => "[SELF-CARE/PHARMACY]",
        }
    }

    /// Detect the severity tag in backend output, case-insensitively.
    ///
    /// When more than one tag appears, the highest severity wins.
    pub fn detect(output_text: &str) -> Option<Severity> {
        let upper = output_text.to_uppercase();
        if upper.contains(EMERGENCY_TOKEN) {
            Some(Severity::Emergency)
        } else if upper.contains("URGENT CONSULT") {
            Some(Severity::UrgentConsult)
        } else if upper.contains("SELF-CARE") {
            Some(Severity::SelfCare)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
