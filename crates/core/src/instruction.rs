//! System instruction construction.
//!
//! The instruction parameterizes the backend with the safety policy and the
//! user's current jurisdiction. It is rebuilt on every request — the location
//! may change between turns, and a stale jurisdiction in the instruction
//! would misdirect facility suggestions.

use crate::location::Location;

/// Build the safety/jurisdiction system instruction for a request.
///
/// Pure function: same location in, same instruction out. The jurisdiction
/// name appears exactly once in the declared-location clause.
pub fn build_instruction(location: Location) -> String {
    let name = location.name();
    let mut prompt = String::with_capacity(1024);

    prompt.push_str("You are a medical triage assistant for the Nigerian public.\n");
    prompt.push_str(&format!("Current user location: {name}, Nigeria.\n\n"));

    prompt.push_str(
        "- Interpret local symptom phrases such as 'internal heat', \
         'body peppered', and 'malaria feelings'.\n",
    );
    prompt.push_str(
        "- If the user reports chest pain, sudden numbness, or severe \
         breathing difficulty, start your response with the word 'EMERGENCY'.\n",
    );
    prompt.push_str(
        "- If the user provides a lab report or describes one, explain it in \
         simple, non-alarming terms but insist they see a doctor.\n",
    );
    prompt.push_str(&format!(
        "- Suggest government hospitals or public healthcare centres in {name}.\n",
    ));
    prompt.push_str(
        "- Categorize every response as exactly one of: [EMERGENCY], \
         [URGENT CONSULT], or [SELF-CARE/PHARMACY].\n",
    );

    prompt
}
