//! The jurisdiction the user is consulting from.
//!
//! A fixed set of Nigerian states/cities plus a catch-all. Selected once per
//! session by the user, changeable mid-session, and read by the instruction
//! builder on every request.

use serde::{Deserialize, Serialize};

/// An enumerated jurisdiction value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    #[default]
    Lagos,
    Abuja,
    Kano,
    PortHarcourt,
    Ibadan,
    Enugu,
    Kaduna,
    Other,
}

impl Location {
    /// All selectable locations, in presentation order.
    pub const ALL: [Location; 8] = [
        Location::Lagos,
        Location::Abuja,
        Location::Kano,
        Location::PortHarcourt,
        Location::Ibadan,
        Location::Enugu,
        Location::Kaduna,
        Location::Other,
    ];

    /// The human-readable jurisdiction name.
    pub fn name(&self) -> &'static str {
        match self {
            Location::Lagos => "Lagos",
            Location::Abuja => "Abuja",
            Location::Kano => "Kano",
            Location::PortHarcourt => "Port Harcourt",
            Location::Ibadan => "Ibadan",
            Location::Enugu => "Enugu",
            Location::Kaduna => "Kaduna",
            Location::Other => "Other",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "lagos" => Ok(Location::Lagos),
            "abuja" => Ok(Location::Abuja),
            "kano" => Ok(Location::Kano),
            "port harcourt" | "portharcourt" => Ok(Location::PortHarcourt),
            "ibadan" => Ok(Location::Ibadan),
            "enugu" => Ok(Location::Enugu),
            "kaduna" => Ok(Location::Kaduna),
            "other" => Ok(Location::Other),
            _ => Err(format!("unknown location: {s}")),
        }
    }
}
