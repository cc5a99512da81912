//! The fixed set of ways a route can be travelled
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Driving,
    Cycling,
    Walking,
}

impl TravelMode {
    pub const ALL: [TravelMode; 3] = [TravelMode::Driving, TravelMode::Cycling, TravelMode::Walking];

    /// Default routing profile identifier, routing handlers may override it
    pub fn profile(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Cycling => "cycling",
            TravelMode::Walking => "walking",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TravelMode::Driving => "Driving",
            TravelMode::Cycling => "Cycling",
            TravelMode::Walking => "Walking",
        }
    }

    /// The mode after this one, wrapping around
    pub fn next(self) -> Self {
        match self {
            TravelMode::Driving => TravelMode::Cycling,
            TravelMode::Cycling => TravelMode::Walking,
            TravelMode::Walking => TravelMode::Driving,
        }
    }
}

impl Default for TravelMode {
    fn default() -> Self {
        TravelMode::Driving
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TravelMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "driving" | "car" => Ok(TravelMode::Driving),
            "cycling" | "bike" => Ok(TravelMode::Cycling),
            "walking" | "foot" => Ok(TravelMode::Walking),
            _ => Err(Error::Other(format!(
                "unknown travel mode '{}', expected driving, cycling or walking",
                s
            ))),
        }
    }
}
