//! Maneuver descriptors and the static tables that turn them into text and icons
use log::debug;
use std::fmt;

/// Kind of maneuver reported by the routing service
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManeuverType {
    Depart,
    Arrive,
    Turn,
    NewName,
    Continue,
    Merge,
    OnRamp,
    OffRamp,
    Fork,
    EndOfRoad,
    UseLane,
    Roundabout,
    Rotary,
    RoundaboutTurn,
    ExitRoundabout,
    ExitRotary,
    Notification,
    /// Any type this crate doesn't know about, kept verbatim
    Other(String),
}

impl ManeuverType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "depart" => ManeuverType::Depart,
            "arrive" => ManeuverType::Arrive,
            "turn" => ManeuverType::Turn,
            "new name" => ManeuverType::NewName,
            "continue" => ManeuverType::Continue,
            "merge" => ManeuverType::Merge,
            "on ramp" => ManeuverType::OnRamp,
            "off ramp" => ManeuverType::OffRamp,
            "fork" => ManeuverType::Fork,
            "end of road" => ManeuverType::EndOfRoad,
            "use lane" => ManeuverType::UseLane,
            "roundabout" => ManeuverType::Roundabout,
            "rotary" => ManeuverType::Rotary,
            "roundabout turn" => ManeuverType::RoundaboutTurn,
            "exit roundabout" => ManeuverType::ExitRoundabout,
            "exit rotary" => ManeuverType::ExitRotary,
            "notification" => ManeuverType::Notification,
            other => ManeuverType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ManeuverType::Depart => "depart",
            ManeuverType::Arrive => "arrive",
            ManeuverType::Turn => "turn",
            ManeuverType::NewName => "new name",
            ManeuverType::Continue => "continue",
            ManeuverType::Merge => "merge",
            ManeuverType::OnRamp => "on ramp",
            ManeuverType::OffRamp => "off ramp",
            ManeuverType::Fork => "fork",
            ManeuverType::EndOfRoad => "end of road",
            ManeuverType::UseLane => "use lane",
            ManeuverType::Roundabout => "roundabout",
            ManeuverType::Rotary => "rotary",
            ManeuverType::RoundaboutTurn => "roundabout turn",
            ManeuverType::ExitRoundabout => "exit roundabout",
            ManeuverType::ExitRotary => "exit rotary",
            ManeuverType::Notification => "notification",
            ManeuverType::Other(raw) => raw,
        }
    }
}

/// Direction change attached to a maneuver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    UTurn,
    SharpRight,
    Right,
    SlightRight,
    Straight,
    SlightLeft,
    Left,
    SharpLeft,
}

impl Modifier {
    /// Parse a modifier, unknown values are dropped
    pub fn parse(raw: &str) -> Option<Self> {
        let modifier = match raw {
            "uturn" => Modifier::UTurn,
            "sharp right" => Modifier::SharpRight,
            "right" => Modifier::Right,
            "slight right" => Modifier::SlightRight,
            "straight" => Modifier::Straight,
            "slight left" => Modifier::SlightLeft,
            "left" => Modifier::Left,
            "sharp left" => Modifier::SharpLeft,
            _ => {
                debug!("ignoring unknown maneuver modifier: {}", raw);
                return None;
            }
        };
        Some(modifier)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::UTurn => "uturn",
            Modifier::SharpRight => "sharp right",
            Modifier::Right => "right",
            Modifier::SlightRight => "slight right",
            Modifier::Straight => "straight",
            Modifier::SlightLeft => "slight left",
            Modifier::Left => "left",
            Modifier::SharpLeft => "sharp left",
        }
    }

    fn is_left(self) -> bool {
        matches!(self, Modifier::SlightLeft | Modifier::Left | Modifier::SharpLeft)
    }

    fn is_right(self) -> bool {
        matches!(
            self,
            Modifier::SlightRight | Modifier::Right | Modifier::SharpRight
        )
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directional symbol shown next to an instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManeuverIcon {
    Straight,
    Left,
    Right,
    Merge,
    Fork,
    Roundabout,
    Depart,
    Arrive,
    Generic,
}

impl ManeuverIcon {
    pub fn for_maneuver(kind: &ManeuverType, modifier: Option<Modifier>) -> Self {
        match kind {
            ManeuverType::Depart => ManeuverIcon::Depart,
            ManeuverType::Arrive => ManeuverIcon::Arrive,
            ManeuverType::Merge => ManeuverIcon::Merge,
            ManeuverType::Fork => ManeuverIcon::Fork,
            ManeuverType::Roundabout
            | ManeuverType::Rotary
            | ManeuverType::RoundaboutTurn
            | ManeuverType::ExitRoundabout
            | ManeuverType::ExitRotary => ManeuverIcon::Roundabout,
            ManeuverType::Turn
            | ManeuverType::NewName
            | ManeuverType::Continue
            | ManeuverType::OnRamp
            | ManeuverType::OffRamp
            | ManeuverType::EndOfRoad
            | ManeuverType::UseLane => match modifier {
                Some(m) if m.is_left() => ManeuverIcon::Left,
                Some(m) if m.is_right() => ManeuverIcon::Right,
                Some(Modifier::UTurn) => ManeuverIcon::Generic,
                _ => ManeuverIcon::Straight,
            },
            ManeuverType::Notification | ManeuverType::Other(_) => ManeuverIcon::Generic,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ManeuverIcon::Straight => "↑",
            ManeuverIcon::Left => "←",
            ManeuverIcon::Right => "→",
            ManeuverIcon::Merge => "⇉",
            ManeuverIcon::Fork => "⑂",
            ManeuverIcon::Roundabout => "↻",
            ManeuverIcon::Depart => "●",
            ManeuverIcon::Arrive => "⚑",
            ManeuverIcon::Generic => "•",
        }
    }
}

/// Build an instruction for a maneuver the routing service didn't describe itself.
///
/// Every combination yields a non-empty sentence, unknown maneuver types read "Continue".
pub fn synthesize_instruction(
    kind: &ManeuverType,
    modifier: Option<Modifier>,
    road: &str,
    exit: Option<u32>,
) -> String {
    let road = road.trim();
    let onto = |base: String| {
        if road.is_empty() {
            base
        } else {
            format!("{} onto {}", base, road)
        }
    };
    let with_modifier = |verb: &str| match modifier {
        Some(m) => format!("{} {}", verb, m),
        None => verb.to_string(),
    };

    match kind {
        ManeuverType::Depart => onto("Depart".to_string()),
        ManeuverType::Arrive => "You have arrived at your destination".to_string(),
        ManeuverType::Turn => match modifier {
            Some(Modifier::Straight) => onto("Continue straight".to_string()),
            Some(Modifier::UTurn) => onto("Make a U-turn".to_string()),
            _ => onto(with_modifier("Turn")),
        },
        ManeuverType::NewName | ManeuverType::Continue => onto("Continue".to_string()),
        ManeuverType::Merge => onto(with_modifier("Merge")),
        ManeuverType::OnRamp => onto("Take the ramp".to_string()),
        ManeuverType::OffRamp => onto("Take the exit".to_string()),
        ManeuverType::Fork => match modifier {
            Some(m) => onto(format!("Keep {} at the fork", m)),
            None => onto("Keep at the fork".to_string()),
        },
        ManeuverType::EndOfRoad => onto(format!("{} at the end of the road", with_modifier("Turn"))),
        ManeuverType::UseLane => with_modifier("Use the lane to continue"),
        ManeuverType::Roundabout | ManeuverType::Rotary => match exit {
            Some(n) => onto(format!("Enter the roundabout and take exit {}", n)),
            None => onto("Enter the roundabout".to_string()),
        },
        ManeuverType::RoundaboutTurn => with_modifier("At the roundabout, turn"),
        ManeuverType::ExitRoundabout | ManeuverType::ExitRotary => {
            onto("Exit the roundabout".to_string())
        }
        ManeuverType::Notification | ManeuverType::Other(_) => "Continue".to_string(),
    }
}
