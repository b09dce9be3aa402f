//! The single output of the decision engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Charger connector direction
///
/// `Up` extends the connector, `Down` retracts it. `Hold` means no change is
/// instructed this tick; the control loop resolves it to the last commanded
/// direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Hold,
}

impl Direction {
    /// Get the direction as its wire/log string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Hold => "hold",
        }
    }

    /// Resolve `Hold` against a previously commanded direction
    pub fn or_previous(self, previous: Direction) -> Direction {
        match self {
            Direction::Hold => previous,
            other => other,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
