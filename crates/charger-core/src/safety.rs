//! Latched emergency-stop state

use serde::{Deserialize, Serialize};

/// Emergency-stop latch
///
/// Moves from untripped to tripped only. There is no way to clear it short
/// of restarting the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyState {
    tripped: bool,
}

impl SafetyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A state that is already latched
    pub fn tripped() -> Self {
        Self { tripped: true }
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    /// Latch the stop; returns true only on the call that tripped it
    pub fn trip(&mut self) -> bool {
        !std::mem::replace(&mut self.tripped, true)
    }
}
