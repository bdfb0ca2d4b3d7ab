//! Firearm action states and kinds.

use serde::{Deserialize, Serialize};

cycle_state! {
    /// Mechanical action of a weapon instance.
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum FirearmState {
        Ready,
        Open,
        Close,
    }
    resting: Ready
}

impl Default for FirearmState {
    fn default() -> Self {
        Self::Ready
    }
}

/// Mechanical action type of a firearm.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FirearmKind {
    Revolver,
    Pump,
    Lever,
    Slide,
}

impl FirearmKind {
    /// Whether firing a shot cycles the action.
    ///
    /// Revolvers and slides only cycle around reloads.
    pub fn has_shoot_actions(&self) -> bool {
        matches!(self, Self::Pump | Self::Lever)
    }
}
