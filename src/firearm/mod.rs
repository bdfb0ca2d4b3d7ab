//! Firearm actions: the mechanical cycle (pump, lever, ...) that gates a
//! weapon's readiness to fire again.

mod error;
mod machine;
mod state;

pub use error::FirearmError;
pub use machine::{FirearmActionMachine, FirearmTransition};
pub use state::{FirearmKind, FirearmState};
