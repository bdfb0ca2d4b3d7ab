//! Core state types shared by the fire-control machinery:
//! - State definitions via the `State` trait and the `cycle_state!` macro
//! - Guard predicates for transition control
//! - Bounded transition history
//! - Tick and wall-clock helpers

mod guard;
mod history;
#[macro_use]
mod macros;
mod state;
pub mod time;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_LIMIT};
pub use state::State;
