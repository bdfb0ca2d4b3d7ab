//! Firearm action errors.

use super::FirearmState;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FirearmError {
    #[error("Illegal firearm transition from {from:?} to {to:?}")]
    IllegalTransition { from: FirearmState, to: FirearmState },
}
