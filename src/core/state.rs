//! Core State trait for persisted weapon states.
//!
//! Selective fire and firearm action states implement this trait so that
//! history, guards and logging can treat them uniformly.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for persisted machine states.
///
/// All methods are pure. States are small copyable values stored on a
/// weapon instance and carried through scheduled tasks.
///
/// # Required Traits
///
/// - `Clone`: States are copied into history records and task payloads
/// - `PartialEq`: Transition tables compare states
/// - `Debug`: States appear in log fields
/// - `Serialize` + `Deserialize`: States are persisted with the weapon
///
/// # Example
///
/// ```rust
/// use firecontrol::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Hammer {
///     Down,
///     Cocked,
/// }
///
/// impl State for Hammer {
///     fn name(&self) -> &str {
///         match self {
///             Self::Down => "Down",
///             Self::Cocked => "Cocked",
///         }
///     }
///
///     fn is_resting(&self) -> bool {
///         matches!(self, Self::Down)
///     }
/// }
///
/// assert_eq!(Hammer::Cocked.name(), "Cocked");
/// assert!(Hammer::Down.is_resting());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is the state a machine settles in when idle.
    ///
    /// Default implementation returns `false`.
    fn is_resting(&self) -> bool {
        false
    }
}
