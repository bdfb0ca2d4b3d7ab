//! Macros for declaring cyclic persisted states.

/// Declare a cyclic state enum and implement [`State`](crate::core::State)
/// for it.
///
/// Variants cycle in declaration order: `next()` on the last variant wraps
/// to the first. `ordinal()`/`from_ordinal()` give the stable integer form
/// used by persisted attributes.
///
/// # Example
///
/// ```
/// use firecontrol::cycle_state;
/// use firecontrol::core::State;
///
/// cycle_state! {
///     pub enum Bolt {
///         Forward,
///         Back,
///     }
///     resting: Forward
/// }
///
/// assert_eq!(Bolt::Forward.next(), Bolt::Back);
/// assert_eq!(Bolt::Back.next(), Bolt::Forward);
/// assert!(Bolt::Forward.is_resting());
/// assert_eq!(Bolt::from_ordinal(1), Some(Bolt::Back));
/// ```
#[macro_export]
macro_rules! cycle_state {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }

        $(resting: $resting:ident)?
    ) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),+
        }

        impl $name {
            /// Every state in cycle order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable integer form of this state.
            pub fn ordinal(&self) -> usize {
                Self::ALL.iter().position(|s| s == self).unwrap_or(0)
            }

            /// Inverse of [`Self::ordinal`]; `None` when out of range.
            pub fn from_ordinal(ordinal: usize) -> Option<Self> {
                Self::ALL.get(ordinal).copied()
            }

            /// The state following this one in the cycle.
            pub fn next(&self) -> Self {
                Self::ALL[(self.ordinal() + 1) % Self::ALL.len()]
            }
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }

            #[allow(unreachable_patterns)]
            fn is_resting(&self) -> bool {
                match self {
                    $(Self::$resting => true,)?
                    _ => false,
                }
            }
        }
    };
}
