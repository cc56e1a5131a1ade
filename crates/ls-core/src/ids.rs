//! Typed identifiers for agents and lanes.
//!
//! Both wrap a `u32` and display as `#n`, so messages read "lane #3" rather
//! than repeating the type name.  A [`LaneId`] doubles as the lane's slot in
//! the network's lane table; see [`LaneId::index`].

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Placeholder for an id that was never assigned.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() { write!(f, "#{}", self.0) } else { f.write_str("#invalid") }
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;

            fn try_from(n: usize) -> Result<Self, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A simulated vehicle.
    AgentId
}

typed_id! {
    /// A lane of the `LaneNetwork`, numbered in insertion order.
    LaneId
}
