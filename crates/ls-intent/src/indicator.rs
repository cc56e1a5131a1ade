//! Turn-indicator intent.

use ls_core::LateralDirection;

/// Which indicator the agent wants to show.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnIndicatorIntent {
    #[default]
    None,
    Left,
    Right,
    /// Left and right were both requested with no distance to decide between them.
    Conflicting,
}

impl TurnIndicatorIntent {
    #[inline]
    pub fn is_left(self) -> bool {
        self == TurnIndicatorIntent::Left
    }

    #[inline]
    pub fn is_right(self) -> bool {
        self == TurnIndicatorIntent::Right
    }

    #[inline]
    pub fn is_conflicting(self) -> bool {
        self == TurnIndicatorIntent::Conflicting
    }

    /// Merge a request for `side` into the current intent.
    pub(crate) fn merge(self, side: LateralDirection) -> Self {
        let requested = Self::from(side);
        match self {
            TurnIndicatorIntent::None => requested,
            current if current == requested => current,
            _ => TurnIndicatorIntent::Conflicting,
        }
    }
}

impl From<LateralDirection> for TurnIndicatorIntent {
    fn from(side: LateralDirection) -> Self {
        match side {
            LateralDirection::Left => TurnIndicatorIntent::Left,
            LateralDirection::Right => TurnIndicatorIntent::Right,
        }
    }
}
