//! Lateral direction of a lane change.

use std::fmt;

/// Side of the current lane, seen in the direction of travel.
///
/// "No lateral movement" is expressed as `Option<LateralDirection>::None`
/// throughout the workspace.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LateralDirection {
    Left,
    Right,
}

impl LateralDirection {
    #[inline]
    pub fn is_left(self) -> bool {
        self == LateralDirection::Left
    }

    #[inline]
    pub fn is_right(self) -> bool {
        self == LateralDirection::Right
    }

    /// The opposite side.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            LateralDirection::Left => LateralDirection::Right,
            LateralDirection::Right => LateralDirection::Left,
        }
    }

    /// `+1.0` for left, `-1.0` for right (left is the positive lateral axis).
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            LateralDirection::Left => 1.0,
            LateralDirection::Right => -1.0,
        }
    }
}

impl fmt::Display for LateralDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LateralDirection::Left => "left",
            LateralDirection::Right => "right",
        })
    }
}
