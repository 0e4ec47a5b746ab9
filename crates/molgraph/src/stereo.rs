use serde::Serialize;

use crate::AtomIndex;

/// A tetrahedral stereocentre, described by looking from the first carrier towards the focus and reading the winding
/// of the remaining three
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub struct TetrahedralStereo {
    pub focus: AtomIndex,
    // NOTE: An implicit hydrogen or lone pair is represented by the focus itself
    pub carriers: [AtomIndex; 4],
    pub winding: Winding,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum Winding {
    Clockwise,
    Anticlockwise,
}

impl Winding {
    #[must_use]
    pub const fn invert(self) -> Self {
        match self {
            Self::Clockwise => Self::Anticlockwise,
            Self::Anticlockwise => Self::Clockwise,
        }
    }
}
