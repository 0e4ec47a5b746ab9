use serde::Serialize;

use crate::AtomIndex;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Bond {
    pub begin: AtomIndex,
    pub end: AtomIndex,
    pub kind: BondKind,
    pub stereo: BondStereo,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum BondKind {
    Single,
    Double,
    Triple,
    Aromatic,
    // Query bonds
    SingleOrDouble,
    SingleOrAromatic,
    DoubleOrAromatic,
    Any,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize)]
pub enum BondStereo {
    #[default]
    None,
    Up,
    Down,
    UpOrDown,
    /// Double-bond geometry is explicitly left unspecified
    EOrZ,
    /// Double-bond geometry should be perceived from the atom coordinates
    EZByCoordinates,
}

impl Bond {
    #[must_use]
    pub const fn new(begin: AtomIndex, end: AtomIndex, kind: BondKind) -> Self {
        Self {
            begin,
            end,
            kind,
            stereo: BondStereo::None,
        }
    }

    #[must_use]
    pub fn contains(&self, atom: AtomIndex) -> bool {
        self.begin == atom || self.end == atom
    }

    /// The atom on the other end of this bond from `atom`
    #[must_use]
    pub fn partner(&self, atom: AtomIndex) -> Option<AtomIndex> {
        if self.begin == atom {
            Some(self.end)
        } else if self.end == atom {
            Some(self.begin)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn order(&self) -> Option<u32> {
        self.kind.order()
    }

    #[must_use]
    pub const fn is_aromatic(&self) -> bool {
        matches!(self.kind, BondKind::Aromatic)
    }
}

impl BondKind {
    /// The concrete bond order, or `None` for aromatic and query bonds
    #[must_use]
    pub const fn order(self) -> Option<u32> {
        match self {
            Self::Single => Some(1),
            Self::Double => Some(2),
            Self::Triple => Some(3),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_query(self) -> bool {
        matches!(
            self,
            Self::SingleOrDouble | Self::SingleOrAromatic | Self::DoubleOrAromatic | Self::Any
        )
    }
}
