//! A compact molecular graph: atoms, bonds, and the annotations a connection table can carry

mod atom;
mod bond;
pub mod errors;
mod molecule;
pub mod sgroup;
mod stereo;

// External Crate Imports
use derive_more::{Display, From, Into};
use serde::Serialize;

pub use atom::{Atom, AtomKind, Mass, Parity, Position};
pub use bond::{Bond, BondKind, BondStereo};
pub use errors::{GraphError, Result};
pub use molecule::Molecule;
pub use sgroup::Sgroup;
pub use stereo::{TetrahedralStereo, Winding};

// NOTE: All indices are zero-based positions in their owning `Molecule`; the one-based numbering of file formats is
// the business of the readers
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, Into, Serialize)]
pub struct AtomIndex(usize);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, Into, Serialize)]
pub struct BondIndex(usize);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, Into, Serialize)]
pub struct SgroupIndex(usize);

macro_rules! index_impls {
    ($($index:ty),+ $(,)?) => {
        $(
            impl $index {
                #[must_use]
                pub const fn new(index: usize) -> Self {
                    Self(index)
                }

                #[must_use]
                pub const fn get(self) -> usize {
                    self.0
                }
            }
        )+
    };
}

index_impls!(AtomIndex, BondIndex, SgroupIndex);
