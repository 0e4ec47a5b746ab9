use miette::Diagnostic;
use thiserror::Error;

use crate::{AtomIndex, BondIndex};

pub type Result<T, E = GraphError> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum GraphError {
    #[error("atom {index} does not exist in a molecule containing {count} atoms")]
    #[diagnostic(help("atom indices are zero-based"))]
    MissingAtom { index: AtomIndex, count: usize },

    #[error("bond {index} does not exist in a molecule containing {count} bonds")]
    #[diagnostic(help("bond indices are zero-based"))]
    MissingBond { index: BondIndex, count: usize },

    #[error("atom {0} cannot be bonded to itself")]
    SelfBond(AtomIndex),
}

impl GraphError {
    pub(crate) const fn missing_atom(index: AtomIndex, count: usize) -> Self {
        Self::MissingAtom { index, count }
    }

    pub(crate) const fn missing_bond(index: BondIndex, count: usize) -> Self {
        Self::MissingBond { index, count }
    }
}
