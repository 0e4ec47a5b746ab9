use miette::Diagnostic;
use thiserror::Error;

use crate::MassNumber;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum AtomicLookupError {
    #[error("the element {0:?} could not be found in the supplied atomic database")]
    Element(String),

    #[error(
        "the isotope \"{0}-{1}\" could not be found in the supplied atomic database, though the following {2} isotopes were found: {3:?}"
    )]
    Isotope(String, MassNumber, String, Vec<MassNumber>),

    #[error("the atomic number {0} does not belong to any element in the supplied atomic database")]
    #[diagnostic(help("atomic numbers run from 1 (hydrogen) to 118 (oganesson)"))]
    AtomicNumber(u8),
}
