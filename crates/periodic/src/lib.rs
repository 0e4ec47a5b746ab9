//! A periodic table of elements and their isotopes, loaded from a KDL database

pub mod atomic_database;
mod element;
pub mod errors;
#[cfg(test)]
mod testing_tools;

// External Crate Imports
use ahash::HashMap;
use derive_more::{Display, From, Into};
use rust_decimal::Decimal;
use serde::Serialize;

// Local Crate Imports
use errors::AtomicLookupError;

pub use atomic_database::AtomicDatabase;

// NOTE: Elements borrow everything from the `AtomicDatabase` they were looked up in, so they are cheap to copy around
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Element<'a> {
    symbol: &'a str,
    name: &'a str,
    number: AtomicNumber,
    isotopes: &'a HashMap<MassNumber, Isotope>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, Into, Serialize)]
pub struct AtomicNumber(u8);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, Into, Serialize)]
pub struct MassNumber(u32);

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub struct Isotope {
    mass_number: MassNumber,
    relative_mass: Decimal,
    abundance: Option<Decimal>,
}

impl Isotope {
    #[must_use]
    pub const fn mass_number(&self) -> MassNumber {
        self.mass_number
    }

    #[must_use]
    pub const fn relative_mass(&self) -> Decimal {
        self.relative_mass
    }

    /// The natural abundance of this isotope as a fraction, or `None` for isotopes that don't occur naturally
    #[must_use]
    pub const fn abundance(&self) -> Option<Decimal> {
        self.abundance
    }
}

// =====================================================================================================================

/// The element and isotope lookups needed to interpret atom symbols and mass numbers
pub trait IsotopeTable {
    fn element(&self, symbol: &str) -> Option<Element<'_>>;

    fn element_by_number(&self, number: AtomicNumber) -> Option<Element<'_>>;

    fn is_element(&self, symbol: &str) -> bool {
        self.element(symbol).is_some()
    }

    fn atomic_number(&self, symbol: &str) -> Option<AtomicNumber> {
        self.element(symbol).map(|e| e.number())
    }

    /// The most abundant naturally occurring isotope, if the element has any
    fn major_isotope(&self, number: AtomicNumber) -> Option<&Isotope> {
        self.element_by_number(number)?.major_isotope()
    }

    fn isotope(&self, symbol: &str, mass_number: MassNumber) -> Result<&Isotope, AtomicLookupError>;
}

impl<T: IsotopeTable> IsotopeTable for &T {
    fn element(&self, symbol: &str) -> Option<Element<'_>> {
        (**self).element(symbol)
    }

    fn element_by_number(&self, number: AtomicNumber) -> Option<Element<'_>> {
        (**self).element_by_number(number)
    }

    fn isotope(&self, symbol: &str, mass_number: MassNumber) -> Result<&Isotope, AtomicLookupError> {
        (**self).isotope(symbol, mass_number)
    }
}
