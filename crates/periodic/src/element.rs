use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::{AtomicNumber, Element, Isotope, MassNumber, errors::AtomicLookupError};

impl<'a> Element<'a> {
    pub(crate) const fn new(
        symbol: &'a str,
        name: &'a str,
        number: AtomicNumber,
        isotopes: &'a ahash::HashMap<MassNumber, Isotope>,
    ) -> Self {
        Self {
            symbol,
            name,
            number,
            isotopes,
        }
    }

    #[must_use]
    pub const fn symbol(&self) -> &'a str {
        self.symbol
    }

    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    #[must_use]
    pub const fn number(&self) -> AtomicNumber {
        self.number
    }

    /// Every known isotope of this element, lightest first
    pub fn isotopes(&self) -> impl Iterator<Item = &'a Isotope> + use<'a> {
        self.isotopes
            .values()
            .sorted_unstable_by_key(|i| i.mass_number)
    }

    #[must_use]
    pub fn major_isotope(&self) -> Option<&'a Isotope> {
        self.isotopes
            .values()
            .filter(|i| i.abundance.is_some())
            .max_by_key(|i| i.abundance)
    }

    pub fn isotope(&self, mass_number: MassNumber) -> Result<&'a Isotope, AtomicLookupError> {
        self.isotopes.get(&mass_number).ok_or_else(|| {
            AtomicLookupError::Isotope(
                self.symbol.to_owned(),
                mass_number,
                self.name.to_owned(),
                self.isotopes.keys().copied().sorted().collect(),
            )
        })
    }
}

impl Display for Element<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;
    use rust_decimal_macros::dec;

    use crate::{AtomicDatabase, IsotopeTable, MassNumber};

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);

    #[test]
    fn major_isotopes() {
        let major = |symbol| {
            let element = DB.element(symbol).unwrap();
            element.major_isotope().map(|i| u32::from(i.mass_number()))
        };
        assert_eq!(major("H"), Some(1));
        assert_eq!(major("C"), Some(12));
        assert_eq!(major("O"), Some(16));
        assert_eq!(major("Cl"), Some(35));
        assert_eq!(major("Br"), Some(79));
        assert_eq!(major("Fe"), Some(56));
        assert_eq!(major("Sn"), Some(120));
        assert_eq!(major("U"), Some(238));
        // No naturally occurring isotopes
        assert_eq!(major("Tc"), None);
        assert_eq!(major("Og"), None);
    }

    #[test]
    fn isotope_lookup() {
        let carbon = DB.element("C").unwrap();
        let c13 = carbon.isotope(MassNumber::from(13)).unwrap();
        assert_eq!(c13.relative_mass(), dec!(13.00335483507));
        assert_eq!(c13.abundance(), Some(dec!(0.0107)));

        let c14 = carbon.isotope(MassNumber::from(14)).unwrap();
        assert_eq!(c14.abundance(), None);

        let c15 = carbon.isotope(MassNumber::from(15));
        insta::assert_snapshot!(c15.unwrap_err(), @r#"the isotope "C-15" could not be found in the supplied atomic database, though the following Carbon isotopes were found: [MassNumber(12), MassNumber(13), MassNumber(14)]"#);
    }

    #[test]
    fn isotopes_are_sorted() {
        let oxygen = DB.element("O").unwrap();
        let mass_numbers: Vec<_> = oxygen.isotopes().map(|i| u32::from(i.mass_number())).collect();
        assert_eq!(mass_numbers, vec![16, 17, 18]);
    }

    #[test]
    fn display_element() {
        let chlorine = DB.element("Cl").unwrap();
        assert_eq!(chlorine.to_string(), "Chlorine (Cl)");
    }
}
