//! One-line summaries of decoded SD records, shared by the `sdfinder` and `sdfdump` binaries

// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use ctab::Record;
use molgraph::{AtomKind, Mass, Molecule};
use periodic::{AtomicNumber, IsotopeTable};
use rust_decimal::Decimal;

// Public API ==========================================================================================================

/// What gets printed for each record: its title, formula, size and monoisotopic mass
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RecordSummary {
    pub title: String,
    pub formula: String,
    pub atoms: usize,
    pub bonds: usize,
    pub sgroups: usize,
    pub stereocentres: usize,
    /// `None` when the record contains pseudo-atoms, or isotopes missing from the database
    pub monoisotopic_mass: Option<Decimal>,
    pub issues: usize,
}

impl RecordSummary {
    pub fn new(table: &impl IsotopeTable, record: &Record) -> Self {
        let molecule = &record.molecule;
        Self {
            title: molecule.title.clone().unwrap_or_default(),
            formula: molecule.formula(),
            atoms: molecule.atom_count(),
            bonds: molecule.bond_count(),
            sgroups: molecule.sgroups().len(),
            stereocentres: molecule.stereo_elements().len(),
            monoisotopic_mass: monoisotopic_mass(table, molecule),
            issues: record.issues.len(),
        }
    }
}

/// The sum of the isotope masses of every atom, counting implicit hydrogens. Atoms without an explicit isotope are
/// counted as the most abundant isotope of their element.
pub fn monoisotopic_mass(table: &impl IsotopeTable, molecule: &Molecule) -> Option<Decimal> {
    let hydrogen = table.major_isotope(AtomicNumber::from(1))?.relative_mass();
    molecule.atoms().try_fold(Decimal::ZERO, |mass, (_, atom)| {
        let AtomKind::Element { number, symbol } = &atom.kind else {
            return None;
        };
        let isotope = match atom.mass {
            Mass::Isotope(mass_number) => table.isotope(symbol, mass_number).ok()?,
            Mass::Natural | Mass::Unresolved => table.major_isotope(*number)?,
        };
        let hydrogens = Decimal::from(atom.implicit_hydrogens.unwrap_or_default());
        Some(mass + isotope.relative_mass() + hydrogen * hydrogens)
    })
}

impl Display for RecordSummary {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let Self {
            title,
            formula,
            atoms,
            bonds,
            sgroups,
            stereocentres,
            monoisotopic_mass,
            issues,
        } = self;
        let title = if title.is_empty() { "(untitled)" } else { title };
        write!(f, "{title}: {formula}, {atoms} atoms, {bonds} bonds")?;
        if *sgroups > 0 {
            write!(f, ", {sgroups} Sgroups")?;
        }
        if *stereocentres > 0 {
            write!(f, ", {stereocentres} stereocentres")?;
        }
        if let Some(mass) = monoisotopic_mass {
            write!(f, ", {} Da", decimal_round_workaround(*mass, 6))?;
        }
        if *issues > 0 {
            write!(f, " ({issues} issues)")?;
        }
        Ok(())
    }
}

// FIXME: Really this should be fixed in `rust_decimal`...
fn decimal_round_workaround(value: impl Into<Decimal>, decimal_points: u32) -> String {
    let value = value.into().round_dp(decimal_points);
    format!("{value}")
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use ctab::{MolfileReader, ReaderConfig};
    use indoc::indoc;
    use insta::assert_snapshot;
    use periodic::AtomicDatabase;

    use super::RecordSummary;

    static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

    fn summarise(text: &str) -> RecordSummary {
        let record = MolfileReader::new(&*DB, ReaderConfig::default()).read_str(text).unwrap().unwrap();
        RecordSummary::new(&*DB, &record)
    }

    const GLYCINE: &str = indoc! {"
        glycine
          sdfinder

          5  4  0  0  0  0  0  0  0  0999 V2000
           -0.8660   -0.5000    0.0000 N   0  0  0  0  0  0  0  0  0  0  0  0
            0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
            0.8660   -0.5000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
            1.7321    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
            0.8660   -1.5000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
          1  2  1  0
          2  3  1  0
          3  4  1  0
          3  5  2  0
        M  END
    "};

    #[test]
    fn glycine() {
        let summary = summarise(GLYCINE);
        assert_eq!(summary.formula, "C2H5NO2");
        assert_snapshot!(summary, @"glycine: C2H5NO2, 5 atoms, 4 bonds, 75.032028 Da");
    }

    #[test]
    fn labelled_glycine() {
        let text = GLYCINE.replace("M  END", "M  ISO  1   1  15\nM  END");
        let summary = summarise(&text);
        assert_snapshot!(summary, @"glycine: C2H5NO2, 5 atoms, 4 bonds, 76.029063 Da");
    }

    #[test]
    fn pseudo_atoms_have_no_mass() {
        let text = GLYCINE.replace("M  END", "M  RGP  1   1   1\nM  END").replace("glycine\n", "\n");
        let summary = summarise(&text);
        assert_eq!(summary.monoisotopic_mass, None);
        assert_snapshot!(summary, @"(untitled): C2H3O2R1, 5 atoms, 4 bonds");
    }
}
