// Standard Library Imports
use std::ops::Range;

// External Crate Imports
use molgraph::{AtomIndex, Molecule, Parity, TetrahedralStereo, Winding};

/// Builds tetrahedral stereocentres from the parities recorded on the atoms in `atoms`. Atoms without a definite
/// parity, or without three or four neighbours, are skipped.
pub(crate) fn add_tetrahedral_stereo(molecule: &mut Molecule, atoms: Range<usize>) {
    let centres: Vec<_> = atoms
        .map(AtomIndex::new)
        .filter_map(|focus| stereocentre(molecule, focus))
        .collect();
    for centre in centres {
        molecule.add_stereo_element(centre);
    }
}

// Private Helper Methods ==============================================================================================

fn stereocentre(molecule: &Molecule, focus: AtomIndex) -> Option<TetrahedralStereo> {
    let winding = match molecule.atom(focus)?.parity {
        Parity::Odd => Winding::Clockwise,
        Parity::Even => Winding::Anticlockwise,
        Parity::None | Parity::Either => return None,
    };

    // NOTE: With three neighbours, the focus stands in for the implicit hydrogen or lone pair in the last slot
    let mut carriers = [focus; 4];
    let mut hydrogen = None;
    let mut count = 0;
    for neighbour in molecule.connected_atoms(focus) {
        if count == carriers.len() {
            return None;
        }
        if molecule.atom(neighbour).is_some_and(|atom| atom.is_hydrogen()) {
            if hydrogen.is_some() {
                return None;
            }
            hydrogen = Some(count);
        }
        carriers[count] = neighbour;
        count += 1;
    }
    if count < 3 || (count == 3 && hydrogen.is_some()) {
        return None;
    }

    // Parities assume the hydrogen points away from the viewer, so a hydrogen in the first or third slot flips the
    // winding
    let winding = if matches!(hydrogen, Some(0 | 2)) {
        winding.invert()
    } else {
        winding
    };
    Some(TetrahedralStereo {
        focus,
        carriers,
        winding,
    })
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use molgraph::{AtomIndex, Winding};
    use once_cell::sync::Lazy;
    use periodic::AtomicDatabase;

    use crate::{config::ReaderConfig, reader::MolfileReader};

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);

    // (R)-bromochlorofluoromethane, with the hydrogen drawn explicitly
    const BROMOCHLOROFLUOROMETHANE: &str = indoc! {"
        CHBrClF
          test    0101000000

          5  4  0  0  0  0  0  0  0  0999 V2000
            0.0000    0.0000    0.0000 C   0  0  1  0  0  0  0  0  0  0  0  0
            0.0000    1.0000    0.0000 Br  0  0  0  0  0  0  0  0  0  0  0  0
            0.8660   -0.5000    0.0000 Cl  0  0  0  0  0  0  0  0  0  0  0  0
           -0.8660   -0.5000    0.0000 F   0  0  0  0  0  0  0  0  0  0  0  0
            0.0000    0.0000    1.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
          1  2  1  0
          1  3  1  0
          1  4  1  0
          1  5  1  0
        M  END
    "};

    fn read(text: &str, config: ReaderConfig) -> molgraph::Molecule {
        MolfileReader::new(&*DB, config).read_str(text).unwrap().unwrap().molecule
    }

    #[test]
    fn four_neighbours() {
        let molecule = read(BROMOCHLOROFLUOROMETHANE, ReaderConfig::default());
        let [centre] = molecule.stereo_elements() else {
            panic!("expected exactly one stereocentre");
        };
        assert_eq!(centre.focus, AtomIndex::new(0));
        assert_eq!(centre.carriers, [1, 2, 3, 4].map(AtomIndex::new));
        assert_eq!(centre.winding, Winding::Clockwise);

        let even = BROMOCHLOROFLUOROMETHANE.replace("C   0  0  1", "C   0  0  2");
        let molecule = read(&even, ReaderConfig::default());
        assert_eq!(molecule.stereo_elements()[0].winding, Winding::Anticlockwise);
    }

    #[test]
    fn hydrogen_position_flips_winding() {
        // Bond the hydrogen first, so it lands in the first carrier slot
        let text = BROMOCHLOROFLUOROMETHANE
            .replace("  1  2  1  0\n", "  1  5  1  0\n")
            .replace("  1  5  1  0\nM  END", "  1  2  1  0\nM  END");
        let molecule = read(&text, ReaderConfig::default());
        let centre = molecule.stereo_elements()[0];
        assert_eq!(centre.carriers, [4, 2, 3, 1].map(AtomIndex::new));
        assert_eq!(centre.winding, Winding::Anticlockwise);
    }

    #[test]
    fn implicit_hydrogen_fills_the_last_slot() {
        let text = BROMOCHLOROFLUOROMETHANE
            .replace("  5  4  0", "  4  3  0")
            .replace("    0.0000    0.0000    1.0000 H   0  0  0  0  0  0  0  0  0  0  0  0\n", "")
            .replace("  1  5  1  0\n", "");
        let molecule = read(&text, ReaderConfig::default());
        let centre = molecule.stereo_elements()[0];
        assert_eq!(centre.carriers, [1, 2, 3, 0].map(AtomIndex::new));
        assert_eq!(centre.winding, Winding::Clockwise);
    }

    #[test]
    fn skipped_centres() {
        // Parity 3 leaves the configuration unspecified
        let either = BROMOCHLOROFLUOROMETHANE.replace("C   0  0  1", "C   0  0  3");
        assert!(read(&either, ReaderConfig::default()).stereo_elements().is_empty());

        // Three neighbours, one of them hydrogen
        let crowded = BROMOCHLOROFLUOROMETHANE.replace("  1  4  1  0\n", "  2  4  1  0\n");
        assert!(read(&crowded, ReaderConfig::default()).stereo_elements().is_empty());

        // Stereo perception can be turned off
        let config = ReaderConfig::default().with_add_stereo_elements(false);
        assert!(read(BROMOCHLOROFLUOROMETHANE, config).stereo_elements().is_empty());

        // Query bonds disable it too
        let query = BROMOCHLOROFLUOROMETHANE.replace("  1  4  1  0\n", "  1  4  8  0\n");
        assert!(read(&query, ReaderConfig::default()).stereo_elements().is_empty());
    }
}
