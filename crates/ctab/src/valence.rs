//! The MDL valence model, which fills in the implicit hydrogens that V2000 files leave unwritten

// External Crate Imports
use molgraph::{AtomIndex, Molecule};

// Public API ==========================================================================================================

/// The valence an atom is assumed to have, given its element, its formal charge and the valence already accounted
/// for by its bonds. Atoms outside the model, or already above every valence it allows, keep `explicit`.
#[must_use]
pub fn implicit_valence(atomic_number: u8, charge: i32, explicit: u32) -> u32 {
    allowed_valences(atomic_number, charge)
        .iter()
        .copied()
        .find(|&valence| valence >= explicit)
        .unwrap_or(explicit)
}

/// Assigns a valency and implicit hydrogen count to every atom whose explicit valence is known. `explicit_valence`
/// holds the bond order sums of consecutive atoms, starting at `offset`.
pub fn apply_valence_model(molecule: &mut Molecule, offset: usize, explicit_valence: &[Option<u32>]) {
    for (i, bond_orders) in explicit_valence.iter().enumerate() {
        let Some(bond_orders) = *bond_orders else {
            continue;
        };
        let index = AtomIndex::new(offset + i);
        let unpaired = u32::try_from(molecule.connected_single_electron_count(index)).unwrap_or(u32::MAX);
        let Ok(atom) = molecule.atom_mut(index) else {
            continue;
        };

        let explicit = bond_orders.saturating_add(unpaired);
        if let Some(valency) = atom.valency {
            atom.implicit_hydrogens = Some(if valency >= explicit { valency - bond_orders } else { 0 });
        } else {
            let implicit = implicit_valence(atom.atomic_number(), atom.formal_charge, explicit);
            atom.valency = Some(implicit);
            atom.implicit_hydrogens = Some(implicit - explicit);
        }
    }
}

// Private Helper Methods ==============================================================================================

// NOTE: Main-group elements are looked up by their "effective group": the group number minus the formal charge, so
// that isoelectronic ions share valences (N+ behaves like C, O- like F)
fn allowed_valences(atomic_number: u8, charge: i32) -> &'static [u32] {
    match atomic_number {
        // Group 1
        1 | 3 | 11 | 19 | 37 | 55 | 87 => {
            if charge == 0 {
                &[1]
            } else {
                &[]
            }
        }
        // Group 2
        4 | 12 | 20 | 38 | 56 | 88 => match charge {
            0 => &[2],
            1 => &[1],
            _ => &[],
        },
        5..=9 => second_row_valences(i32::from(atomic_number) + 8 - charge),
        13..=17 => heavy_valences(i32::from(atomic_number) - charge),
        31..=35 => heavy_valences(i32::from(atomic_number) - 18 - charge),
        49..=53 => heavy_valences(i32::from(atomic_number) - 36 - charge),
        81..=85 => heavy_valences(i32::from(atomic_number) - 68 - charge),
        _ => &[],
    }
}

const fn second_row_valences(group: i32) -> &'static [u32] {
    match group {
        11 => &[1],
        12 => &[2],
        13 => &[3],
        14 => &[4],
        15 => &[3, 5],
        16 => &[2],
        17 => &[1],
        _ => &[],
    }
}

// Below the second row, d-orbitals allow expanded octets
const fn heavy_valences(group: i32) -> &'static [u32] {
    match group {
        11 => &[1],
        12 => &[2],
        13 => &[3],
        14 => &[4],
        15 => &[3, 5],
        16 => &[2, 4, 6],
        17 => &[1, 3, 5, 7],
        _ => &[],
    }
}

// Module Tests ========================================================================================================
