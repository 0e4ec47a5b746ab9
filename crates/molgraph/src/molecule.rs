// Standard Library Imports
use std::collections::BTreeMap;

// External Crate Imports
use serde::Serialize;

// Local Crate Imports
use crate::{
    Atom, AtomIndex, Bond, BondIndex, GraphError, Result, Sgroup, TetrahedralStereo,
};

// Public API ==========================================================================================================

#[derive(Clone, PartialEq, Debug, Default, Serialize)]
pub struct Molecule {
    pub title: Option<String>,
    pub program: Option<String>,
    pub remark: Option<String>,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    // NOTE: One entry per unpaired electron, so a triplet carbene appears twice
    single_electrons: Vec<AtomIndex>,
    stereo: Vec<TetrahedralStereo>,
    sgroups: Vec<Sgroup>,
    properties: BTreeMap<String, String>,
}

impl Molecule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_atom(&mut self, atom: Atom) -> AtomIndex {
        self.atoms.push(atom);
        AtomIndex::new(self.atoms.len() - 1)
    }

    pub fn add_bond(&mut self, bond: Bond) -> Result<BondIndex> {
        self.check_atom(bond.begin)?;
        self.check_atom(bond.end)?;
        if bond.begin == bond.end {
            return Err(GraphError::SelfBond(bond.begin));
        }

        self.bonds.push(bond);
        Ok(BondIndex::new(self.bonds.len() - 1))
    }

    /// Swaps the atom at `index` for `atom`, leaving every bond, electron and stereo element that references it
    /// untouched. Returns the atom that was replaced.
    pub fn replace_atom(&mut self, index: AtomIndex, atom: Atom) -> Result<Atom> {
        let slot = self.atom_mut(index)?;
        Ok(std::mem::replace(slot, atom))
    }

    #[must_use]
    pub fn atom(&self, index: AtomIndex) -> Option<&Atom> {
        self.atoms.get(index.get())
    }

    pub fn atom_mut(&mut self, index: AtomIndex) -> Result<&mut Atom> {
        let count = self.atoms.len();
        self.atoms
            .get_mut(index.get())
            .ok_or_else(|| GraphError::missing_atom(index, count))
    }

    #[must_use]
    pub fn bond(&self, index: BondIndex) -> Option<&Bond> {
        self.bonds.get(index.get())
    }

    pub fn bond_mut(&mut self, index: BondIndex) -> Result<&mut Bond> {
        let count = self.bonds.len();
        self.bonds
            .get_mut(index.get())
            .ok_or_else(|| GraphError::missing_bond(index, count))
    }

    pub fn atoms(&self) -> impl Iterator<Item = (AtomIndex, &Atom)> {
        self.atoms
            .iter()
            .enumerate()
            .map(|(i, atom)| (AtomIndex::new(i), atom))
    }

    pub fn bonds(&self) -> impl Iterator<Item = (BondIndex, &Bond)> {
        self.bonds
            .iter()
            .enumerate()
            .map(|(i, bond)| (BondIndex::new(i), bond))
    }

    #[must_use]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[must_use]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Neighbours of `atom`, in the order their bonds were added
    pub fn connected_atoms(&self, atom: AtomIndex) -> impl Iterator<Item = AtomIndex> + '_ {
        self.bonds.iter().filter_map(move |bond| bond.partner(atom))
    }

    pub fn connected_bonds(&self, atom: AtomIndex) -> impl Iterator<Item = (BondIndex, &Bond)> {
        self.bonds().filter(move |(_, bond)| bond.contains(atom))
    }

    #[must_use]
    pub fn connected_single_electron_count(&self, atom: AtomIndex) -> usize {
        self.single_electrons.iter().filter(|&&a| a == atom).count()
    }

    pub fn add_single_electron(&mut self, atom: AtomIndex) -> Result<()> {
        self.check_atom(atom)?;
        self.single_electrons.push(atom);
        Ok(())
    }

    /// Whether any bond is a query bond, making this molecule a substructure query rather than a concrete structure
    #[must_use]
    pub fn is_query(&self) -> bool {
        self.bonds.iter().any(|bond| bond.kind.is_query())
    }

    pub fn add_stereo_element(&mut self, element: TetrahedralStereo) {
        self.stereo.push(element);
    }

    #[must_use]
    pub fn stereo_elements(&self) -> &[TetrahedralStereo] {
        &self.stereo
    }

    pub fn add_sgroups(&mut self, sgroups: impl IntoIterator<Item = Sgroup>) {
        self.sgroups.extend(sgroups);
    }

    #[must_use]
    pub fn sgroups(&self) -> &[Sgroup] {
        &self.sgroups
    }

    /// Sets a record-level property, replacing and returning any earlier value stored under `key`
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.properties.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// A Hill-ordered formula that counts implicit hydrogens and lists pseudo-atoms by their labels
    #[must_use]
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.symbol()).or_default() += 1;
            if let Some(hydrogens) = atom.implicit_hydrogens.filter(|&h| h > 0) {
                *counts.entry("H").or_default() += hydrogens;
            }
        }

        let carbon = counts.remove("C");
        let hydrogen = if carbon.is_some() { counts.remove("H") } else { None };
        [("C", carbon), ("H", hydrogen)]
            .into_iter()
            .filter_map(|(symbol, count)| Some((symbol, count?)))
            .chain(counts)
            .map(|(symbol, count)| {
                if count == 1 {
                    symbol.to_owned()
                } else {
                    format!("{symbol}{count}")
                }
            })
            .collect()
    }
}

// Private Helper Methods ==============================================================================================

impl Molecule {
    fn check_atom(&self, index: AtomIndex) -> Result<()> {
        if index.get() < self.atoms.len() {
            Ok(())
        } else {
            Err(GraphError::missing_atom(index, self.atoms.len()))
        }
    }
}

// Module Tests ========================================================================================================
