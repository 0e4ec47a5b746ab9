//! The property lines between the bond block and `M  END`: charges, isotopes, radicals, labels, and the directives
//! that build up Sgroups

// Standard Library Imports
use std::{collections::BTreeSet, io, mem};

// External Crate Imports
use molgraph::{
    AtomIndex, Mass,
    sgroup::{Bracket, Connectivity, PolymerSubtype, SgroupAttribute, SgroupType},
};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take},
    combinator::{map, value},
    sequence::preceded,
};
use periodic::{IsotopeTable, MassNumber};

// Local Crate Imports
use crate::{
    decoder::RecordDecoder,
    errors::{CtabError, CtabErrorKind, Result},
    fields::{columns, read_int3, read_uint, trimmed_len},
    sgroups::SgroupDraft,
};

/// The kinds of line that can appear in a properties block
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum PropertyKey {
    AtomAlias,
    AtomValue,
    GroupAbbreviation,
    Skip,
    Charge,
    Radical,
    Isotope,
    RGroupLabel,
    VendorLabel,
    SgroupType,
    SgroupSubtype,
    SgroupAtoms,
    SgroupBonds,
    SgroupParentAtoms,
    SgroupBracket,
    SgroupSubscript,
    SgroupConnectivity,
    SgroupBracketStyle,
    SgroupComponentOrder,
    SgroupParent,
    SgroupExpansion,
    End,
    /// Recognised, but carrying nothing this reader keeps
    Ignored,
    Unknown,
}

/// Where the entries of a repeated list sit on a line: `width` columns every `stride` columns, starting at `first`
#[derive(Copy, Clone, Debug)]
struct ListLayout {
    first: usize,
    stride: usize,
    width: usize,
}

// `M  CHG  2   3  -1   5   1`
const PAIRS: ListLayout = ListLayout {
    first: 10,
    stride: 8,
    width: 7,
};
// NOTE: `M  SPL` and `M  SCN` entries are allowed to end one column early
const SHORT_PAIRS: ListLayout = ListLayout { width: 6, ..PAIRS };
// `M  SAL   1  3   1   2   3`
const INDICES: ListLayout = ListLayout {
    first: 14,
    stride: 4,
    width: 3,
};

impl<I, T> RecordDecoder<'_, I, T>
where
    I: Iterator<Item = io::Result<String>>,
    T: IsotopeTable,
{
    /// Reads property lines until `M  END` or the end of the input, then settles any unresolved masses and adds the
    /// finished Sgroups to the molecule
    pub(crate) fn read_properties_block(&mut self) -> Result<()> {
        while let Some(line) = self.lines.next_line()? {
            let key = classify(&line);
            match key {
                PropertyKey::End => break,
                PropertyKey::AtomAlias => {
                    let Some(alias) = self.lines.next_line()? else {
                        break;
                    };
                    self.read_alias(&line, alias)?;
                }
                PropertyKey::GroupAbbreviation => {
                    if self.lines.next_line()?.is_none() {
                        break;
                    }
                }
                PropertyKey::AtomValue => self.read_atom_value(&line)?,
                PropertyKey::Charge => self.read_charges(&line)?,
                PropertyKey::Radical => self.read_radicals(&line)?,
                PropertyKey::Isotope => self.read_isotopes(&line)?,
                PropertyKey::RGroupLabel => self.read_rgroup_labels(&line)?,
                PropertyKey::VendorLabel => self.read_vendor_label(&line)?,
                PropertyKey::SgroupType => self.read_sgroup_types(&line)?,
                PropertyKey::SgroupSubtype => self.read_sgroup_subtypes(&line)?,
                PropertyKey::SgroupAtoms | PropertyKey::SgroupParentAtoms => self.read_sgroup_atoms(&line, key)?,
                PropertyKey::SgroupBonds => self.read_sgroup_bonds(&line)?,
                PropertyKey::SgroupBracket => self.read_sgroup_bracket(&line)?,
                PropertyKey::SgroupSubscript => self.read_sgroup_subscript(&line)?,
                PropertyKey::SgroupConnectivity => self.read_sgroup_connectivity(&line)?,
                PropertyKey::SgroupBracketStyle | PropertyKey::SgroupComponentOrder => {
                    self.read_sgroup_codes(&line, key)?;
                }
                PropertyKey::SgroupParent => self.read_sgroup_parents(&line)?,
                PropertyKey::SgroupExpansion => self.read_sgroup_expansion(&line)?,
                PropertyKey::Skip | PropertyKey::Ignored | PropertyKey::Unknown => (),
            }
        }

        self.settle_mass_deltas();
        let sgroups = mem::take(&mut self.sgroups).finish(self.molecule.sgroups().len());
        self.molecule.add_sgroups(sgroups);
        Ok(())
    }

    // Atom Properties =================================================================================================

    fn read_charges(&mut self, line: &str) -> Result<()> {
        for (column, number, charge) in self.pairs(line, PropertyKey::Charge, PAIRS)? {
            if let Some(atom) = self.atom_reference(line, column, number)? {
                self.atom_mut(line, atom)?.formal_charge = charge;
            }
        }
        Ok(())
    }

    fn read_radicals(&mut self, line: &str) -> Result<()> {
        for (column, number, radical) in self.pairs(line, PropertyKey::Radical, PAIRS)? {
            let Some(atom) = self.atom_reference(line, column, number)? else {
                continue;
            };
            // Singlets and triplets both have two unpaired electrons; a doublet has one
            let electrons = match radical {
                0 => 0,
                1 | 3 => 2,
                2 => 1,
                value => {
                    self.tolerate(line, column + 4..column + 7, CtabErrorKind::InvalidRadical { value })?;
                    continue;
                }
            };
            for _ in 0..electrons {
                self.molecule
                    .add_single_electron(atom)
                    .map_err(|e| Box::new(self.lines.error(line, e.into())))?;
            }
        }
        Ok(())
    }

    fn read_isotopes(&mut self, line: &str) -> Result<()> {
        for (column, number, mass_number) in self.pairs(line, PropertyKey::Isotope, PAIRS)? {
            let Some(atom) = self.atom_reference(line, column, number)? else {
                continue;
            };
            let mass = match u32::try_from(mass_number) {
                Ok(0) => Mass::Natural,
                Ok(mass_number) => Mass::Isotope(MassNumber::from(mass_number)),
                Err(_) => {
                    let kind = CtabErrorKind::NegativeMassNumber { mass_number };
                    self.tolerate(line, column + 4..column + 7, kind)?;
                    continue;
                }
            };
            self.atom_mut(line, atom)?.mass = mass;
        }
        Ok(())
    }

    fn read_rgroup_labels(&mut self, line: &str) -> Result<()> {
        for (column, number, rgroup) in self.pairs(line, PropertyKey::RGroupLabel, PAIRS)? {
            if let Some(atom) = self.atom_reference(line, column, number)? {
                self.relabel(line, atom, format!("R{rgroup}"))?;
            }
        }
        Ok(())
    }

    fn read_alias(&mut self, line: &str, alias: String) -> Result<()> {
        let number = read_int3(line, 3);
        if let Some(atom) = self.atom_reference(line, 3, number)? {
            self.relabel(line, atom, alias)?;
        }
        Ok(())
    }

    fn read_atom_value(&mut self, line: &str) -> Result<()> {
        let number = read_int3(line, 3);
        if let Some(atom) = self.atom_reference(line, 3, number)? {
            let comment = columns(line, 7, line.len()).to_owned();
            self.atom_mut(line, atom)?.comment = Some(comment);
        }
        Ok(())
    }

    fn read_vendor_label(&mut self, line: &str) -> Result<()> {
        if self.diagnostics.is_strict() {
            return Err(self.fail(line, 0..6, CtabErrorKind::VendorLabel));
        }
        let number = read_int3(line, 7);
        if let Some(atom) = self.atom_reference(line, 7, number)? {
            // NOTE: Vendor labels keep their surrounding whitespace
            let label = columns(line, 11, line.len()).to_owned();
            self.atom_mut(line, atom)?.vendor_label = Some(label);
        }
        Ok(())
    }

    // Sgroup Directives ===============================================================================================

    fn read_sgroup_types(&mut self, line: &str) -> Result<()> {
        let declared = read_count(line, 6);
        for column in self.entries(line, PropertyKey::SgroupType, declared, PAIRS)? {
            let Some(id) = self.sgroup_id(line, column)? else {
                continue;
            };
            let kind = SgroupType::from_ctab_key(columns(line, column + 4, column + 7));
            if self.sgroups.contains(id) {
                self.tolerate(line, column..column + 3, CtabErrorKind::RedeclaredSgroup { id })?;
            }
            self.sgroups.declare(id, kind);
        }
        Ok(())
    }

    fn read_sgroup_subtypes(&mut self, line: &str) -> Result<()> {
        let declared = read_count(line, 6);
        for column in self.entries(line, PropertyKey::SgroupSubtype, declared, PAIRS)? {
            let Some(id) = self.sgroup_id(line, column)? else {
                continue;
            };
            let subtype = columns(line, column + 4, column + 7).trim();
            if self.sgroup(line, column, id)?.kind() != Some(SgroupType::Copolymer) {
                self.tolerate(line, column..column + 3, CtabErrorKind::SubtypeOnNonCopolymer { id })?;
            }
            if PolymerSubtype::from_ctab_key(subtype).is_none() {
                let kind = CtabErrorKind::InvalidSgroupSubtype {
                    subtype: subtype.to_owned(),
                };
                self.tolerate(line, column + 4..column + 7, kind)?;
            }
            let attribute = SgroupAttribute::Subtype(subtype.to_owned());
            self.sgroup(line, column, id)?.attributes.push(attribute);
        }
        Ok(())
    }

    /// `M  SAL` and `M  SPA` lines, which list the atoms in a group, or the atoms making up one repeat of a multiple
    /// group
    fn read_sgroup_atoms(&mut self, line: &str, key: PropertyKey) -> Result<()> {
        let Some(id) = self.sgroup_id(line, 7)? else {
            return Ok(());
        };
        self.sgroup(line, 7, id)?;

        let mut atoms = BTreeSet::new();
        for column in self.entries(line, key, read_count(line, 10), INDICES)? {
            let number = read_int3(line, column);
            atoms.extend(self.atom_reference(line, column, number)?);
        }

        let sgroup = self.sgroups.get_or_insert(id);
        if key == PropertyKey::SgroupParentAtoms {
            sgroup.attributes.push(SgroupAttribute::ParentAtoms(atoms));
        } else {
            sgroup.atoms.extend(atoms);
        }
        Ok(())
    }

    fn read_sgroup_bonds(&mut self, line: &str) -> Result<()> {
        let Some(id) = self.sgroup_id(line, 7)? else {
            return Ok(());
        };
        self.sgroup(line, 7, id)?;

        let mut bonds = BTreeSet::new();
        for column in self.entries(line, PropertyKey::SgroupBonds, read_count(line, 10), INDICES)? {
            let number = read_int3(line, column);
            bonds.extend(self.bond_reference(line, column, number)?);
        }
        self.sgroups.get_or_insert(id).bonds.extend(bonds);
        Ok(())
    }

    fn read_sgroup_bracket(&mut self, line: &str) -> Result<()> {
        let Some(id) = self.sgroup_id(line, 7)? else {
            return Ok(());
        };
        self.sgroup(line, 7, id)?;

        let [x1, y1, x2, y2] = [13, 23, 33, 43];
        let bracket = Bracket {
            start: (self.coordinate(line, x1)?, self.coordinate(line, y1)?),
            end: (self.coordinate(line, x2)?, self.coordinate(line, y2)?),
        };
        self.sgroups.get_or_insert(id).brackets.push(bracket);
        Ok(())
    }

    fn read_sgroup_subscript(&mut self, line: &str) -> Result<()> {
        let Some(id) = self.sgroup_id(line, 7)? else {
            return Ok(());
        };
        let subscript = columns(line, 11, line.len()).trim().to_owned();
        self.sgroup(line, 7, id)?
            .attributes
            .push(SgroupAttribute::Subscript(subscript));
        Ok(())
    }

    fn read_sgroup_connectivity(&mut self, line: &str) -> Result<()> {
        let declared = read_count(line, 6);
        for column in self.entries(line, PropertyKey::SgroupConnectivity, declared, SHORT_PAIRS)? {
            let Some(id) = self.sgroup_id(line, column)? else {
                continue;
            };
            let connectivity = columns(line, column + 4, column + 7).trim();
            self.sgroup(line, column, id)?;
            if Connectivity::from_ctab_key(connectivity).is_none() {
                let kind = CtabErrorKind::InvalidConnectivity {
                    connectivity: connectivity.to_owned(),
                };
                self.tolerate(line, column + 4..column + 7, kind)?;
            }
            let attribute = SgroupAttribute::Connectivity(connectivity.to_owned());
            self.sgroups.get_or_insert(id).attributes.push(attribute);
        }
        Ok(())
    }

    /// `M  SBT` and `M  SNC` lines, which pair groups with a numeric code
    fn read_sgroup_codes(&mut self, line: &str, key: PropertyKey) -> Result<()> {
        for (column, id, code) in self.pairs(line, key, PAIRS)? {
            let Some(id) = self.checked_sgroup_id(line, column, id)? else {
                continue;
            };
            let attribute = if key == PropertyKey::SgroupBracketStyle {
                SgroupAttribute::BracketStyle(code)
            } else {
                SgroupAttribute::ComponentOrder(code)
            };
            self.sgroup(line, column, id)?.attributes.push(attribute);
        }
        Ok(())
    }

    fn read_sgroup_parents(&mut self, line: &str) -> Result<()> {
        let declared = read_count(line, 6);
        for column in self.entries(line, PropertyKey::SgroupParent, declared, SHORT_PAIRS)? {
            let (Some(child), Some(parent)) = (self.sgroup_id(line, column)?, self.sgroup_id(line, column + 4)?) else {
                continue;
            };
            self.sgroup(line, column, child)?;
            self.sgroup(line, column + 4, parent)?;
            if self.sgroups.creates_cycle(child, parent) {
                self.tolerate(line, column..column + 7, CtabErrorKind::SgroupCycle { child, parent })?;
                continue;
            }
            self.sgroups.get_or_insert(child).parents.insert(parent);
        }
        Ok(())
    }

    fn read_sgroup_expansion(&mut self, line: &str) -> Result<()> {
        if columns(line, 7, 10) != "EXP" {
            return self.tolerate(line, 7..10, CtabErrorKind::MissingExpansionTag);
        }
        let declared = read_count(line, 10);
        for column in self.entries(line, PropertyKey::SgroupExpansion, declared, INDICES)? {
            let Some(id) = self.sgroup_id(line, column)? else {
                continue;
            };
            self.sgroup(line, column, id)?
                .attributes
                .push(SgroupAttribute::Expanded);
        }
        Ok(())
    }

    // Private Helper Methods ==========================================================================================

    fn sgroup_id(&mut self, line: &str, column: usize) -> Result<Option<u32>> {
        let number = read_int3(line, column);
        self.checked_sgroup_id(line, column, number)
    }

    /// Sgroup numbers can't be negative, so entries with one are reported and then dropped
    fn checked_sgroup_id(&mut self, line: &str, column: usize, number: i32) -> Result<Option<u32>> {
        let Ok(id) = u32::try_from(number) else {
            self.tolerate(line, column..column + 3, CtabErrorKind::InvalidSgroupId { id: number })?;
            return Ok(None);
        };
        Ok(Some(id))
    }

    /// The group declared under `id`, reporting (and then creating) groups that were never declared
    fn sgroup(&mut self, line: &str, column: usize, id: u32) -> Result<&mut SgroupDraft> {
        if !self.sgroups.contains(id) {
            self.tolerate(line, column..column + 3, CtabErrorKind::UndeclaredSgroup { id })?;
        }
        Ok(self.sgroups.get_or_insert(id))
    }

    fn relabel(&mut self, line: &str, index: AtomIndex, label: String) -> Result<()> {
        let relabeled = self.atom_mut(line, index)?.relabeled(label);
        self.molecule
            .replace_atom(index, relabeled)
            .map_err(|e| Box::new(self.lines.error(line, e.into())))?;
        Ok(())
    }

    /// The starting column of every entry of a list that fits on the line. Lists cut short by the end of the line are
    /// reported, but the entries that survive are still read.
    fn entries(&mut self, line: &str, key: PropertyKey, declared: u32, layout: ListLayout) -> Result<Vec<usize>> {
        let starts: Vec<_> = (0..declared as usize)
            .map(|i| layout.first + i * layout.stride)
            .take_while(|&start| start + layout.width <= line.len())
            .collect();

        let found = u32::try_from(starts.len()).unwrap_or(u32::MAX);
        if found < declared {
            let kind = CtabErrorKind::TruncatedList {
                tag: key.tag(),
                declared,
                found,
            };
            self.tolerate(line, trimmed_len(line)..line.len(), kind)?;
        }
        Ok(starts)
    }

    /// The `(column, index, value)` triples of a pair list, whose length is given in columns 7 to 9
    fn pairs(&mut self, line: &str, key: PropertyKey, layout: ListLayout) -> Result<Vec<(usize, i32, i32)>> {
        let declared = if matches!(key, PropertyKey::SgroupBracketStyle | PropertyKey::SgroupComponentOrder) {
            read_count(line, 6)
        } else {
            read_uint(line, 6, 3)
        };
        let entries = self.entries(line, key, declared, layout)?;
        Ok(entries
            .into_iter()
            .map(|column| (column, read_int3(line, column), read_int3(line, column + 4)))
            .collect())
    }

    // NOTE: Atoms given a mass difference relative to an element with no natural isotopes, and never given an
    // absolute mass by `M  ISO`, fall back to the natural distribution
    fn settle_mass_deltas(&mut self) {
        for i in self.atom_offset..self.atom_offset + self.atom_count {
            let Ok(atom) = self.molecule.atom_mut(AtomIndex::new(i)) else {
                continue;
            };
            if atom.mass == Mass::Unresolved {
                atom.mass = Mass::Natural;
                let kind = CtabErrorKind::UnstableMassDelta {
                    symbol: atom.symbol().to_owned(),
                };
                self.diagnostics.warn(CtabError::new(self.lines.line_number(), "", kind));
            }
        }
    }
}

impl PropertyKey {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "END" => Self::End,
            "CHG" => Self::Charge,
            "RAD" => Self::Radical,
            "ISO" => Self::Isotope,
            "RGP" => Self::RGroupLabel,
            "ZZC" => Self::VendorLabel,
            "STY" => Self::SgroupType,
            "SST" => Self::SgroupSubtype,
            "SAL" => Self::SgroupAtoms,
            "SBL" => Self::SgroupBonds,
            "SPA" => Self::SgroupParentAtoms,
            "SDI" => Self::SgroupBracket,
            "SMT" => Self::SgroupSubscript,
            "SCN" => Self::SgroupConnectivity,
            "SBT" => Self::SgroupBracketStyle,
            "SNC" => Self::SgroupComponentOrder,
            "SPL" => Self::SgroupParent,
            "SDS" => Self::SgroupExpansion,
            "RBC" | "SUB" | "UNS" | "LIN" | "ALS" | "APO" | "AAL" | "LOG" | "SLB" | "CRS" | "SBV" | "SDT" | "SDD"
            | "SCD" | "SED" | "$3D" => Self::Ignored,
            _ => Self::Unknown,
        }
    }

    /// The tag that starts lines of this kind
    pub(crate) const fn tag(self) -> &'static str {
        match self {
            Self::AtomAlias => "A",
            Self::AtomValue => "V",
            Self::GroupAbbreviation => "G",
            Self::Skip => "S  SKP",
            Self::Charge => "M  CHG",
            Self::Radical => "M  RAD",
            Self::Isotope => "M  ISO",
            Self::RGroupLabel => "M  RGP",
            Self::VendorLabel => "M  ZZC",
            Self::SgroupType => "M  STY",
            Self::SgroupSubtype => "M  SST",
            Self::SgroupAtoms => "M  SAL",
            Self::SgroupBonds => "M  SBL",
            Self::SgroupParentAtoms => "M  SPA",
            Self::SgroupBracket => "M  SDI",
            Self::SgroupSubscript => "M  SMT",
            Self::SgroupConnectivity => "M  SCN",
            Self::SgroupBracketStyle => "M  SBT",
            Self::SgroupComponentOrder => "M  SNC",
            Self::SgroupParent => "M  SPL",
            Self::SgroupExpansion => "M  SDS",
            Self::End => "M  END",
            Self::Ignored | Self::Unknown => "",
        }
    }
}

/// Property Key = "A  " | "V  " | "G  " | "S  SKP" | "M  " , tag ;
fn property_key(i: &str) -> IResult<&str, PropertyKey> {
    alt((
        value(PropertyKey::AtomAlias, tag("A  ")),
        value(PropertyKey::AtomValue, tag("V  ")),
        value(PropertyKey::GroupAbbreviation, tag("G  ")),
        value(PropertyKey::Skip, tag("S  SKP")),
        preceded(tag("M  "), map(take(3_usize), PropertyKey::from_tag)),
    ))(i)
}

pub(crate) fn classify(line: &str) -> PropertyKey {
    property_key(line).map_or(PropertyKey::Unknown, |(_, key)| key)
}

fn read_count(line: &str, column: usize) -> u32 {
    u32::try_from(read_int3(line, column)).unwrap_or_default()
}

// Module Tests ========================================================================================================
