//! Substructure groups (Sgroups): named subsets of atoms and bonds with display and polymer semantics

// Standard Library Imports
use std::collections::BTreeSet;

// External Crate Imports
use derive_more::Display;
use serde::Serialize;

// Local Crate Imports
use crate::{AtomIndex, BondIndex, SgroupIndex};

// Public API ==========================================================================================================

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Sgroup {
    /// The record-local number this group was declared with
    pub id: u32,
    /// `None` for groups that were referenced without ever being declared
    pub kind: Option<SgroupType>,
    pub atoms: BTreeSet<AtomIndex>,
    pub bonds: BTreeSet<BondIndex>,
    pub parents: BTreeSet<SgroupIndex>,
    pub brackets: Vec<Bracket>,
    pub attributes: SgroupAttributes,
    /// Attributes that were supplied but have no meaning for this kind of group
    pub other: Vec<SgroupAttribute>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Serialize)]
pub enum SgroupType {
    #[display("SUP")]
    Superatom,
    #[display("MUL")]
    Multiple,
    #[display("SRU")]
    RepeatUnit,
    #[display("MON")]
    Monomer,
    #[display("MER")]
    Mer,
    #[display("COP")]
    Copolymer,
    #[display("CRO")]
    Crosslink,
    #[display("MOD")]
    Modification,
    #[display("GRA")]
    Graft,
    #[display("COM")]
    Component,
    #[display("MIX")]
    Mixture,
    #[display("FOR")]
    Formulation,
    #[display("DAT")]
    Data,
    #[display("ANY")]
    AnyPolymer,
    #[display("GEN")]
    Generic,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Serialize)]
pub enum PolymerSubtype {
    #[display("ALT")]
    Alternating,
    #[display("RAN")]
    Random,
    #[display("BLO")]
    Block,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Serialize)]
pub enum Connectivity {
    #[display("HH")]
    HeadToHead,
    #[display("HT")]
    HeadToTail,
    #[display("EU")]
    Unknown,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum BracketStyle {
    Square,
    Round,
}

#[derive(Copy, Clone, PartialEq, Debug, Serialize)]
pub struct Bracket {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

/// A single attribute in the generic key/value form groups are built up from
#[derive(Clone, PartialEq, Debug, Serialize)]
pub enum SgroupAttribute {
    Subscript(String),
    /// Raw connectivity text; only `HH`, `HT` and `EU` are meaningful
    Connectivity(String),
    /// Raw subtype text; only `ALT`, `RAN` and `BLO` are meaningful
    Subtype(String),
    BracketStyle(i32),
    ComponentOrder(i32),
    Expanded,
    ParentAtoms(BTreeSet<AtomIndex>),
}

/// The attributes that mean something for each kind of group
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
pub enum SgroupAttributes {
    Superatom {
        label: Option<String>,
        expanded: bool,
    },
    Multiple {
        multiplier: Option<String>,
        parent_atoms: BTreeSet<AtomIndex>,
    },
    Polymer {
        subscript: Option<String>,
        connectivity: Option<Connectivity>,
        subtype: Option<PolymerSubtype>,
        bracket_style: Option<BracketStyle>,
    },
    Component {
        order: Option<i32>,
        bracket_style: Option<BracketStyle>,
    },
    #[default]
    Generic,
}

impl SgroupType {
    /// Parses the three-letter type code used by connection tables
    #[must_use]
    pub fn from_ctab_key(key: &str) -> Option<Self> {
        let kind = match key {
            "SUP" => Self::Superatom,
            "MUL" => Self::Multiple,
            "SRU" => Self::RepeatUnit,
            "MON" => Self::Monomer,
            "MER" => Self::Mer,
            "COP" => Self::Copolymer,
            "CRO" => Self::Crosslink,
            "MOD" => Self::Modification,
            "GRA" => Self::Graft,
            "COM" => Self::Component,
            "MIX" => Self::Mixture,
            "FOR" => Self::Formulation,
            "DAT" => Self::Data,
            "ANY" => Self::AnyPolymer,
            "GEN" => Self::Generic,
            _ => return None,
        };
        Some(kind)
    }

    #[must_use]
    pub const fn is_polymer(self) -> bool {
        matches!(
            self,
            Self::RepeatUnit
                | Self::Monomer
                | Self::Mer
                | Self::Copolymer
                | Self::Crosslink
                | Self::Modification
                | Self::Graft
                | Self::AnyPolymer
        )
    }
}

impl PolymerSubtype {
    #[must_use]
    pub fn from_ctab_key(key: &str) -> Option<Self> {
        match key {
            "ALT" => Some(Self::Alternating),
            "RAN" => Some(Self::Random),
            "BLO" => Some(Self::Block),
            _ => None,
        }
    }
}

impl Connectivity {
    #[must_use]
    pub fn from_ctab_key(key: &str) -> Option<Self> {
        match key {
            "HH" => Some(Self::HeadToHead),
            "HT" => Some(Self::HeadToTail),
            "EU" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl BracketStyle {
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Square),
            1 => Some(Self::Round),
            _ => None,
        }
    }
}

impl Sgroup {
    /// Sorts generic attributes into the view for `kind`, later attributes replacing earlier ones. Parent links and
    /// membership are filled in by the caller.
    #[must_use]
    pub fn downcast(id: u32, kind: Option<SgroupType>, attributes: Vec<SgroupAttribute>) -> Self {
        let mut view = SgroupAttributes::for_kind(kind);
        let other = attributes
            .into_iter()
            .filter_map(|attribute| view.absorb(attribute).err())
            .collect();

        Self {
            id,
            kind,
            atoms: BTreeSet::new(),
            bonds: BTreeSet::new(),
            parents: BTreeSet::new(),
            brackets: Vec::new(),
            attributes: view,
            other,
        }
    }
}

// Private Helper Methods ==============================================================================================

impl SgroupAttributes {
    fn for_kind(kind: Option<SgroupType>) -> Self {
        match kind {
            Some(SgroupType::Superatom) => Self::Superatom {
                label: None,
                expanded: false,
            },
            Some(SgroupType::Multiple) => Self::Multiple {
                multiplier: None,
                parent_atoms: BTreeSet::new(),
            },
            Some(kind) if kind.is_polymer() => Self::Polymer {
                subscript: None,
                connectivity: None,
                subtype: None,
                bracket_style: None,
            },
            Some(SgroupType::Component | SgroupType::Mixture | SgroupType::Formulation) => {
                Self::Component {
                    order: None,
                    bracket_style: None,
                }
            }
            _ => Self::Generic,
        }
    }

    // NOTE: Hands back any attribute that doesn't fit this view, or whose value can't be interpreted
    fn absorb(&mut self, attribute: SgroupAttribute) -> Result<(), SgroupAttribute> {
        use SgroupAttribute as A;

        match (self, attribute) {
            (Self::Superatom { label, .. }, A::Subscript(text)) => *label = Some(text),
            (Self::Superatom { expanded, .. }, A::Expanded) => *expanded = true,
            (Self::Multiple { multiplier, .. }, A::Subscript(text)) => *multiplier = Some(text),
            (Self::Multiple { parent_atoms, .. }, A::ParentAtoms(atoms)) => parent_atoms.extend(atoms),
            (Self::Polymer { subscript, .. }, A::Subscript(text)) => *subscript = Some(text),
            (Self::Polymer { connectivity, .. }, A::Connectivity(text)) => {
                *connectivity = Some(Connectivity::from_ctab_key(&text).ok_or(A::Connectivity(text))?);
            }
            (Self::Polymer { subtype, .. }, A::Subtype(text)) => {
                *subtype = Some(PolymerSubtype::from_ctab_key(&text).ok_or(A::Subtype(text))?);
            }
            (
                Self::Polymer { bracket_style, .. } | Self::Component { bracket_style, .. },
                A::BracketStyle(code),
            ) => {
                *bracket_style = Some(BracketStyle::from_code(code).ok_or(A::BracketStyle(code))?);
            }
            (Self::Component { order, .. }, A::ComponentOrder(n)) => *order = Some(n),
            (_, attribute) => return Err(attribute),
        }
        Ok(())
    }
}

// Module Tests ========================================================================================================
