// External Crate Imports
use periodic::{AtomicNumber, Element, MassNumber};
use serde::Serialize;

// Public API ==========================================================================================================

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Atom {
    pub kind: AtomKind,
    pub position: Position,
    pub formal_charge: i32,
    pub mass: Mass,
    pub parity: Parity,
    /// An explicit valence, either read from the input or assigned by a valence model
    pub valency: Option<u32>,
    pub implicit_hydrogens: Option<u32>,
    /// The atom-atom mapping number used to track atoms through reactions
    pub mapping: Option<u32>,
    pub aromatic: bool,
    pub comment: Option<String>,
    /// A vendor-specific display label, kept verbatim (leading and trailing whitespace included)
    pub vendor_label: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub enum AtomKind {
    Element { number: AtomicNumber, symbol: String },
    Pseudo { label: String },
}

#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize)]
pub enum Position {
    #[default]
    Unset,
    TwoD { x: f64, y: f64 },
    ThreeD { x: f64, y: f64, z: f64 },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize)]
pub enum Mass {
    /// The natural isotopic distribution of the element
    #[default]
    Natural,
    Isotope(MassNumber),
    /// A mass was requested relative to an element with no naturally occurring isotopes
    Unresolved,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Either,
}

impl Atom {
    #[must_use]
    pub fn from_element(element: Element) -> Self {
        Self::new(AtomKind::Element {
            number: element.number(),
            symbol: element.symbol().to_owned(),
        })
    }

    #[must_use]
    pub fn pseudo(label: impl Into<String>) -> Self {
        Self::new(AtomKind::Pseudo {
            label: label.into(),
        })
    }

    fn new(kind: AtomKind) -> Self {
        Self {
            kind,
            position: Position::Unset,
            formal_charge: 0,
            mass: Mass::Natural,
            parity: Parity::None,
            valency: None,
            implicit_hydrogens: None,
            mapping: None,
            aromatic: false,
            comment: None,
            vendor_label: None,
        }
    }

    /// The element symbol, or the label of a pseudo-atom
    #[must_use]
    pub fn symbol(&self) -> &str {
        match &self.kind {
            AtomKind::Element { symbol, .. } => symbol,
            AtomKind::Pseudo { label } => label,
        }
    }

    /// Pseudo-atoms have an atomic number of zero
    #[must_use]
    pub fn atomic_number(&self) -> u8 {
        match self.kind {
            AtomKind::Element { number, .. } => number.into(),
            AtomKind::Pseudo { .. } => 0,
        }
    }

    #[must_use]
    pub const fn is_pseudo(&self) -> bool {
        matches!(self.kind, AtomKind::Pseudo { .. })
    }

    #[must_use]
    pub fn is_hydrogen(&self) -> bool {
        self.atomic_number() == 1
    }

    /// A pseudo-atom carrying `label` in place of this atom, keeping every other annotation
    #[must_use]
    pub fn relabeled(&self, label: impl Into<String>) -> Self {
        Self {
            kind: AtomKind::Pseudo {
                label: label.into(),
            },
            ..self.clone()
        }
    }
}

impl Position {
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Drops the z-coordinate of a 3D position
    #[must_use]
    pub const fn flattened(self) -> Self {
        match self {
            Self::ThreeD { x, y, .. } => Self::TwoD { x, y },
            other => other,
        }
    }
}

impl Parity {
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Odd),
            2 => Some(Self::Even),
            3 => Some(Self::Either),
            _ => None,
        }
    }
}

// Module Tests ========================================================================================================
