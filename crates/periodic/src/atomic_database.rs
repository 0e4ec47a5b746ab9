// Standard Library Imports
use std::{ops::Deref, str::FromStr};

// External Crate Imports
use ahash::HashMap;
use knuffel::{
    Decode, DecodeScalar,
    ast::{self, Integer, Literal, Radix, TypeName},
    decode::{Context, Kind},
    errors::{DecodeError, ExpectedType},
    span::Spanned,
    traits::ErrorSpan,
};
use miette::{Diagnostic, Result};
use rust_decimal::Decimal;
use thiserror::Error;

// Local Crate Imports
use crate::{
    AtomicNumber, Element, Isotope, IsotopeTable, MassNumber, errors::AtomicLookupError,
};

pub const DEFAULT_KDL: &str = include_str!("../atomic_database.kdl");

// Public API ==========================================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AtomicDatabase {
    elements: HashMap<String, ElementDescription>,
    symbols: HashMap<AtomicNumber, String>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
struct ElementDescription {
    name: String,
    number: AtomicNumber,
    isotopes: HashMap<MassNumber, Isotope>,
}

impl AtomicDatabase {
    pub fn new(file_name: impl AsRef<str>, kdl_text: impl AsRef<str>) -> Result<Self> {
        let parsed_db: AtomicDatabaseKdl = knuffel::parse(file_name.as_ref(), kdl_text.as_ref())?;
        let elements: HashMap<_, _> = parsed_db
            .elements
            .into_iter()
            .map(ElementEntry::from)
            .collect();
        let symbols = elements
            .iter()
            .map(|(symbol, ElementDescription { number, .. })| (*number, symbol.clone()))
            .collect();

        Ok(Self { elements, symbols })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element_by_atomic_number(&self, number: u8) -> Result<Element<'_>, AtomicLookupError> {
        self.element_by_number(AtomicNumber(number))
            .ok_or(AtomicLookupError::AtomicNumber(number))
    }
}

impl Default for AtomicDatabase {
    fn default() -> Self {
        // NOTE: The embedded database is checked by the tests below, so this can't fail at runtime
        Self::new("atomic_database.kdl", DEFAULT_KDL).expect("the embedded atomic database failed to parse")
    }
}

impl IsotopeTable for AtomicDatabase {
    fn element(&self, symbol: &str) -> Option<Element<'_>> {
        let (symbol, ElementDescription {
            name,
            number,
            isotopes,
        }) = self.elements.get_key_value(symbol)?;

        Some(Element::new(symbol, name, *number, isotopes))
    }

    fn element_by_number(&self, number: AtomicNumber) -> Option<Element<'_>> {
        self.symbols
            .get(&number)
            .and_then(|symbol| self.element(symbol))
    }

    fn isotope(&self, symbol: &str, mass_number: MassNumber) -> Result<&Isotope, AtomicLookupError> {
        let ElementDescription { name, isotopes, .. } = self
            .elements
            .get(symbol)
            .ok_or_else(|| AtomicLookupError::Element(symbol.to_owned()))?;

        isotopes.get(&mass_number).ok_or_else(|| {
            let mut known: Vec<_> = isotopes.keys().copied().collect();
            known.sort_unstable();
            AtomicLookupError::Isotope(symbol.to_owned(), mass_number, name.clone(), known)
        })
    }
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
struct AtomicDatabaseKdl {
    #[knuffel(child, unwrap(children))]
    elements: Vec<ElementKdl>,
}

#[derive(Debug, Decode)]
struct ElementKdl {
    #[knuffel(node_name)]
    symbol: ElementSymbol,
    #[knuffel(argument)]
    name: String,
    #[knuffel(argument)]
    number: u8,
    #[knuffel(children(name = "isotope", non_empty))]
    isotopes: Vec<IsotopeKdl>,
}

#[derive(Debug, Decode)]
struct IsotopeKdl {
    #[knuffel(argument)]
    mass_number: u32,
    #[knuffel(argument)]
    relative_mass: DecimalKdl,
    #[knuffel(argument)]
    abundance: Option<DecimalKdl>,
}

// Lossless Parsing of KDL Numbers to Decimal ==========================================================================

#[derive(Debug, Default)]
struct DecimalKdl(Decimal);

impl<S: ErrorSpan> DecodeScalar<S> for DecimalKdl {
    fn type_check(type_name: &Option<Spanned<TypeName, S>>, ctx: &mut Context<S>) {
        if let Some(t) = type_name {
            ctx.emit_error(DecodeError::TypeName {
                span: t.span().clone(),
                found: Some(t.deref().clone()),
                expected: ExpectedType::no_type(),
                rust_type: "Decimal",
            });
        }
    }

    fn raw_decode(
        value: &Spanned<Literal, S>,
        ctx: &mut Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        match &**value {
            Literal::Decimal(ast::Decimal(s)) | Literal::Int(Integer(Radix::Dec, s)) => {
                let parsed = if s.contains(['e', 'E']) {
                    Decimal::from_scientific(s)
                } else {
                    Decimal::from_str_exact(s)
                };
                parsed.map(Self).or_else(|e| {
                    ctx.emit_error(DecodeError::conversion(value, Box::new(e)));
                    Ok(Self::default())
                })
            }
            unsupported => {
                ctx.emit_error(DecodeError::unsupported(
                    value,
                    format!("expected a decimal number, found {}", Kind::from(unsupported)),
                ));
                Ok(Self::default())
            }
        }
    }
}

// Element Symbol Validation ===========================================================================================

#[derive(Debug)]
struct ElementSymbol(String);

impl FromStr for ElementSymbol {
    type Err = InvalidElementSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chrs: Vec<_> = s.chars().collect();
        match chrs[..] {
            [f] if f.is_ascii_uppercase() => Ok(Self(s.to_owned())),
            [f, l] if f.is_ascii_uppercase() && l.is_ascii_lowercase() => Ok(Self(s.to_owned())),
            _ => Err(InvalidElementSymbolError(s.to_owned())),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Diagnostic, Error)]
#[error(
    "expected a single uppercase ASCII letter optionally followed by a lowercase ASCII letter, got {0:?}"
)]
struct InvalidElementSymbolError(String);

// Conversion From Parsed KDL to Internal Representation ===============================================================

type ElementEntry = (String, ElementDescription);

impl From<ElementKdl> for ElementEntry {
    fn from(
        ElementKdl {
            symbol,
            name,
            number,
            isotopes,
        }: ElementKdl,
    ) -> Self {
        let isotopes = isotopes
            .into_iter()
            .map(|IsotopeKdl { mass_number, relative_mass, abundance }| {
                let mass_number = MassNumber(mass_number);
                let isotope = Isotope {
                    mass_number,
                    relative_mass: relative_mass.0,
                    abundance: abundance.map(|a| a.0),
                };
                (mass_number, isotope)
            })
            .collect();

        (
            symbol.0,
            ElementDescription {
                name,
                number: AtomicNumber(number),
                isotopes,
            },
        )
    }
}

// Module Tests ========================================================================================================
