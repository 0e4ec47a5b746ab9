// Standard Library Imports
use std::{fmt, io, ops::Range};

// External Crate Imports
use log::warn;
use miette::{Diagnostic, LabeledSpan, SourceSpan};
use molgraph::GraphError;
use thiserror::Error;

// Local Crate Imports
use crate::config::Mode;

pub type Result<T, E = Box<CtabError>> = std::result::Result<T, E>;

/// A problem found while reading a connection table, tied to the input line it was found on
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("line {line}: {kind}")]
pub struct CtabError {
    line: usize,
    text: String,
    columns: Option<SourceSpan>,
    kind: CtabErrorKind,
}

/// How a problem is treated: `Format` and `Referential` problems are fatal in strict mode only, `Truncation` is
/// always tolerated, and `Stream` always ends the read
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCategory {
    Format,
    Referential,
    Truncation,
    Stream,
}

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum CtabErrorKind {
    #[error("expected a counts line, but found a blank line")]
    #[diagnostic(help(
        "a molfile header is three lines (title, program and remark) followed by the counts line"
    ))]
    BlankCountsLine,

    #[error("V3000 connection tables cannot be read by the V2000 decoder")]
    #[diagnostic(help("only the fixed-column V2000 dialect is supported"))]
    UnsupportedDialect,

    #[error("the counts line does not declare a CTab version")]
    #[diagnostic(help("columns 35 to 39 of the counts line should read V2000"))]
    UnspecifiedDialect,

    #[error("atom lines need at least 32 columns for the coordinates and symbol, but this one has {length}")]
    AtomLineTooShort { length: usize },

    #[error("bond lines need at least 9 columns for the atoms and bond type, but this one has {length}")]
    BondLineTooShort { length: usize },

    #[error("expected a coordinate with 4 decimal places, but found {field:?}")]
    #[diagnostic(help("coordinates are 10 columns wide, laid out as xxxxx.xxxx"))]
    MalformedCoordinate { field: String },

    #[error("{field:?} could not be read as a coordinate")]
    UnreadableCoordinate { field: String },

    #[error("{symbol:?} is not an element symbol or a recognised pseudo-atom label")]
    #[diagnostic(help("element symbols are case-sensitive; pseudo-atoms are *, A, Q, L, LP, R, R# and R1, R2, ..."))]
    InvalidSymbol { symbol: String },

    #[error("{symbol:?} is not an element symbol")]
    #[diagnostic(help("relaxed mode reads D and T as hydrogen isotopes"))]
    HydrogenIsotopeSymbol { symbol: String },

    #[error("{code:?} is not a valid atom charge code")]
    #[diagnostic(help("charge codes run from 0 to 7"))]
    InvalidChargeCode { code: char },

    #[error("{code} is not a valid stereo parity")]
    #[diagnostic(help("parities are 0 (none), 1 (odd), 2 (even) or 3 (either)"))]
    InvalidParity { code: u32 },

    #[error("the bond type {code} is not defined")]
    #[diagnostic(help("bond types run from 1 (single) to 8 (any)"))]
    UnknownBondType { code: i32 },

    #[error("the bond stereo code {code} makes no sense on a bond of type {bond_type}")]
    #[diagnostic(help(
        "wedges (1, 4 and 6) belong on single bonds, and the cis/trans flag (3) belongs on double bonds"
    ))]
    InvalidBondStereo { code: u32, bond_type: i32 },

    #[error("the mass number {mass_number} is negative")]
    NegativeMassNumber { mass_number: i32 },

    #[error("{value} is not a valid radical code")]
    #[diagnostic(help("radicals are 0 (none), 1 (singlet), 2 (doublet) or 3 (triplet)"))]
    InvalidRadical { value: i32 },

    #[error("vendor atom labels (M  ZZC) are not allowed in strict mode")]
    VendorLabel,

    #[error("the Sgroup subtype {subtype:?} is not one of ALT, RAN or BLO")]
    InvalidSgroupSubtype { subtype: String },

    #[error("Sgroup {id} has a subtype, but only copolymer (COP) groups can have one")]
    SubtypeOnNonCopolymer { id: u32 },

    #[error("the Sgroup connectivity {connectivity:?} is not one of HH, HT or EU")]
    InvalidConnectivity { connectivity: String },

    #[error("expected EXP to follow the SDS tag")]
    MissingExpansionTag,

    #[error("unstable use of mass delta on {symbol}, please use M  ISO")]
    #[diagnostic(help("the element has no naturally occurring isotope to add the delta to"))]
    UnstableMassDelta { symbol: String },

    #[error("atom {index} is outside the atom block, which has atoms 1 to {count}")]
    AtomOutOfRange { index: i64, count: usize },

    #[error("bond {index} is outside the bond block, which has bonds 1 to {count}")]
    BondOutOfRange { index: i64, count: usize },

    #[error("Sgroup numbers can't be negative, but found {id}")]
    InvalidSgroupId { id: i32 },

    #[error("Sgroup {id} was referenced before being declared")]
    #[diagnostic(help("each Sgroup must be declared by an M  STY line before any other line refers to it"))]
    UndeclaredSgroup { id: u32 },

    #[error("Sgroup {id} was declared more than once")]
    #[diagnostic(help("the M  STY line must come before every other line describing the same Sgroup"))]
    RedeclaredSgroup { id: u32 },

    #[error("making Sgroup {parent} the parent of Sgroup {child} creates a cycle")]
    SgroupCycle { child: u32, parent: u32 },

    #[error("{tag} declared {declared} entries, but only {found} fit on the line")]
    TruncatedList {
        tag: &'static str,
        declared: u32,
        found: u32,
    },

    #[error("the input ended while reading {expected}")]
    PrematureEnd { expected: &'static str },

    #[error("failed to read input: {message}")]
    Io { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),
}

impl CtabError {
    pub(crate) fn new(line: usize, text: &str, kind: CtabErrorKind) -> Self {
        Self {
            line,
            text: text.to_owned(),
            columns: None,
            kind,
        }
    }

    /// Points the error at a range of (zero-based) columns in the offending line
    #[must_use]
    pub(crate) fn at(mut self, columns: Range<usize>) -> Self {
        let end = columns.end.min(self.text.len());
        let start = columns.start.min(end);
        self.columns = Some((start..end).into());
        self
    }

    pub(crate) fn io(line: usize, error: &io::Error) -> Self {
        let message = error.to_string();
        Self::new(line, "", CtabErrorKind::Io { message })
    }

    /// The 1-based number of the line the problem was found on
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn kind(&self) -> &CtabErrorKind {
        &self.kind
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl Diagnostic for CtabError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("ctab::{}", self.category())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.kind.help()
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.columns.map(|_| &self.text as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.columns?;
        let label = LabeledSpan::new_with_span(Some(self.kind.label().to_owned()), span);
        Some(Box::new(std::iter::once(label)))
    }
}

impl CtabErrorKind {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::AtomOutOfRange { .. }
            | Self::BondOutOfRange { .. }
            | Self::InvalidSgroupId { .. }
            | Self::UndeclaredSgroup { .. }
            | Self::RedeclaredSgroup { .. }
            | Self::SgroupCycle { .. } => ErrorCategory::Referential,
            Self::TruncatedList { .. } => ErrorCategory::Truncation,
            Self::PrematureEnd { .. } | Self::Io { .. } => ErrorCategory::Stream,
            _ => ErrorCategory::Format,
        }
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::UnsupportedDialect | Self::UnspecifiedDialect => "version",
            Self::AtomLineTooShort { .. } | Self::BondLineTooShort { .. } => "line ends here",
            Self::MalformedCoordinate { .. } | Self::UnreadableCoordinate { .. } => "coordinate",
            Self::InvalidSymbol { .. } | Self::HydrogenIsotopeSymbol { .. } => "symbol",
            Self::InvalidChargeCode { .. } => "charge",
            Self::InvalidParity { .. } => "parity",
            Self::UnknownBondType { .. } => "bond type",
            Self::InvalidBondStereo { .. } => "bond stereo",
            Self::AtomOutOfRange { .. } => "atom",
            Self::BondOutOfRange { .. } => "bond",
            Self::InvalidSgroupId { .. }
            | Self::UndeclaredSgroup { .. }
            | Self::RedeclaredSgroup { .. }
            | Self::SgroupCycle { .. } => "Sgroup",
            _ => "here",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Format => "format",
            Self::Referential => "referential",
            Self::Truncation => "truncation",
            Self::Stream => "stream",
        };
        f.write_str(name)
    }
}

// =====================================================================================================================

/// The single place where the strict / relaxed policy is applied. Tolerated problems are logged and collected so
/// they can be handed back alongside the record.
#[derive(Debug)]
pub(crate) struct Diagnostics {
    mode: Mode,
    issues: Vec<CtabError>,
}

impl Diagnostics {
    pub(crate) const fn new(mode: Mode) -> Self {
        Self {
            mode,
            issues: Vec::new(),
        }
    }

    pub(crate) const fn is_strict(&self) -> bool {
        matches!(self.mode, Mode::Strict)
    }

    /// Fails in strict mode, or when the problem can never be tolerated; otherwise records it and carries on
    pub(crate) fn handle(&mut self, error: CtabError) -> Result<()> {
        match (error.category(), self.mode) {
            (ErrorCategory::Stream, _) | (ErrorCategory::Format | ErrorCategory::Referential, Mode::Strict) => {
                Err(Box::new(error))
            }
            _ => {
                self.warn(error);
                Ok(())
            }
        }
    }

    /// Records a problem that is tolerated in every mode
    pub(crate) fn warn(&mut self, error: CtabError) {
        warn!("{error}");
        self.issues.push(error);
    }

    pub(crate) fn into_issues(self) -> Vec<CtabError> {
        self.issues
    }
}

// Module Tests ========================================================================================================
