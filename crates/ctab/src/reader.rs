// Standard Library Imports
use std::{
    io::{self, BufRead},
    sync::LazyLock,
};

// External Crate Imports
use derive_more::Display;
use molgraph::Molecule;
use periodic::IsotopeTable;
use regex::Regex;

// Local Crate Imports
use crate::{
    config::ReaderConfig,
    decoder::RecordDecoder,
    errors::{CtabError, Result},
    fields::byte_at,
    lines::{LineReader, str_lines},
};

// Public API ==========================================================================================================

/// A single decoded record, along with every problem that was tolerated while reading it
#[derive(Clone, PartialEq, Debug)]
pub struct Record {
    pub molecule: Molecule,
    pub dialect: Dialect,
    /// Empty unless the record was read in relaxed mode
    pub issues: Vec<CtabError>,
}

/// The connection table version declared at the end of the counts line
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum Dialect {
    V2000,
    V3000,
    /// Older files often leave the version out entirely
    Unspecified,
}

/// Decodes one Molfile record at a time. The reader holds nothing that changes between records, so one reader can
/// be used for any number of them.
#[derive(Clone, Debug)]
pub struct MolfileReader<T> {
    table: T,
    config: ReaderConfig,
}

impl Dialect {
    /// Reads the version from columns 34 to 39 of a counts line
    #[must_use]
    pub fn of_counts_line(line: &str) -> Self {
        let bytes = line.as_bytes();
        if line.len() < 39 || !matches!(byte_at(bytes, 34), b'v' | b'V') {
            return Self::Unspecified;
        }
        match byte_at(bytes, 35) {
            b'2' => Self::V2000,
            b'3' => Self::V3000,
            _ => Self::Unspecified,
        }
    }

    /// Looks for a version marker anywhere on the line, as a quick check before a record is decoded
    #[must_use]
    pub fn sniff(line: &str) -> Option<Self> {
        static VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[vV](2000|3000)").unwrap());

        let version = VERSION.captures(line)?;
        Some(if &version[1] == "2000" { Self::V2000 } else { Self::V3000 })
    }
}

impl<T: IsotopeTable> MolfileReader<T> {
    pub const fn new(table: T, config: ReaderConfig) -> Self {
        Self { table, config }
    }

    pub const fn config(&self) -> ReaderConfig {
        self.config
    }

    /// Reads the first record of `text`. Returns `Ok(None)` when there is no record to read: the input is empty, or
    /// the record was abandoned at a blank counts line.
    ///
    /// # Errors
    ///
    /// Fails whenever the record can't be read under the configured [`Mode`](crate::Mode).
    pub fn read_str(&self, text: &str) -> Result<Option<Record>> {
        self.read_lines(&mut LineReader::new(str_lines(text)), Molecule::new())
    }

    /// # Errors
    ///
    /// Fails like [`MolfileReader::read_str`], or when the input can't be read.
    pub fn read(&self, input: impl BufRead) -> Result<Option<Record>> {
        self.read_into(input, Molecule::new())
    }

    /// Reads a record into a molecule that may already hold atoms and bonds; every index in the record is offset by
    /// the atoms and bonds already present.
    ///
    /// # Errors
    ///
    /// Fails like [`MolfileReader::read`].
    pub fn read_into(&self, input: impl BufRead, molecule: Molecule) -> Result<Option<Record>> {
        self.read_lines(&mut LineReader::new(input.lines()), molecule)
    }

    pub(crate) fn read_lines<I>(&self, lines: &mut LineReader<I>, molecule: Molecule) -> Result<Option<Record>>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        RecordDecoder::new(lines, &self.table, self.config, molecule).decode()
    }
}

// Module Tests ========================================================================================================
