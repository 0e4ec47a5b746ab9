// Standard Library Imports
use std::{io, ops::Range};

// External Crate Imports
use log::debug;
use molgraph::{Atom, AtomIndex, BondIndex, Molecule};
use periodic::IsotopeTable;

// Local Crate Imports
use crate::{
    config::ReaderConfig,
    data_block::read_data_block,
    errors::{CtabError, CtabErrorKind, Diagnostics, Result},
    fields::{read_coordinate, MalformedCoordinate},
    lines::LineReader,
    molecule_block::MoleculeBlock,
    reader::{Dialect, Record},
    sgroups::SgroupArena,
    stereo::add_tetrahedral_stereo,
    valence::apply_valence_model,
};

/// The scratch state for decoding a single record; a fresh decoder is built for every record
pub(crate) struct RecordDecoder<'r, I, T> {
    pub(crate) lines: &'r mut LineReader<I>,
    pub(crate) table: &'r T,
    pub(crate) config: ReaderConfig,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) molecule: Molecule,
    pub(crate) sgroups: SgroupArena,
    // NOTE: The first atom and bond of this record; the molecule may already hold atoms and bonds from earlier reads
    pub(crate) atom_offset: usize,
    pub(crate) bond_offset: usize,
    pub(crate) atom_count: usize,
    pub(crate) bond_count: usize,
}

impl<'r, I, T> RecordDecoder<'r, I, T>
where
    I: Iterator<Item = io::Result<String>>,
    T: IsotopeTable,
{
    pub(crate) fn new(lines: &'r mut LineReader<I>, table: &'r T, config: ReaderConfig, molecule: Molecule) -> Self {
        let atom_offset = molecule.atom_count();
        let bond_offset = molecule.bond_count();
        Self {
            lines,
            table,
            config,
            diagnostics: Diagnostics::new(config.mode),
            molecule,
            sgroups: SgroupArena::default(),
            atom_offset,
            bond_offset,
            atom_count: 0,
            bond_count: 0,
        }
    }

    /// Runs every block of the record in order: header and molecule block, properties, then any data fields
    pub(crate) fn decode(mut self) -> Result<Option<Record>> {
        let block = match self.read_molecule_block()? {
            MoleculeBlock::Exhausted => return Ok(None),
            MoleculeBlock::Empty => return Ok(Some(self.finish(Dialect::Unspecified))),
            MoleculeBlock::Read(block) => block,
        };
        debug!(
            "read {} atoms and {} bonds ending on line {}",
            self.atom_count,
            self.bond_count,
            self.lines.line_number()
        );

        if self.config.add_stereo_elements && !block.has_query_bonds && block.has_coordinates {
            let atoms = self.atom_offset..self.atom_offset + self.atom_count;
            add_tetrahedral_stereo(&mut self.molecule, atoms);
        }

        self.read_properties_block()?;
        read_data_block(self.lines, &mut self.molecule)?;
        apply_valence_model(&mut self.molecule, self.atom_offset, &block.explicit_valence);

        Ok(Some(self.finish(block.dialect)))
    }

    fn finish(self, dialect: Dialect) -> Record {
        Record {
            molecule: self.molecule,
            dialect,
            issues: self.diagnostics.into_issues(),
        }
    }

    // Shared Helpers ==================================================================================================

    pub(crate) fn error(&self, line: &str, columns: Range<usize>, kind: CtabErrorKind) -> CtabError {
        self.lines.error(line, kind).at(columns)
    }

    /// An error that ends decoding no matter the mode
    pub(crate) fn fail(&self, line: &str, columns: Range<usize>, kind: CtabErrorKind) -> Box<CtabError> {
        Box::new(self.error(line, columns, kind))
    }

    /// Reports a problem through the strict / relaxed policy
    pub(crate) fn tolerate(&mut self, line: &str, columns: Range<usize>, kind: CtabErrorKind) -> Result<()> {
        let error = self.error(line, columns, kind);
        self.diagnostics.handle(error)
    }

    pub(crate) fn atom_mut(&mut self, line: &str, index: AtomIndex) -> Result<&mut Atom> {
        self.molecule
            .atom_mut(index)
            .map_err(|e| Box::new(self.lines.error(line, e.into())))
    }

    pub(crate) fn coordinate(&mut self, line: &str, offset: usize) -> Result<f64> {
        let columns = offset..offset + 10;
        match read_coordinate(line, offset) {
            Ok(value) => Ok(value),
            Err(MalformedCoordinate {
                field,
                fallback: Some(value),
            }) => {
                self.tolerate(line, columns, CtabErrorKind::MalformedCoordinate { field })?;
                Ok(value)
            }
            Err(MalformedCoordinate {
                field,
                fallback: None,
            }) => Err(self.fail(line, columns, CtabErrorKind::UnreadableCoordinate { field })),
        }
    }

    /// Resolves a 1-based atom number from a property line, reporting numbers outside this record's atom block
    pub(crate) fn atom_reference(&mut self, line: &str, column: usize, number: i32) -> Result<Option<AtomIndex>> {
        match checked_index(number, self.atom_count) {
            Some(index) => Ok(Some(AtomIndex::new(self.atom_offset + index))),
            None => {
                let kind = CtabErrorKind::AtomOutOfRange {
                    index: number.into(),
                    count: self.atom_count,
                };
                self.tolerate(line, column..column + 3, kind)?;
                Ok(None)
            }
        }
    }

    pub(crate) fn bond_reference(&mut self, line: &str, column: usize, number: i32) -> Result<Option<BondIndex>> {
        match checked_index(number, self.bond_count) {
            Some(index) => Ok(Some(BondIndex::new(self.bond_offset + index))),
            None => {
                let kind = CtabErrorKind::BondOutOfRange {
                    index: number.into(),
                    count: self.bond_count,
                };
                self.tolerate(line, column..column + 3, kind)?;
                Ok(None)
            }
        }
    }
}

/// Converts a 1-based number into a 0-based index, if it lies within `1..=count`
pub(crate) fn checked_index(number: i32, count: usize) -> Option<usize> {
    usize::try_from(number)
        .ok()
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1)
}

// Module Tests ========================================================================================================
