//! Streaming access to the records of an SD file

// Standard Library Imports
use std::{
    io::{self, BufRead},
    iter::FusedIterator,
    mem,
};

// External Crate Imports
use log::{debug, error};
use molgraph::Molecule;
use periodic::IsotopeTable;

// Local Crate Imports
use crate::{
    config::ReaderConfig,
    data_block::{DELIMITER, read_data_block},
    errors::{CtabError, CtabErrorKind, Result},
    lines::LineReader,
    reader::{Dialect, MolfileReader, Record},
};

type EndOfMolecule = Box<dyn Fn(&str) -> bool>;

/// Pulls records from an SD file one at a time. Each record's connection table is buffered up to its end-of-molecule
/// line and decoded, then the data fields that follow it are read straight from the input.
///
/// When a record can't be decoded, iteration either ends after yielding the error, or (with
/// [`ReaderConfig::skip_on_error`]) logs it and moves on to the next record. Failures of the input itself always end
/// iteration.
pub struct SdfReader<R, T> {
    lines: LineReader<io::Lines<R>>,
    reader: MolfileReader<T>,
    end_of_molecule: EndOfMolecule,
    skipped: usize,
    finished: bool,
}

impl<R: BufRead, T: IsotopeTable> SdfReader<R, T> {
    pub fn new(input: R, table: T, config: ReaderConfig) -> Self {
        Self {
            lines: LineReader::new(input.lines()),
            reader: MolfileReader::new(table, config),
            end_of_molecule: Box::new(|line| line.starts_with("M  END")),
            skipped: 0,
            finished: false,
        }
    }

    /// Replaces the test for the last line of a connection table, which is `M  END` by default
    #[must_use]
    pub fn with_end_of_molecule(self, end_of_molecule: impl Fn(&str) -> bool + 'static) -> Self {
        Self {
            end_of_molecule: Box::new(end_of_molecule),
            ..self
        }
    }

    /// The number of records dropped so far because they couldn't be decoded
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    // Private Helper Methods ==========================================================================================

    /// The next record in the input, or `None` once the input runs out
    fn next_record(&mut self) -> Result<Option<Record>> {
        let mut buffer = Vec::new();
        let mut start = self.lines.line_number();
        let mut dialect = None;

        while let Some(line) = self.lines.next_line()? {
            if line.starts_with(DELIMITER) {
                if !buffer.is_empty() {
                    let end = self.lines.line_number();
                    debug!("discarding a record with no end-of-molecule line, ending on line {end}");
                }
                buffer.clear();
                start = self.lines.line_number();
                dialect = None;
                continue;
            }

            // The fourth line of a record is its counts line
            if buffer.len() == 3 {
                dialect = Dialect::sniff(&line);
            }
            let at_end = (self.end_of_molecule)(&line);
            buffer.push(line);
            if !at_end {
                continue;
            }

            if dialect == Some(Dialect::V3000) {
                let kind = CtabErrorKind::UnsupportedDialect;
                return Err(Box::new(CtabError::new(start + 4, &buffer[3], kind)));
            }

            let mut ctab = LineReader::starting_after(mem::take(&mut buffer).into_iter().map(Ok), start);
            if let Some(mut record) = self.reader.read_lines(&mut ctab, Molecule::new())? {
                read_data_block(&mut self.lines, &mut record.molecule)?;
                return Ok(Some(record));
            }

            debug!("no record could be read from lines {} to {}", start + 1, self.lines.line_number());
            self.skip_record()?;
            start = self.lines.line_number();
            dialect = None;
        }

        if !buffer.is_empty() {
            debug!("the input ended before the end-of-molecule line of the record starting on line {}", start + 1);
        }
        Ok(None)
    }

    /// Discards everything up to and including the next record delimiter
    fn skip_record(&mut self) -> Result<()> {
        while let Some(line) = self.lines.next_line()? {
            if line.starts_with(DELIMITER) {
                break;
            }
        }
        Ok(())
    }
}

impl<R: BufRead, T: IsotopeTable> Iterator for SdfReader<R, T> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let error = match self.next_record() {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(error) => error,
            };

            let recoverable = !matches!(error.kind(), CtabErrorKind::Io { .. });
            if !(self.reader.config().skip_on_error && recoverable) {
                self.finished = true;
                return Some(Err(error));
            }

            error!("skipping a record that couldn't be read: {error}");
            self.skipped += 1;
            if let Err(error) = self.skip_record() {
                self.finished = true;
                return Some(Err(error));
            }
        }
        None
    }
}

impl<R: BufRead, T: IsotopeTable> FusedIterator for SdfReader<R, T> {}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use std::io::{self, BufRead, Read};

    use indoc::indoc;
    use once_cell::sync::Lazy;
    use periodic::AtomicDatabase;

    use super::SdfReader;
    use crate::{
        config::ReaderConfig,
        errors::{CtabErrorKind, ErrorCategory},
    };

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);

    const WATER: &str = indoc! {"
        water
          sdfinder

          3  2  0  0  0  0  0  0  0  0999 V2000
            0.0000    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
            0.9572    0.0000    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
           -0.2400    0.9266    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
          1  2  1  0
          1  3  1  0
        M  END
        > <NAME>
        water

        $$$$
    "};

    // The third bond has a type code that doesn't exist
    const BROKEN: &str = indoc! {"
        broken
          sdfinder

          3  3  0  0  0  0  0  0  0  0999 V2000
            0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
            1.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
            0.5000    0.8660    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
          1  2  1  0
          2  3  1  0
          3  1  9  0
        M  END
        > <NAME>
        broken

        $$$$
    "};

    const V3000: &str = indoc! {"
        methane
          sdfinder

          0  0  0     0  0            999 V3000
        M  V30 BEGIN CTAB
        M  V30 COUNTS 1 0 0 0 0
        M  V30 BEGIN ATOM
        M  V30 1 C 0 0 0 0
        M  V30 END ATOM
        M  V30 END CTAB
        M  END
        $$$$
    "};

    fn names<R: BufRead>(reader: SdfReader<R, &AtomicDatabase>) -> Vec<Result<String, CtabErrorKind>> {
        reader
            .map(|record| {
                record
                    .map(|record| record.molecule.title.unwrap_or_default())
                    .map_err(|error| error.kind().clone())
            })
            .collect()
    }

    #[test]
    fn every_record() {
        let text = format!("{WATER}{WATER}{WATER}");
        let mut reader = SdfReader::new(text.as_bytes(), &*DB, ReaderConfig::default());
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.molecule.property("NAME"), Some("water"));
        assert_eq!(first.molecule.formula(), "H2O");
        assert_eq!(reader.count(), 2);
    }

    #[test]
    fn skip_broken_records() {
        let text = format!("{WATER}{BROKEN}{WATER}");
        let config = ReaderConfig::default().with_skip_on_error(true);
        let mut reader = SdfReader::new(text.as_bytes(), &*DB, config);
        assert_eq!(reader.by_ref().filter(Result::is_ok).count(), 2);
        assert_eq!(reader.skipped(), 1);
    }

    #[test]
    fn stop_at_broken_records() {
        let text = format!("{WATER}{BROKEN}{WATER}");
        let reader = SdfReader::new(text.as_bytes(), &*DB, ReaderConfig::default());
        assert_eq!(
            names(reader),
            [Ok("water".to_owned()), Err(CtabErrorKind::UnknownBondType { code: 9 })]
        );
    }

    #[test]
    fn errors_are_numbered_by_input_line() {
        let text = format!("{WATER}{BROKEN}");
        let error = SdfReader::new(text.as_bytes(), &*DB, ReaderConfig::default())
            .nth(1)
            .unwrap()
            .unwrap_err();
        // The bad bond is the 10th line of the second record, and the first record is 14 lines long
        assert_eq!(error.line(), 24);
        assert_eq!(error.text(), "  3  1  9  0");
    }

    #[test]
    fn v3000_records() {
        let text = format!("{V3000}{WATER}");
        let reader = SdfReader::new(text.as_bytes(), &*DB, ReaderConfig::default());
        assert_eq!(names(reader), [Err(CtabErrorKind::UnsupportedDialect)]);

        let config = ReaderConfig::default().with_skip_on_error(true);
        let reader = SdfReader::new(text.as_bytes(), &*DB, config);
        assert_eq!(names(reader), [Ok("water".to_owned())]);
    }

    #[test]
    fn stray_delimiters_and_blank_records() {
        let blank_counts = indoc! {"
            no counts

            comment

            > <IGNORED>
            text
            $$$$
        "};
        let text = format!("$$$$\n$$$$\n{blank_counts}{WATER}");
        let reader = SdfReader::new(text.as_bytes(), &*DB, ReaderConfig::default());
        assert_eq!(names(reader), [Ok("water".to_owned())]);
    }

    #[test]
    fn unterminated_records_are_dropped() {
        let text = format!("{WATER}title\n\n\n  1  0  0  0  0  0  0  0  0  0999 V2000\n");
        let reader = SdfReader::new(text.as_bytes(), &*DB, ReaderConfig::default());
        assert_eq!(names(reader).len(), 1);
    }

    #[test]
    fn custom_end_of_molecule() {
        let text = WATER.replace("M  END", "M  STOP");
        let reader = SdfReader::new(text.as_bytes(), &*DB, ReaderConfig::default());
        assert!(names(reader).is_empty());

        let reader = SdfReader::new(text.as_bytes(), &*DB, ReaderConfig::default())
            .with_end_of_molecule(|line| line.starts_with("M  STOP"));
        let records: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(records[0].molecule.atom_count(), 3);
        assert_eq!(records[0].molecule.property("NAME"), Some("water"));
    }

    struct FailingInput;

    impl Read for FailingInput {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("connection reset"))
        }
    }

    #[test]
    fn input_failures_end_iteration() {
        let input = io::BufReader::new(WATER.as_bytes().chain(FailingInput));
        let config = ReaderConfig::default().with_skip_on_error(true);
        let mut reader = SdfReader::new(input, &*DB, config);
        assert!(reader.next().unwrap().is_ok());
        let error = reader.next().unwrap().unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Stream);
        assert!(reader.next().is_none());
        assert_eq!(reader.skipped(), 0);
    }

    #[test]
    fn records_keep_their_issues() {
        let text = WATER.replace("0999 V2000", "0999");
        let mut reader = SdfReader::new(text.as_bytes(), &*DB, ReaderConfig::default());
        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.issues[0].kind(), &CtabErrorKind::UnspecifiedDialect);
        assert_eq!(record.issues[0].line(), 4);
    }
}
