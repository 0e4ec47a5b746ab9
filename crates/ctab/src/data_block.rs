//! The `> <NAME>` data fields that follow a connection table in an SD file

// Standard Library Imports
use std::io;

// External Crate Imports
use log::debug;
use molgraph::Molecule;
use nom::{
    IResult,
    bytes::complete::{tag, take_until},
    character::complete::char,
    sequence::{delimited, preceded},
};

// Local Crate Imports
use crate::{errors::Result, lines::LineReader};

/// The record delimiter of an SD file
pub(crate) const DELIMITER: &str = "$$$$";

// NOTE: Values exactly this wide once trimmed are assumed to have been wrapped, and are joined to the next line without
// a newline
const WRAP_WIDTH: usize = 80;

/// Reads data fields up to (and including) the record delimiter, storing each as a property of the molecule. Text
/// before the first field header is discarded.
pub(crate) fn read_data_block<I>(lines: &mut LineReader<I>, molecule: &mut Molecule) -> Result<()>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut field: Option<(String, String)> = None;
    while let Some(line) = lines.next_line()? {
        if line.starts_with(DELIMITER) {
            break;
        }

        if let Ok((_, name)) = data_header(&line) {
            flush(molecule, field.take());
            field = Some((name.to_owned(), String::new()));
            continue;
        }

        let Some((_, data)) = &mut field else {
            continue;
        };
        // A lone space is a value in its own right, everything else is trimmed
        let text = if line == " " && data.is_empty() { " " } else { line.trim() };
        if text.is_empty() {
            continue;
        }
        data.push_str(text);
        if text.chars().count() != WRAP_WIDTH {
            data.push('\n');
        }
    }
    flush(molecule, field);
    Ok(())
}

/// Data Header = ">" , { any } , "<" , name , ">" , { any } ;
fn data_header(i: &str) -> IResult<&str, &str> {
    preceded(
        preceded(char('>'), take_until("<")),
        delimited(tag("<"), take_until(">"), tag(">")),
    )(i)
}

fn flush(molecule: &mut Molecule, field: Option<(String, String)>) {
    if let Some((name, mut data)) = field {
        if data.ends_with('\n') {
            data.pop();
        }
        debug!("read data field <{name}>");
        molecule.set_property(name, data);
    }
}

// Module Tests ========================================================================================================
