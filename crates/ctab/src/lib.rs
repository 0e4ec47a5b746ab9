//! A streaming reader for MDL connection tables: single V2000 Molfiles and multi-record SD files
//!
//! ```
//! use ctab::{ReaderConfig, SdfReader};
//! use periodic::AtomicDatabase;
//!
//! let sdf = "methane\n\n\n  1  0  0  0  0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 C   0  0\nM  END\n$$$$\n";
//! let db = AtomicDatabase::default();
//! let records: Vec<_> = SdfReader::new(sdf.as_bytes(), &db, ReaderConfig::default()).collect();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].as_ref().unwrap().molecule.formula(), "CH4");
//! ```

mod config;
mod data_block;
mod decoder;
mod errors;
pub mod fields;
mod iterator;
mod lines;
mod molecule_block;
mod properties_block;
mod reader;
mod sgroups;
mod stereo;
#[cfg(test)]
mod testing_tools;
pub mod valence;

pub use config::{InvalidModeError, Mode, ReaderConfig};
pub use errors::{CtabError, CtabErrorKind, ErrorCategory, Result};
pub use iterator::SdfReader;
pub use reader::{Dialect, MolfileReader, Record};
