//! The header, counts line, atom block and bond block of a V2000 record

// Standard Library Imports
use std::io;

// External Crate Imports
use molgraph::{Atom, AtomIndex, Bond, Mass, Parity, Position};
use periodic::{AtomicNumber, IsotopeTable, MassNumber};
use static_assertions::const_assert;

// Local Crate Imports
use crate::{
    decoder::{RecordDecoder, checked_index},
    errors::{CtabErrorKind, Result},
    fields::{
        bond_kind, bond_stereo, byte_at, columns, digit, formal_charge, read_int3, read_uint, trimmed_len,
    },
    reader::Dialect,
};

/// What the header and connection table of a record turned out to hold
#[derive(Debug)]
pub(crate) enum MoleculeBlock {
    /// The input ended before a record started, or the record was abandoned at a blank counts line
    Exhausted,
    /// The record delimiter stood where the title line should be
    Empty,
    Read(BlockSummary),
}

#[derive(Debug)]
pub(crate) struct BlockSummary {
    pub(crate) dialect: Dialect,
    /// The sum of bond orders around each atom of the record, or `None` once an aromatic or query bond is involved
    pub(crate) explicit_valence: Vec<Option<u32>>,
    pub(crate) has_query_bonds: bool,
    pub(crate) has_coordinates: bool,
}

// NOTE: Atom lines carry at most 69 meaningful columns and bond lines 21
const MAX_ATOM_LINE: usize = 69;
const MAX_BOND_LINE: usize = 21;
const MIN_ATOM_LINE: usize = 32;
const MIN_BOND_LINE: usize = 9;
const BOND_STEREO_COLUMN: usize = 12;

// NOTE: The minimum line lengths of the optional atom fields, widest first: mapping, valence, parity, charge, mass
// difference. Each is only read when the line reaches it, so truncated lines keep their defaults.
const OPTIONAL_FIELD_WIDTHS: [usize; 5] = [63, 51, 42, 39, 36];
const_assert!(is_descending(&OPTIONAL_FIELD_WIDTHS));

type FieldDecoder<D> = fn(&mut D, &str, &mut Atom) -> Result<()>;

const PSEUDO_LABELS: [&str; 7] = ["*", "A", "Q", "L", "LP", "R", "R#"];

impl<I, T> RecordDecoder<'_, I, T>
where
    I: Iterator<Item = io::Result<String>>,
    T: IsotopeTable,
{
    const OPTIONAL_ATOM_FIELDS: [FieldDecoder<Self>; 5] = [
        Self::read_mapping,
        Self::read_valence,
        Self::read_parity,
        Self::read_charge,
        Self::read_mass_difference,
    ];

    pub(crate) fn read_molecule_block(&mut self) -> Result<MoleculeBlock> {
        let Some(title) = self.lines.next_line()? else {
            return Ok(MoleculeBlock::Exhausted);
        };
        if title.starts_with("$$$$") {
            return Ok(MoleculeBlock::Empty);
        }
        let program = self.lines.expect_line("the program line")?;
        let remark = self.lines.expect_line("the comment line")?;
        let counts = self.lines.expect_line("the counts line")?;

        if counts.trim().is_empty() {
            self.tolerate(&counts, 0..0, CtabErrorKind::BlankCountsLine)?;
            while let Some(line) = self.lines.next_line()? {
                if line.starts_with("$$$$") {
                    break;
                }
            }
            return Ok(MoleculeBlock::Exhausted);
        }

        let dialect = Dialect::of_counts_line(&counts);
        match dialect {
            Dialect::V3000 => return Err(self.fail(&counts, 33..39, CtabErrorKind::UnsupportedDialect)),
            Dialect::Unspecified => self.tolerate(&counts, 33..39, CtabErrorKind::UnspecifiedDialect)?,
            Dialect::V2000 => (),
        }

        self.molecule.title = Some(title).filter(|t| !t.is_empty());
        self.molecule.remark = Some(remark).filter(|r| !r.is_empty());
        let is_3d = is_3d_program(&program);
        self.molecule.program = Some(program).filter(|p| !p.is_empty());

        self.atom_count = usize::try_from(read_int3(&counts, 0)).unwrap_or_default();
        self.bond_count = usize::try_from(read_int3(&counts, 3)).unwrap_or_default();

        let atoms = self.read_atom_block(is_3d)?;
        let has_coordinates = atoms.iter().any(|atom| atom.position.is_set());
        for atom in atoms {
            self.molecule.add_atom(atom);
        }

        let mut explicit_valence = vec![Some(0); self.atom_count];
        let mut has_query_bonds = false;
        for _ in 0..self.bond_count {
            let line = self.lines.expect_line("the bond block")?;
            let bond = self.read_bond(&line)?;
            has_query_bonds |= bond.kind.is_query();

            let ends = [bond.begin, bond.end].map(|atom| atom.get() - self.atom_offset);
            for end in ends {
                explicit_valence[end] = explicit_valence[end].zip(bond.order()).map(|(sum, order)| sum + order);
            }
            if bond.is_aromatic() {
                for atom in [bond.begin, bond.end] {
                    self.atom_mut(&line, atom)?.aromatic = true;
                }
            }

            self.molecule
                .add_bond(bond)
                .map_err(|e| Box::new(self.lines.error(&line, e.into()).at(0..6)))?;
        }

        Ok(MoleculeBlock::Read(BlockSummary {
            dialect,
            explicit_valence,
            has_query_bonds,
            has_coordinates,
        }))
    }

    fn read_atom_block(&mut self, is_3d: bool) -> Result<Vec<Atom>> {
        let mut atoms = Vec::with_capacity(self.atom_count);
        let (mut has_x, mut has_y, mut has_z) = (false, false, false);
        for _ in 0..self.atom_count {
            let line = self.lines.expect_line("the atom block")?;
            let atom = self.read_atom(&line)?;
            if let Position::ThreeD { x, y, z } = atom.position {
                has_x |= x != 0.0;
                has_y |= y != 0.0;
                has_z |= z != 0.0;
            }
            atoms.push(atom);
        }

        if !has_x && !has_y && !has_z {
            // A lone atom is placed at the origin; anything bigger is treated as having no layout at all
            let position = if atoms.len() == 1 {
                Position::TwoD { x: 0.0, y: 0.0 }
            } else {
                Position::Unset
            };
            for atom in &mut atoms {
                atom.position = position;
            }
        } else if !has_z && !is_3d && !self.config.force_3d {
            for atom in &mut atoms {
                atom.position = atom.position.flattened();
            }
        }

        Ok(atoms)
    }

    fn read_atom(&mut self, line: &str) -> Result<Atom> {
        let length = trimmed_len(line).min(MAX_ATOM_LINE);
        if length < MIN_ATOM_LINE {
            return Err(self.fail(line, length..length, CtabErrorKind::AtomLineTooShort { length }));
        }

        let x = self.coordinate(line, 0)?;
        let y = self.coordinate(line, 10)?;
        let z = self.coordinate(line, 20)?;
        let symbol = columns(line, 31, 34).trim();

        let mut atom = self.create_atom(line, symbol)?;
        atom.position = Position::ThreeD { x, y, z };

        for (width, decode) in OPTIONAL_FIELD_WIDTHS.into_iter().zip(Self::OPTIONAL_ATOM_FIELDS) {
            if length >= width {
                decode(self, line, &mut atom)?;
            }
        }

        Ok(atom)
    }

    fn create_atom(&mut self, line: &str, symbol: &str) -> Result<Atom> {
        if let Some(element) = self.table.element(symbol) {
            return Ok(Atom::from_element(element));
        }

        if matches!(symbol, "D" | "T") && self.config.interpret_hydrogen_isotopes {
            if self.diagnostics.is_strict() {
                let kind = CtabErrorKind::HydrogenIsotopeSymbol {
                    symbol: symbol.to_owned(),
                };
                return Err(self.fail(line, 31..34, kind));
            }
            if let Some(hydrogen) = self.table.element("H") {
                let mass_number = if symbol == "D" { 2 } else { 3 };
                let mut atom = Atom::from_element(hydrogen);
                atom.mass = Mass::Isotope(MassNumber::from(mass_number));
                return Ok(atom);
            }
        }

        if !is_pseudo_label(symbol) {
            let kind = CtabErrorKind::InvalidSymbol {
                symbol: symbol.to_owned(),
            };
            self.tolerate(line, 31..34, kind)?;
        }
        let label = if symbol == "R#" { "R" } else { symbol };
        Ok(Atom::pseudo(label))
    }

    fn read_bond(&mut self, line: &str) -> Result<Bond> {
        let length = trimmed_len(line).min(MAX_BOND_LINE);
        if length < MIN_BOND_LINE {
            return Err(self.fail(line, length..length, CtabErrorKind::BondLineTooShort { length }));
        }

        let [begin, end] = [0, 3].map(|column| {
            let number = read_int3(line, column);
            checked_index(number, self.atom_count)
                .map(|index| AtomIndex::new(self.atom_offset + index))
                .ok_or_else(|| {
                    let kind = CtabErrorKind::AtomOutOfRange {
                        index: number.into(),
                        count: self.atom_count,
                    };
                    self.fail(line, column..column + 3, kind)
                })
        });
        let (begin, end) = (begin?, end?);

        let code = read_int3(line, 6);
        let kind = bond_kind(code).ok_or_else(|| self.fail(line, 6..9, CtabErrorKind::UnknownBondType { code }))?;
        let mut bond = Bond::new(begin, end, kind);

        if matches!(code, 1 | 2) {
            let stereo = if length >= BOND_STEREO_COLUMN { read_uint(line, 9, 3) } else { 0 };
            match bond_stereo(stereo, code) {
                Some(stereo) => bond.stereo = stereo,
                None => {
                    let kind = CtabErrorKind::InvalidBondStereo {
                        code: stereo,
                        bond_type: code,
                    };
                    self.tolerate(line, 9..12, kind)?;
                }
            }
        }

        Ok(bond)
    }

    // Optional Atom Fields ============================================================================================

    fn read_mapping(&mut self, line: &str, atom: &mut Atom) -> Result<()> {
        atom.mapping = u32::try_from(read_int3(line, 60)).ok().filter(|&m| m != 0);
        Ok(())
    }

    fn read_valence(&mut self, line: &str, atom: &mut Atom) -> Result<()> {
        let valence = read_int3(line, 48);
        if 0 < valence && valence < 16 {
            // NOTE: A valence of 15 is how zero is written
            atom.valency = Some(if valence == 15 { 0 } else { valence.unsigned_abs() });
        }
        Ok(())
    }

    fn read_parity(&mut self, line: &str, atom: &mut Atom) -> Result<()> {
        let code = digit(byte_at(line.as_bytes(), 41));
        match u8::try_from(code).ok().and_then(Parity::from_code) {
            Some(parity) => atom.parity = parity,
            None => self.tolerate(line, 41..42, CtabErrorKind::InvalidParity { code })?,
        }
        Ok(())
    }

    fn read_charge(&mut self, line: &str, atom: &mut Atom) -> Result<()> {
        let code = byte_at(line.as_bytes(), 38);
        match formal_charge(code) {
            Some(charge) => atom.formal_charge = charge,
            None => {
                let kind = CtabErrorKind::InvalidChargeCode { code: char::from(code) };
                self.tolerate(line, 38..39, kind)?;
            }
        }
        Ok(())
    }

    fn read_mass_difference(&mut self, line: &str, atom: &mut Atom) -> Result<()> {
        let bytes = line.as_bytes();
        let sign = if byte_at(bytes, 34) == b'-' { -1 } else { 1 };
        let difference = sign * i64::from(digit(byte_at(bytes, 35)));
        if difference == 0 || atom.is_pseudo() {
            return Ok(());
        }

        // NOTE: Elements without a major isotope are revisited once `M  ISO` lines have had a chance to fix them
        let number = AtomicNumber::from(atom.atomic_number());
        atom.mass = self
            .table
            .major_isotope(number)
            .and_then(|major| u32::try_from(i64::from(u32::from(major.mass_number())) + difference).ok())
            .map_or(Mass::Unresolved, |mass_number| Mass::Isotope(MassNumber::from(mass_number)));
        Ok(())
    }
}

// Private Helper Methods ==============================================================================================

const fn is_descending(widths: &[usize]) -> bool {
    let mut i = 1;
    while i < widths.len() {
        if widths[i - 1] <= widths[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Programs mark 3D output with `3D` in columns 21 and 22 of the program line
fn is_3d_program(program: &str) -> bool {
    program.len() >= 22 && program.get(20..22) == Some("3D")
}

fn is_pseudo_label(symbol: &str) -> bool {
    PSEUDO_LABELS.contains(&symbol)
        || symbol
            .strip_prefix('R')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use molgraph::{AtomIndex, AtomKind, BondKind, BondStereo, Mass, Parity, Position};
    use once_cell::sync::Lazy;
    use periodic::{AtomicDatabase, MassNumber};

    use super::{is_3d_program, is_descending, is_pseudo_label};
    use crate::{
        config::ReaderConfig,
        decoder::RecordDecoder,
        errors::{CtabErrorKind, ErrorCategory},
        lines::{LineReader, str_lines},
        molecule_block::MoleculeBlock,
        reader::{Dialect, MolfileReader},
        testing_tools::assert_miette_snapshot,
    };

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);

    const ETHANOL: &str = indoc! {"
        ethanol
          -ISIS-  10192612002D

          3  2  0  0  0  0  0  0  0  0999 V2000
            0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
            1.2990    0.7500    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
            2.5981    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
          1  2  1  0
          2  3  1  0
        M  END
    "};

    fn read_block(text: &str, config: ReaderConfig) -> crate::Result<(MoleculeBlock, molgraph::Molecule)> {
        let mut lines = LineReader::new(str_lines(text));
        let mut decoder = RecordDecoder::new(&mut lines, &*DB, config, molgraph::Molecule::new());
        let block = decoder.read_molecule_block()?;
        Ok((block, decoder.molecule))
    }

    fn relaxed(text: &str) -> molgraph::Molecule {
        MolfileReader::new(&*DB, ReaderConfig::default())
            .read_str(text)
            .unwrap()
            .unwrap()
            .molecule
    }

    fn atom_line(symbol: &str, tail: &str) -> String {
        format!("    1.0000    2.0000    0.0000 {symbol:<3}{tail}")
    }

    fn single_atom(line: &str) -> String {
        format!("\n  test\n\n  1  0  0  0  0  0  0  0  0  0999 V2000\n{line}\nM  END\n")
    }

    #[test]
    fn header_and_counts() {
        let (block, molecule) = read_block(ETHANOL, ReaderConfig::default()).unwrap();
        let MoleculeBlock::Read(summary) = block else {
            panic!("expected a connection table");
        };
        assert_eq!(summary.dialect, Dialect::V2000);
        assert_eq!(molecule.title.as_deref(), Some("ethanol"));
        assert_eq!(molecule.program.as_deref(), Some("  -ISIS-  10192612002D"));
        assert_eq!(molecule.remark, None);
        assert_eq!(molecule.atom_count(), 3);
        assert_eq!(molecule.bond_count(), 2);
        assert_eq!(summary.explicit_valence, [Some(1), Some(2), Some(1)]);
        assert!(summary.has_coordinates && !summary.has_query_bonds);
        assert_eq!(molecule.formula(), "C2O");
    }

    #[test]
    fn empty_and_exhausted_input() {
        let (block, _) = read_block("", ReaderConfig::default()).unwrap();
        assert!(matches!(block, MoleculeBlock::Exhausted));
        let (block, _) = read_block("$$$$\n", ReaderConfig::default()).unwrap();
        assert!(matches!(block, MoleculeBlock::Empty));

        let error = read_block("title\n  program\n", ReaderConfig::default()).unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Stream);
        assert_eq!(error.line(), 3);
    }

    #[test]
    fn blank_counts_lines() {
        let text = "title\nprogram\nremark\n   \nleft over\n$$$$\nnext\n";
        let mut lines = LineReader::new(str_lines(text));
        let decoder = RecordDecoder::new(&mut lines, &*DB, ReaderConfig::default(), molgraph::Molecule::new());
        assert!(decoder.decode().unwrap().is_none());
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("next"));

        let error = read_block(text, ReaderConfig::strict()).unwrap_err();
        assert_eq!(error.kind(), &CtabErrorKind::BlankCountsLine);
        assert_eq!(error.line(), 4);
    }

    #[test]
    fn v3000_is_always_rejected() {
        let text = "title\n\n\n  0  0  0     0  0            999 V3000\nM  V30 BEGIN CTAB\n";
        for config in [ReaderConfig::default(), ReaderConfig::strict()] {
            let res = read_block(text, config);
            assert_miette_snapshot!(res, @r#"
            [ctab::format] line 4: V3000 connection tables cannot be read by the V2000 decoder
              version: " V3000"
              help: only the fixed-column V2000 dialect is supported
            "#);
        }
    }

    #[test]
    fn unspecified_dialect() {
        let text = ETHANOL.replace("0999 V2000", "0999");
        let reader = MolfileReader::new(&*DB, ReaderConfig::default());
        let record = reader.read_str(&text).unwrap().unwrap();
        assert_eq!(record.dialect, Dialect::Unspecified);
        assert_eq!(record.issues.len(), 1);
        assert_eq!(record.issues[0].kind(), &CtabErrorKind::UnspecifiedDialect);

        let error = read_block(&text, ReaderConfig::strict()).unwrap_err();
        assert_eq!(error.kind(), &CtabErrorKind::UnspecifiedDialect);
    }

    #[test]
    fn coordinate_modes() {
        // Ethanol's z-coordinates are all zero
        let molecule = relaxed(ETHANOL);
        let position = molecule.atom(AtomIndex::new(1)).unwrap().position;
        assert_eq!(position, Position::TwoD { x: 1.299, y: 0.75 });

        // Unless the caller asks for 3D
        let reader = MolfileReader::new(&*DB, ReaderConfig::default().with_force_3d(true));
        let molecule = reader.read_str(ETHANOL).unwrap().unwrap().molecule;
        let position = molecule.atom(AtomIndex::new(1)).unwrap().position;
        assert_eq!(position, Position::ThreeD { x: 1.299, y: 0.75, z: 0.0 });

        // Or the program line says the file is 3D
        let molecule = relaxed(&ETHANOL.replace("02D", "03D"));
        assert!(matches!(molecule.atom(AtomIndex::new(0)).unwrap().position, Position::ThreeD { .. }));

        // Any non-zero z makes the record 3D
        let molecule = relaxed(&ETHANOL.replace("0.7500    0.0000", "0.7500    0.1000"));
        assert!(matches!(molecule.atom(AtomIndex::new(2)).unwrap().position, Position::ThreeD { .. }));
    }

    #[test]
    fn records_without_layout() {
        let zeroed = ETHANOL
            .replace("1.2990    0.7500", "0.0000    0.0000")
            .replace("2.5981", "0.0000");
        let molecule = relaxed(&zeroed);
        assert!(molecule.atoms().all(|(_, atom)| atom.position == Position::Unset));

        let molecule = relaxed(&single_atom(&atom_line("C", "").replace("1.0000    2.0000", "0.0000    0.0000")));
        let position = molecule.atom(AtomIndex::new(0)).unwrap().position;
        assert_eq!(position, Position::TwoD { x: 0.0, y: 0.0 });
    }

    #[test]
    fn optional_atom_fields() {
        let line = atom_line("N", " 0  3  1  0  0  4  0  0  0  7  0  0");
        let molecule = relaxed(&single_atom(&line));
        let atom = molecule.atom(AtomIndex::new(0)).unwrap();
        assert_eq!(atom.formal_charge, 1);
        assert_eq!(atom.parity, Parity::Odd);
        assert_eq!(atom.valency, Some(4));
        assert_eq!(atom.mapping, Some(7));

        // A valence of 15 means zero
        let line = atom_line("C", " 0  0  0  0  0 15");
        let molecule = relaxed(&single_atom(&line));
        assert_eq!(molecule.atom(AtomIndex::new(0)).unwrap().valency, Some(0));

        // Truncated lines keep their defaults
        let line = atom_line("C", " 0  5");
        let molecule = relaxed(&single_atom(&line));
        let atom = molecule.atom(AtomIndex::new(0)).unwrap();
        assert_eq!(atom.formal_charge, -1);
        assert_eq!(atom.parity, Parity::None);
        assert_eq!(atom.mapping, None);
    }

    #[test]
    fn mass_differences() {
        let molecule = relaxed(&single_atom(&atom_line("C", " 1  0")));
        let atom = molecule.atom(AtomIndex::new(0)).unwrap();
        assert_eq!(atom.mass, Mass::Isotope(MassNumber::from(13)));

        let molecule = relaxed(&single_atom(&atom_line("Cl", "-2  0")));
        let atom = molecule.atom(AtomIndex::new(0)).unwrap();
        assert_eq!(atom.mass, Mass::Isotope(MassNumber::from(33)));

        // Technetium has no natural isotopes to be relative to
        let reader = MolfileReader::new(&*DB, ReaderConfig::default());
        let record = reader.read_str(&single_atom(&atom_line("Tc", " 1  0"))).unwrap().unwrap();
        let atom = record.molecule.atom(AtomIndex::new(0)).unwrap();
        assert_eq!(atom.mass, Mass::Natural);
        assert_eq!(
            record.issues[0].kind(),
            &CtabErrorKind::UnstableMassDelta {
                symbol: "Tc".to_owned()
            }
        );
    }

    #[test]
    fn pseudo_atoms_and_isotope_symbols() {
        let molecule = relaxed(&single_atom(&atom_line("R#", "")));
        let atom = molecule.atom(AtomIndex::new(0)).unwrap();
        assert_eq!(
            atom.kind,
            AtomKind::Pseudo {
                label: "R".to_owned()
            }
        );

        let molecule = relaxed(&single_atom(&atom_line("D", "")));
        let atom = molecule.atom(AtomIndex::new(0)).unwrap();
        assert!(atom.is_hydrogen());
        assert_eq!(atom.mass, Mass::Isotope(MassNumber::from(2)));

        let reader = MolfileReader::new(&*DB, ReaderConfig::strict());
        let res = reader.read_str(&single_atom(&atom_line("T", "")));
        assert_miette_snapshot!(res, @r#"
        [ctab::format] line 5: "T" is not an element symbol
          symbol: "T  "
          help: relaxed mode reads D and T as hydrogen isotopes
        "#);

        let reader = MolfileReader::new(&*DB, ReaderConfig::default().with_interpret_hydrogen_isotopes(false));
        let record = reader.read_str(&single_atom(&atom_line("D", ""))).unwrap().unwrap();
        assert!(record.molecule.atom(AtomIndex::new(0)).unwrap().is_pseudo());
        assert_eq!(
            record.issues[0].kind(),
            &CtabErrorKind::InvalidSymbol {
                symbol: "D".to_owned()
            }
        );
    }

    #[test]
    fn invalid_symbols() {
        let text = single_atom(&atom_line("Xx", ""));
        let molecule = relaxed(&text);
        assert_eq!(molecule.atom(AtomIndex::new(0)).unwrap().symbol(), "Xx");

        let reader = MolfileReader::new(&*DB, ReaderConfig::strict());
        let error = reader.read_str(&text).unwrap_err();
        assert_eq!(error.line(), 5);
        assert_eq!(
            error.kind(),
            &CtabErrorKind::InvalidSymbol {
                symbol: "Xx".to_owned()
            }
        );
    }

    #[test]
    fn short_lines() {
        let text = single_atom("    1.0000    2.0000    0.0000");
        let reader = MolfileReader::new(&*DB, ReaderConfig::default());
        let error = reader.read_str(&text).unwrap_err();
        assert_eq!(error.kind(), &CtabErrorKind::AtomLineTooShort { length: 30 });

        let text = ETHANOL.replace("  2  3  1  0", "  2  3");
        let error = reader.read_str(&text).unwrap_err();
        assert_eq!(error.kind(), &CtabErrorKind::BondLineTooShort { length: 6 });
        assert_eq!(error.line(), 9);
    }

    #[test]
    fn explicit_valence_accumulation() {
        for (code, expected) in [("1", Some(1)), ("2", Some(2)), ("3", Some(3))] {
            let text = ETHANOL.replace("  1  2  1  0", &format!("  1  2  {code}  0"));
            let (MoleculeBlock::Read(summary), _) = read_block(&text, ReaderConfig::default()).unwrap() else {
                panic!("expected a connection table");
            };
            assert_eq!(summary.explicit_valence[0], expected);
            assert_eq!(summary.explicit_valence[1], expected.map(|order| order + 1));
        }
        for code in 4..=8 {
            let text = ETHANOL.replace("  1  2  1  0", &format!("  1  2  {code}  0"));
            let (MoleculeBlock::Read(summary), _) = read_block(&text, ReaderConfig::default()).unwrap() else {
                panic!("expected a connection table");
            };
            assert_eq!(summary.explicit_valence[..2], [None, None]);
            assert_eq!(summary.explicit_valence[2], Some(1));
            assert_eq!(summary.has_query_bonds, code > 4);
        }
    }

    #[test]
    fn aromatic_bonds() {
        let molecule = relaxed(&ETHANOL.replace("  1  2  1  0", "  1  2  4  0"));
        let bond = molecule.bonds().next().unwrap().1;
        assert_eq!(bond.kind, BondKind::Aromatic);
        assert!(bond.is_aromatic());
        assert_eq!(bond.order(), None);
        assert!(molecule.atom(AtomIndex::new(0)).unwrap().aromatic);
        assert!(molecule.atom(AtomIndex::new(1)).unwrap().aromatic);
        assert!(!molecule.atom(AtomIndex::new(2)).unwrap().aromatic);
    }

    #[test]
    fn bond_stereo() {
        let molecule = relaxed(&ETHANOL.replace("  1  2  1  0", "  1  2  1  6"));
        assert_eq!(molecule.bonds().next().unwrap().1.stereo, BondStereo::Down);
        let molecule = relaxed(&ETHANOL.replace("  1  2  1  0", "  1  2  2  0"));
        assert_eq!(molecule.bonds().next().unwrap().1.stereo, BondStereo::EZByCoordinates);

        let text = ETHANOL.replace("  1  2  1  0", "  1  2  2  1");
        let reader = MolfileReader::new(&*DB, ReaderConfig::default());
        let record = reader.read_str(&text).unwrap().unwrap();
        assert_eq!(record.molecule.bonds().next().unwrap().1.stereo, BondStereo::None);
        assert_eq!(
            record.issues[0].kind(),
            &CtabErrorKind::InvalidBondStereo {
                code: 1,
                bond_type: 2
            }
        );
        let reader = MolfileReader::new(&*DB, ReaderConfig::strict());
        assert!(reader.read_str(&text).is_err());
    }

    #[test]
    fn fatal_bond_problems() {
        let reader = MolfileReader::new(&*DB, ReaderConfig::default());

        let error = reader.read_str(&ETHANOL.replace("  1  2  1  0", "  1  2  9  0")).unwrap_err();
        assert_eq!(error.kind(), &CtabErrorKind::UnknownBondType { code: 9 });

        let res = reader.read_str(&ETHANOL.replace("  1  2  1  0", "  1  4  1  0"));
        assert_miette_snapshot!(res, @r#"
        [ctab::referential] line 8: atom 4 is outside the atom block, which has atoms 1 to 3
          atom: "  4"
        "#);

        let error = reader.read_str(&ETHANOL.replace("  1  2  1  0", "  2  2  1  0")).unwrap_err();
        assert_eq!(error.line(), 8);
        assert!(matches!(error.kind(), CtabErrorKind::Graph(_)));
    }

    #[test]
    fn helpers() {
        assert!(is_descending(&[3, 2, 1]));
        assert!(!is_descending(&[3, 3, 1]));
        assert!(is_3d_program("  -OEChem-01012600003D"));
        assert!(is_3d_program("  Mrv1810 02242006363D          "));
        assert!(!is_3d_program("  Mrv1810 02242006362D"));
        assert!(!is_3d_program("3D"));
        for label in ["*", "A", "Q", "L", "LP", "R", "R#", "R1", "R12"] {
            assert!(is_pseudo_label(label), "{label}");
        }
        for label in ["", "X", "Rx", "R1a", "LPQ"] {
            assert!(!is_pseudo_label(label), "{label}");
        }
    }
}
