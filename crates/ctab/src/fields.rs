//! Decoders for the fixed-width fields of V2000 connection tables
//!
//! Every function here reads from fixed (zero-based) columns and treats columns past the end of the line as blanks,
//! so truncated lines decode to the same values as lines padded out with spaces.

// External Crate Imports
use molgraph::{BondKind, BondStereo};

// Public API ==========================================================================================================

/// The length of `line` once trailing spaces are removed
#[must_use]
pub fn trimmed_len(line: &str) -> usize {
    line.trim_end_matches(' ').len()
}

/// The text in columns `start..end`, clipped to the line. Columns that split a multi-byte character read as empty.
#[must_use]
pub fn columns(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    let start = start.min(end);
    line.get(start..end).unwrap_or_default()
}

/// The byte at `index`, or a blank past the end of the line
#[must_use]
pub const fn byte_at(line: &[u8], index: usize) -> u8 {
    if index < line.len() { line[index] } else { b' ' }
}

/// Reads the three-column signed integer starting at `offset`. Padding may come before or after the digits, a blank
/// field reads as zero, and reading stops at the first character that can't continue the number.
#[must_use]
pub fn read_int3(line: &str, offset: usize) -> i32 {
    let line = line.as_bytes();
    let mut sign = 1;
    let mut result = 0;

    match byte_at(line, offset) {
        b' ' => (),
        b'-' => sign = -1,
        c @ b'0'..=b'9' => result = i32::from(c - b'0'),
        _ => return 0,
    }
    for c in [byte_at(line, offset + 1), byte_at(line, offset + 2)] {
        match c {
            b' ' | b'-' if result > 0 => return sign * result,
            b' ' => (),
            b'-' => sign = -1,
            b'0'..=b'9' => result = result * 10 + i32::from(c - b'0'),
            _ => return sign * result,
        }
    }
    sign * result
}

/// Reads `digits` columns starting at `offset` as an unsigned decimal, where any non-digit counts as a zero
#[must_use]
pub fn read_uint(line: &str, offset: usize, digits: usize) -> u32 {
    let line = line.as_bytes();
    (offset..offset + digits).fold(0, |result, i| {
        result.saturating_mul(10).saturating_add(digit(byte_at(line, i)))
    })
}

/// The value of an ASCII digit, or zero for anything else
#[must_use]
pub const fn digit(c: u8) -> u32 {
    if c.is_ascii_digit() { (c - b'0') as u32 } else { 0 }
}

/// A coordinate field that wasn't laid out as `xxxxx.xxxx`
#[derive(Clone, PartialEq, Debug)]
pub struct MalformedCoordinate {
    pub field: String,
    /// The value a general decimal parse found in the field, if any
    pub fallback: Option<f64>,
}

/// Reads the 10-column coordinate starting at `offset`, which should have its decimal point at column `offset + 5`
/// and four decimal places
pub fn read_coordinate(line: &str, offset: usize) -> Result<f64, MalformedCoordinate> {
    let bytes = line.as_bytes();
    let point = offset + 5;

    if byte_at(bytes, point) != b'.' {
        let field = columns(line, offset, offset + 10).trim();
        let fallback = if field.is_empty() {
            Some(0.0)
        } else {
            field.parse().ok().filter(|value: &f64| value.is_finite())
        };
        return Err(MalformedCoordinate {
            field: field.to_owned(),
            fallback,
        });
    }

    let mut start = offset;
    while start < point && byte_at(bytes, start) == b' ' {
        start += 1;
    }
    let sign = if byte_at(bytes, start) == b'-' {
        start += 1;
        -1.0
    } else {
        1.0
    };
    let integral = read_uint(line, start, point.saturating_sub(start));
    let fraction = read_uint(line, point + 1, 4);
    Ok(sign * f64::from(integral * 10_000 + fraction) / 10_000.0)
}

/// Decodes the atom-block charge code: `1`, `2` and `3` are +3, +2 and +1; `5`, `6` and `7` are -1, -2 and -3; `4`
/// (a doublet radical, superseded by `M  RAD`), `0` and blanks carry no charge. Returns `None` for any other code.
#[must_use]
pub const fn formal_charge(code: u8) -> Option<i32> {
    let charge = match code {
        b'1' => 3,
        b'2' => 2,
        b'3' => 1,
        b'5' => -1,
        b'6' => -2,
        b'7' => -3,
        b'0' | b'4' | b' ' => 0,
        _ => return None,
    };
    Some(charge)
}

#[must_use]
pub const fn bond_kind(code: i32) -> Option<BondKind> {
    let kind = match code {
        1 => BondKind::Single,
        2 => BondKind::Double,
        3 => BondKind::Triple,
        4 => BondKind::Aromatic,
        5 => BondKind::SingleOrDouble,
        6 => BondKind::SingleOrAromatic,
        7 => BondKind::DoubleOrAromatic,
        8 => BondKind::Any,
        _ => return None,
    };
    Some(kind)
}

/// Decodes the stereo code of a single (type 1) or double (type 2) bond. Returns `None` for codes that don't exist,
/// or that make no sense for that type of bond.
#[must_use]
pub const fn bond_stereo(code: u32, bond_type: i32) -> Option<BondStereo> {
    let stereo = match (code, bond_type) {
        (0, 2) => BondStereo::EZByCoordinates,
        (0, _) => BondStereo::None,
        (1, 1) => BondStereo::Up,
        (3, 2) => BondStereo::EOrZ,
        (4, 1) => BondStereo::UpOrDown,
        (6, 1) => BondStereo::Down,
        _ => return None,
    };
    Some(stereo)
}

// Module Tests ========================================================================================================
