//! Reference spectrum table parser.
//!
//! Parses plain-text spectral irradiance tables such as the NREL ASTM G173
//! distribution into numeric columns.
//!
//! # Supported syntax
//!
//! ```text
//! # comment line
//! * comment line
//! Wvlgth nm  Etr W*m-2*nm-1  Global tilt  Direct+circumsolar   (header, before data only)
//! 280.0  8.2000E-02  4.7309E-23  2.5361E-26
//! 280,5;9,9000E-02;1,2307E-21;1,0917E-24                      (semicolons, decimal commas)
//! ```
//!
//! Columns may be separated by whitespace, tabs, commas or semicolons.
//! When a row uses semicolons, commas inside it are decimal separators.
//! The first column is the wavelength in nm; every further column is a
//! spectral irradiance in W/m²/nm.

use nom::branch::alt;
use nom::character::complete::{one_of, space0, space1};
use nom::combinator::value;
use nom::multi::separated_list1;
use nom::number::complete::double;
use nom::sequence::{preceded, terminated};
use nom::IResult;
use nom::Parser;

use crate::error::{PecError, Result};

/// Numeric content of a spectrum table.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumTable {
    /// Wavelengths (nm), strictly increasing.
    pub wavelengths: Vec<f64>,
    /// Irradiance columns, each the same length as `wavelengths`.
    pub columns: Vec<Vec<f64>>,
}

/// Parse a spectrum table.
pub fn parse_spectrum_table(input: &str) -> Result<SpectrumTable> {
    let mut wavelengths = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (line_num, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();

        // Skip blank lines and comments
        if line.is_empty() || line.starts_with('#') || line.starts_with('*') {
            continue;
        }

        let row = match parse_row(line) {
            Ok(row) => row,
            // Column titles precede the numbers
            Err(_) if wavelengths.is_empty() => continue,
            Err(e) => return Err(parse_err(line_num, raw_line, &e)),
        };

        if row.len() < 2 {
            return Err(parse_err(line_num, raw_line, "expected wavelength and at least one irradiance column"));
        }
        if columns.is_empty() {
            columns = vec![Vec::new(); row.len() - 1];
        } else if row.len() - 1 != columns.len() {
            return Err(parse_err(
                line_num,
                raw_line,
                &format!("expected {} columns, found {}", columns.len() + 1, row.len()),
            ));
        }

        let wavelength = row[0];
        if wavelength <= 0.0 {
            return Err(parse_err(line_num, raw_line, "wavelength must be positive"));
        }
        if let Some(&prev) = wavelengths.last() {
            if wavelength <= prev {
                return Err(parse_err(line_num, raw_line, "wavelengths must be strictly increasing"));
            }
        }
        if let Some(v) = row[1..].iter().find(|v| **v < 0.0) {
            return Err(parse_err(line_num, raw_line, &format!("negative irradiance {v}")));
        }

        wavelengths.push(wavelength);
        for (col, v) in columns.iter_mut().zip(&row[1..]) {
            col.push(*v);
        }
    }

    if wavelengths.len() < 2 {
        return Err(PecError::Data(format!(
            "spectrum table needs at least two rows, found {}",
            wavelengths.len()
        )));
    }

    Ok(SpectrumTable { wavelengths, columns })
}

fn parse_err(line_num: usize, raw_line: &str, detail: &str) -> PecError {
    PecError::Data(format!("line {}: {} in: {}", line_num + 1, detail, raw_line))
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// Parse one data row into its numeric fields.
fn parse_row(line: &str) -> std::result::Result<Vec<f64>, String> {
    let normalized: String = if line.contains(';') {
        line.chars()
            .filter(|c| *c != '"' && *c != '\'')
            .map(|c| if c == ',' { '.' } else { c })
            .collect()
    } else {
        line.chars().filter(|c| *c != '"' && *c != '\'').collect()
    };

    let (rest, fields) = row(&normalized).map_err(|e| format!("unparseable row: {e}"))?;
    if !rest.is_empty() {
        return Err(format!("unexpected trailing input '{rest}'"));
    }
    if let Some(v) = fields.iter().find(|v| !v.is_finite()) {
        return Err(format!("non-finite value {v}"));
    }
    Ok(fields)
}

fn row(input: &str) -> IResult<&str, Vec<f64>> {
    terminated(separated_list1(separator, field), space0).parse(input)
}

fn field(input: &str) -> IResult<&str, f64> {
    preceded(space0, double).parse(input)
}

/// Match a column separator: `,` or `;` with optional padding, or plain whitespace.
fn separator(input: &str) -> IResult<&str, ()> {
    alt((value((), (space0, one_of(",;"), space0)), value((), space1))).parse(input)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
