use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::solving::linear_program::LinearProgram;

/// Writes `program` in the LP text format understood by [`crate::parsing::parser::parse`].
///
/// Fails with [`io::ErrorKind::InvalidInput`] before writing anything if a
/// coefficient, rhs or cost is NaN or infinite.
pub fn write_lp<W: Write>(program: &LinearProgram, out: &mut W) -> io::Result<()> {
    let mut values = program
        .coefficients()
        .iter()
        .flatten()
        .chain(program.rhs())
        .chain(program.costs());
    if let Some(value) = values.find(|v| !v.is_finite()) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} cannot be written in an LP file", value),
        ));
    }

    writeln!(out, "{}", program.direction())?;
    writeln!(out, "{},{}", program.rows(), program.cols())?;

    let labels: Vec<String> = (0..program.cols())
        .map(|col| quoted(program.col_label(col).ok().flatten()))
        .collect();
    writeln!(out, "{}", labels.join(","))?;

    for row in 0..program.rows() {
        write!(out, "{}", quoted(program.row_label(row).ok().flatten()))?;
        for value in &program.coefficients()[row] {
            write!(out, ",{}", value)?;
        }
        writeln!(out, ",{},{}", program.relations()[row], program.rhs()[row])?;
    }

    write!(out, "{}", quoted(program.objective_label()))?;
    for value in program.costs() {
        write!(out, ",{}", value)?;
    }
    writeln!(out)
}

pub fn write_file(program: &LinearProgram, path: impl AsRef<Path>) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_lp(program, &mut out)?;
    out.flush()
}

pub fn to_lp_string(program: &LinearProgram) -> io::Result<String> {
    let mut buffer = Vec::new();
    write_lp(program, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

// labels cannot contain a quote in the file format
fn quoted(label: Option<&str>) -> String {
    format!("\"{}\"", label.unwrap_or("").replace('"', "'"))
}
