use thiserror::Error;

#[derive(Error, Debug)]
pub enum LpError {
    #[error("invalid dimensions: {rows} rows by {cols} columns, both must be positive")]
    InvalidDimensions { rows: i64, cols: i64 },

    #[error("{what} has length {found}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("malformed input on line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    #[error("{axis} index {index} is out of range for length {len}")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("pivot limit of {0} iterations exceeded")]
    IterationLimitExceeded(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type LpResult<T> = Result<T, LpError>;

pub(crate) fn check_index(axis: &'static str, index: usize, len: usize) -> LpResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(LpError::IndexOutOfRange { axis, index, len })
    }
}

pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> LpResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(LpError::ShapeMismatch {
            what,
            expected,
            found,
        })
    }
}
