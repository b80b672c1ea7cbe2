use std::io;
use std::path::PathBuf;

pub type Result<T, E = EmulatorError> = std::result::Result<T, E>;

/// Everything that can stop an emulation run.
///
/// Out-of-vocabulary words and ranks beyond the emulated vocabulary are not
/// errors; they are handled by [`crate::SubstitutionPolicy`].
#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    /// A base vocabulary record ended before one of its numeric columns.
    #[error("missing {field} field in base vocabulary line {line_no}: {record:?}")]
    MissingField {
        line_no: usize,
        field: &'static str,
        record: String,
    },

    /// A numeric column was followed by something other than a tab or line end.
    #[error("unexpected byte 0x{byte:02x} in {field} field of base vocabulary line {line_no}: {record:?}")]
    UnexpectedByte {
        line_no: usize,
        field: &'static str,
        byte: u8,
        record: String,
    },

    /// A numeric column was empty, overflowed, or held a zero rank.
    #[error("invalid {field} value in base vocabulary line {line_no}: {record:?}")]
    InvalidNumber {
        line_no: usize,
        field: &'static str,
        record: String,
    },

    #[error("vocabulary file {0} contains no entries")]
    EmptyVocabulary(PathBuf),

    #[error("required input file {0} does not exist")]
    MissingInput(PathBuf),

    /// Adjacent base vocabulary lines violate the word ordering.
    #[error("base vocabulary is out of order at line {line_no}: {previous:?} sorts after {next:?}")]
    OutOfOrder {
        line_no: usize,
        previous: String,
        next: String,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
