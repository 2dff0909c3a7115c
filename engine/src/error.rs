//! Typed error surface for the engine crate.
//!
//! Two error enums cover the two failure modes the specification treats
//! differently: [`SolverError`] is fatal and propagated with `?`, while
//! [`RangeParseError`] is caught per-token by the range parser, logged as a
//! warning, and never aborts the overall parse.

use thiserror::Error;

/// Errors that abort an operation outright: a missing/corrupt rank table
/// file, or a malformed card/board token.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The rank table file could not be opened or read.
    #[error("could not read rank table file {path}: {source}")]
    TableLoadIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but its header magic does not match.
    #[error("rank table file {path} has bad magic {found:#010x}, expected {expected:#010x}")]
    TableLoadMagic {
        path: String,
        found: u32,
        expected: u32,
    },

    /// The file exists but its header version is not one this crate reads.
    #[error("rank table file {path} has unsupported version {found}, expected {expected}")]
    TableLoadVersion {
        path: String,
        found: i32,
        expected: i32,
    },

    /// The file's header declares a length that the file does not actually have.
    #[error("rank table file {path} is truncated: expected {expected} bytes, found {found}")]
    TableLoadTruncated {
        path: String,
        expected: usize,
        found: usize,
    },

    /// A freshly generated table failed one of its self-checks.
    #[error("rank table self-check failed: {0}")]
    TableVerification(String),

    /// A two-character card token did not parse.
    #[error("invalid card token {0:?}")]
    CardParse(String),

    /// A board string did not parse into 0, 3, 4, or 5 cards.
    #[error("invalid board string {0:?}")]
    BoardParse(String),
}

/// Errors raised for a single unparseable range token.
///
/// Per the range-parsing contract, these are never fatal: the parser logs
/// the error and skips the offending token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("unrecognized rank letter {0:?}")]
    InvalidRank(char),

    #[error("unrecognized range token {0:?}")]
    UnrecognizedToken(String),

    #[error("weight in token {token:?} out of range: {value}")]
    WeightOutOfRange { token: String, value: f64 },

    #[error("range exceeds the 1326-combo cap; token {0:?} discarded")]
    CapacityExceeded(String),
}
