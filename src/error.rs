//! Error types shared across the simulator.

use std::fmt;
use std::path::PathBuf;

use crate::interpret::memory::MAX_MEMORY;
use crate::world::{Coord, CritterId};

/// Structural error raised while parsing program text.
///
/// A failed parse never yields a partially built program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A character that starts no token.
    UnexpectedChar {
        /// 1-based source line.
        line: usize,
        /// The offending character.
        found: char,
    },
    /// A token that does not fit the grammar at this point.
    UnexpectedToken {
        /// 1-based source line.
        line: usize,
        /// Printed form of the token found.
        found: String,
        /// What the parser was looking for.
        expected: &'static str,
    },
    /// Input ended in the middle of a rule.
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: &'static str,
    },
    /// An update whose left side is not a memory expression.
    InvalidUpdateTarget {
        /// 1-based source line.
        line: usize,
    },
    /// A numeric literal that does not fit in 32 bits.
    NumberOutOfRange {
        /// 1-based source line.
        line: usize,
        /// The literal as written.
        literal: String,
    },
    /// Expressions nested deeper than the parser follows.
    TooDeep {
        /// 1-based source line.
        line: usize,
        /// Nesting limit.
        limit: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedChar { line, found } => {
                write!(f, "line {line}: unexpected character {found:?}")
            }
            ParseError::UnexpectedToken {
                line,
                found,
                expected,
            } => write!(f, "line {line}: expected {expected}, found `{found}`"),
            ParseError::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            ParseError::InvalidUpdateTarget { line } => {
                write!(f, "line {line}: only memory can be assigned")
            }
            ParseError::NumberOutOfRange { line, literal } => {
                write!(f, "line {line}: number {literal} is out of range")
            }
            ParseError::TooDeep { line, limit } => {
                write!(f, "line {line}: nesting deeper than {limit} levels")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Result type for parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// A node index outside `[0, size)` was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexError {
    /// The requested index.
    pub index: usize,
    /// Size of the subtree that was addressed.
    pub size: usize,
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node index {} out of range for subtree of size {}",
            self.index, self.size
        )
    }
}

impl std::error::Error for IndexError {}

/// The program root was asked for its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentError;

impl fmt::Display for ParentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the program root has no parent")
    }
}

impl std::error::Error for ParentError {}

/// Errors raised while loading world, critter, or constants files.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A line that could not be understood.
    Syntax {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },
    /// The embedded critter program failed to parse.
    Program(ParseError),
    /// The requested world dimensions give no hexes or too many.
    InvalidSize {
        /// Requested columns.
        columns: i32,
        /// Requested rows.
        rows: i32,
    },
    /// A critter asked for more memory than any critter may have.
    MemoryTooLarge(i32),
    /// A JSON constants file was malformed.
    Constants(serde_json::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            LoadError::Syntax { line, message } => write!(f, "line {line}: {message}"),
            LoadError::Program(err) => write!(f, "invalid critter program: {err}"),
            LoadError::InvalidSize { columns, rows } => {
                write!(f, "{columns} columns by {rows} rows is not a valid world size")
            }
            LoadError::MemoryTooLarge(memsize) => {
                write!(f, "memsize {memsize} exceeds the limit of {MAX_MEMORY}")
            }
            LoadError::Constants(err) => write!(f, "invalid constants file: {err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Program(err) => Some(err),
            LoadError::Constants(err) => Some(err),
            LoadError::Syntax { .. }
            | LoadError::InvalidSize { .. }
            | LoadError::MemoryTooLarge(_) => None,
        }
    }
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        LoadError::Program(err)
    }
}

/// Result type for loaders.
pub type LoadResult<T> = Result<T, LoadError>;

/// Rejected world edits and control requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldError {
    /// The coordinate does not name a hex.
    OffGrid(Coord),
    /// The hex already holds a rock, food, or a critter.
    Occupied(Coord),
    /// No live critter has this id.
    UnknownCritter(CritterId),
    /// Food amounts must be positive.
    InvalidAmount(i32),
    /// Time cannot run backwards.
    NegativeSteps(i32),
    /// Manual stepping is refused while the world runs continuously.
    Running,
    /// Run rates must be finite and non-negative.
    InvalidRate(f64),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::OffGrid(coord) => write!(f, "{coord} is not a hex of this world"),
            WorldError::Occupied(coord) => write!(f, "hex {coord} is not empty"),
            WorldError::UnknownCritter(id) => write!(f, "no live critter with id {id}"),
            WorldError::InvalidAmount(amount) => write!(f, "invalid food amount {amount}"),
            WorldError::NegativeSteps(n) => write!(f, "cannot advance by {n} steps"),
            WorldError::Running => write!(f, "the world is running continuously"),
            WorldError::InvalidRate(rate) => write!(f, "invalid run rate {rate}"),
        }
    }
}

impl std::error::Error for WorldError {}

/// Result type for world edits.
pub type WorldResult<T> = Result<T, WorldError>;
