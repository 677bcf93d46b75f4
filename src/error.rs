//! Error taxonomy: parse errors, halting conditions, and contract
//! violations share one enum so script drivers match on a single type.

use std::fmt;

use glam::IVec2;
use thiserror::Error;

/// Convenience alias for results carrying this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The resource pools a turtle draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    /// Spent by every operation, moves and paints alike.
    Battery,
    /// Spent by moves only.
    Fuel,
    /// Spent by painting cells.
    Paint,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Battery => "battery",
            Self::Fuel => "fuel",
            Self::Paint => "paint",
        };
        f.write_str(name)
    }
}

/// Anything that can cut a script run short.
///
/// Parse errors abort the offending line and, through the run drivers, the
/// rest of the script. Halting conditions freeze the turtle where it
/// stands; its state stays inspectable afterwards.
#[derive(Debug, Error)]
pub enum Error {
    /// A line matching no rule of the grammar.
    #[error("unknown line: {line:?}")]
    UnknownLine {
        /// The offending line, trimmed.
        line: String,
    },

    /// An `end` with no open `N times` block to close.
    #[error("\"end\" without a matching \"N times\"")]
    UnmatchedEnd,

    /// A resource pool hit zero while an operation needed it.
    #[error("out of {0}")]
    Exhausted(Resource),

    /// A movement vector that is neither zero nor a unit axis step. Points
    /// at a driver bug; the turtle state is left untouched.
    #[error("invalid step vector {0}")]
    InvalidStep(IVec2),

    /// Reading script lines from a stream failed.
    #[error("script read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this is a halting condition, i.e. a resource ran out.
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    /// Whether this is a grammar-level failure.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::UnknownLine { .. } | Self::UnmatchedEnd)
    }

    /// The resource that ran out, for halting conditions.
    pub fn halted_resource(&self) -> Option<Resource> {
        match self {
            Self::Exhausted(resource) => Some(*resource),
            _ => None,
        }
    }
}
