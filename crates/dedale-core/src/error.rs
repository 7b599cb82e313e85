use thiserror::Error;

use crate::geom::Point;

/// Convenient result alias for the dedale crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned before any generation or search work begins.
///
/// A search that is aborted through `cancel()` is not an error; it ends with
/// a `Cancelled` outcome instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Rejected grid or maze dimensions, malformed grid text, or a search
    /// endpoint that is out of bounds or blocked.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A search was requested while another one is still active on the same
    /// engine.
    #[error("a search is already running on this engine")]
    Busy,
}

impl Error {
    /// Build an [`Error::InvalidConfiguration`] from anything printable.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Endpoint rejected because it lies outside the grid.
    pub fn out_of_bounds(role: &str, p: Point) -> Self {
        Self::invalid(format!("{role} {p} is outside the grid"))
    }

    /// Endpoint rejected because its cell is blocked.
    pub fn blocked(role: &str, p: Point) -> Self {
        Self::invalid(format!("{role} {p} is a blocked cell"))
    }
}
