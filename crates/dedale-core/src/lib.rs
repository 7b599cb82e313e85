//! **dedale-core**: shared types for maze generation and grid pathfinding.
//!
//! This crate provides the substrate both the generator and the search read:
//! geometry primitives, the walkability [`Grid`] with its [`Walkable`]
//! contract, and the [`Error`] type returned before any work begins.

pub mod error;
pub mod geom;
pub mod grid;

pub use error::{Error, Result};
pub use geom::{Point, Range};
pub use grid::{Grid, Tile, Walkable};
