//! A walkability grid for maze representation.
//!
//! [`Tile`] is the two-valued cell type shared by the generator and the
//! search. [`Grid`] owns a row-major buffer of tiles; any other producer can
//! feed the search by implementing [`Walkable`].

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::geom::{Point, Range};

/// A single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tile {
    Walkable,
    #[default]
    Blocked,
}

impl Tile {
    /// Whether the search may step onto this tile.
    #[inline]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Tile::Walkable)
    }

    /// ASCII glyph used by [`Grid::parse`] and the `Display` impl.
    pub const fn glyph(self) -> char {
        match self {
            Tile::Walkable => '.',
            Tile::Blocked => '#',
        }
    }

    /// Decode the numeric form used by matrix literals: `0` walkable,
    /// `1` blocked.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Tile::Walkable),
            1 => Some(Tile::Blocked),
            _ => None,
        }
    }

    fn from_glyph(c: char) -> Option<Self> {
        match c {
            '.' => Some(Tile::Walkable),
            '#' => Some(Tile::Blocked),
            _ => None,
        }
    }
}

/// The only capability the search needs from a grid.
///
/// Implementations must be side-effect free and must answer `false` for any
/// coordinate outside `0..width` × `0..height`.
pub trait Walkable {
    /// Whether `p` is inside the grid and not blocked.
    fn is_walkable(&self, p: Point) -> bool;

    /// Grid size as a `Point` (width = x, height = y).
    fn dimensions(&self) -> Point;

    /// The grid rectangle, anchored at the origin.
    fn bounds(&self) -> Range {
        let d = self.dimensions();
        Range::new(0, 0, d.x, d.y)
    }
}

impl<T: Walkable + ?Sized> Walkable for &T {
    fn is_walkable(&self, p: Point) -> bool {
        (**self).is_walkable(p)
    }

    fn dimensions(&self) -> Point {
        (**self).dimensions()
    }
}

/// A rectangular matrix of [`Tile`]s, at least 1×1, anchored at the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "GridRepr")
)]
pub struct Grid {
    bounds: Range,
    cells: Vec<Tile>,
}

/// Number of cells of a `width` × `height` grid. Row-major indices are
/// computed in `i32`, so the area must fit there too.
fn area(width: i32, height: i32) -> Result<usize> {
    if width < 1 || height < 1 {
        return Err(Error::invalid(format!(
            "grid dimensions must be at least 1x1, got {width}x{height}"
        )));
    }
    width
        .checked_mul(height)
        .map(|n| n as usize)
        .ok_or_else(|| Error::invalid(format!("grid of {width}x{height} cells is too large")))
}

// Unchecked wire form of a `Grid`.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct GridRepr {
    bounds: Range,
    cells: Vec<Tile>,
}

#[cfg(feature = "serde")]
impl TryFrom<GridRepr> for Grid {
    type Error = Error;

    fn try_from(repr: GridRepr) -> Result<Self> {
        let GridRepr { bounds, cells } = repr;
        if bounds.min != Point::ZERO {
            return Err(Error::invalid(format!(
                "grid bounds must start at the origin, got {bounds}"
            )));
        }
        let len = area(bounds.max.x, bounds.max.y)?;
        if cells.len() != len {
            return Err(Error::invalid(format!(
                "grid {bounds} needs {len} cells, got {}",
                cells.len()
            )));
        }
        Ok(Self { bounds, cells })
    }
}

impl Grid {
    /// Create a `width` × `height` grid filled with `fill`.
    pub fn new(width: i32, height: i32, fill: Tile) -> Result<Self> {
        let len = area(width, height)?;
        Ok(Self {
            bounds: Range::new(0, 0, width, height),
            cells: vec![fill; len],
        })
    }

    /// Build a grid from rows of numeric codes (`0` walkable, `1` blocked).
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut grid = Self::new(width as i32, height as i32, Tile::Blocked)?;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(Error::invalid(format!(
                    "row {y} has {} cells, expected {width}",
                    row.len()
                )));
            }
            for (x, &code) in row.iter().enumerate() {
                let tile = Tile::from_code(code).ok_or_else(|| {
                    Error::invalid(format!("unknown cell code {code} at ({x}, {y})"))
                })?;
                grid.set(Point::new(x as i32, y as i32), tile);
            }
        }
        Ok(grid)
    }

    /// Parse the ASCII form: one line per row, `.` walkable and `#` blocked.
    /// Blank lines and surrounding whitespace are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let width = lines.first().map_or(0, |l| l.chars().count());
        let mut grid = Self::new(width as i32, lines.len() as i32, Tile::Blocked)?;
        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(Error::invalid(format!(
                    "line {y} is {} cells wide, expected {width}",
                    line.chars().count()
                )));
            }
            for (x, c) in line.chars().enumerate() {
                let tile = Tile::from_glyph(c).ok_or_else(|| {
                    Error::invalid(format!("unexpected character {c:?} at ({x}, {y})"))
                })?;
                grid.set(Point::new(x as i32, y as i32), tile);
            }
        }
        Ok(grid)
    }

    /// Returns the bounding range of the grid.
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Returns the size as a Point (width = x, height = y).
    pub fn size(&self) -> Point {
        self.bounds.size()
    }

    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Whether the grid contains the given point.
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    fn index(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some((p.y * self.width() + p.x) as usize)
    }

    /// Get the tile at a point, or `None` if out of bounds.
    pub fn at(&self, p: Point) -> Option<Tile> {
        self.index(p).map(|i| self.cells[i])
    }

    /// Set the tile at a point. Does nothing if out of bounds.
    pub fn set(&mut self, p: Point, tile: Tile) {
        if let Some(i) = self.index(p) {
            self.cells[i] = tile;
        }
    }

    /// Count how many cells equal the given tile.
    pub fn count(&self, tile: Tile) -> usize {
        self.cells.iter().filter(|&&t| t == tile).count()
    }

    /// Iterate over `(Point, Tile)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, Tile)> + '_ {
        self.bounds.iter().zip(self.cells.iter().copied())
    }

    /// Row-major iterator over the walkable cells.
    pub fn walkable_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.iter()
            .filter(|(_, t)| t.is_walkable())
            .map(|(p, _)| p)
    }
}

impl Walkable for Grid {
    fn is_walkable(&self, p: Point) -> bool {
        self.at(p).is_some_and(Tile::is_walkable)
    }

    fn dimensions(&self) -> Point {
        self.size()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width() as usize) {
            let line: String = row.iter().map(|t| t.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
