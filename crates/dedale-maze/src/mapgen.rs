//! Perfect-maze generation by randomized depth-first carving.
//!
//! Carving starts at (1,1) and moves two cells at a time, opening the wall
//! cell in between. Every carved cell is reached exactly once from an
//! already carved one, so the walkable region is a spanning tree: one simple
//! path joins any two carved cells.

use dedale_core::{Error, Grid, Point, Result, Tile, Walkable};
use rand::Rng;
use rand::seq::SliceRandom;

/// Side length used when none is given.
pub const DEFAULT_SIZE: i32 = 61;

/// The two-step moves, before shuffling: right, left, down, up.
const MOVES: [Point; 4] = [
    Point::new(2, 0),
    Point::new(-2, 0),
    Point::new(0, 2),
    Point::new(0, -2),
];

/// A generated maze: the grid plus the entrance and exit the search runs
/// between. The two are always connected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Maze {
    pub grid: Grid,
    pub start: Point,
    pub end: Point,
}

impl Walkable for Maze {
    fn is_walkable(&self, p: Point) -> bool {
        self.grid.is_walkable(p)
    }

    fn dimensions(&self) -> Point {
        self.grid.size()
    }
}

// One level of the carving recursion.
struct Frame {
    cell: Point,
    moves: [Point; 4],
    next: usize,
}

/// Maze generator owning its random source.
pub struct MazeGen<R: Rng> {
    pub rng: R,
    // all-blocked grid every generation starts from
    blank: Grid,
}

impl<R: Rng> MazeGen<R> {
    /// Create a generator for `width` × `height` mazes. Both sides must be
    /// odd and at least 3, otherwise the border cannot be kept intact.
    pub fn new(width: i32, height: i32, rng: R) -> Result<Self> {
        for (name, side) in [("width", width), ("height", height)] {
            if side < 3 || side % 2 == 0 {
                return Err(Error::invalid(format!(
                    "maze {name} must be odd and at least 3, got {side}"
                )));
            }
        }
        let blank = Grid::new(width, height, Tile::Blocked)?;
        Ok(Self { rng, blank })
    }

    /// Create a generator for square mazes.
    pub fn square(size: i32, rng: R) -> Result<Self> {
        Self::new(size, size, rng)
    }

    /// Maze size as a `Point` (width = x, height = y).
    pub fn size(&self) -> Point {
        self.blank.size()
    }

    /// Carve a fresh maze and pick its entrance and exit.
    ///
    /// Each call starts from an all-blocked grid, so repeated calls give
    /// independent mazes.
    pub fn generate(&mut self) -> Maze {
        let mut grid = self.blank.clone();
        self.carve(&mut grid, Point::new(1, 1));
        let start = Self::open_entrance(&mut grid);
        let end = self.pick_exit(&grid);
        log::debug!(
            "generated {}x{} maze: {} open cells, entrance {start}, exit {end}",
            grid.width(),
            grid.height(),
            grid.count(Tile::Walkable)
        );
        Maze { grid, start, end }
    }

    fn frame(&mut self, cell: Point) -> Frame {
        let mut moves = MOVES;
        moves.shuffle(&mut self.rng);
        Frame {
            cell,
            moves,
            next: 0,
        }
    }

    /// Depth-first carve from `origin`, keeping the recursion on an explicit
    /// stack. Each frame shuffles its moves on entry, so the visiting order
    /// is the one a recursive carve would produce.
    fn carve(&mut self, grid: &mut Grid, origin: Point) {
        let interior = grid.bounds().inset(1);
        grid.set(origin, Tile::Walkable);
        let mut stack = vec![self.frame(origin)];

        while let Some(top) = stack.last_mut() {
            let Some(&step) = top.moves.get(top.next) else {
                stack.pop();
                continue;
            };
            top.next += 1;
            let cell = top.cell;
            let target = cell + step;
            if interior.contains(target) && !grid.is_walkable(target) {
                grid.set(cell.midpoint(target), Tile::Walkable);
                grid.set(target, Tile::Walkable);
                let frame = self.frame(target);
                stack.push(frame);
            }
        }
    }

    /// Open the top border above the first carved cell of row 1, scanning
    /// left to right, and return that border cell.
    fn open_entrance(grid: &mut Grid) -> Point {
        let entrance = (1..grid.width() - 1)
            .map(|x| Point::new(x, 0))
            .find(|p| grid.is_walkable(p.shift(0, 1)))
            .unwrap_or(Point::new(1, 0));
        grid.set(entrance, Tile::Walkable);
        entrance
    }

    /// Uniform choice among the walkable cells below the top row.
    fn pick_exit(&mut self, grid: &Grid) -> Point {
        let cells: Vec<Point> = grid.walkable_cells().filter(|p| p.y >= 1).collect();
        debug_assert!(!cells.is_empty(), "carving always opens (1,1)");
        if cells.is_empty() {
            return Point::new(1, 1);
        }
        cells[self.rng.random_range(0..cells.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedale_paths::{PathEngine, reachable};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded(size: i32, seed: u64) -> MazeGen<StdRng> {
        MazeGen::square(size, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_rejects_even_or_tiny_sizes() {
        for size in [-1, 0, 1, 2, 4, 60] {
            assert!(matches!(
                MazeGen::square(size, rand::rng()),
                Err(Error::InvalidConfiguration { .. })
            ));
        }
        assert!(MazeGen::new(7, 8, rand::rng()).is_err());
        assert!(MazeGen::new(7, 5, rand::rng()).is_ok());
    }

    #[test]
    fn test_rejects_sizes_too_large_to_index() {
        assert!(matches!(
            MazeGen::square(70001, rand::rng()),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = seeded(21, 42).generate();
        let b = seeded(21, 42).generate();
        assert_eq!(a.grid.to_string(), b.grid.to_string());
        assert_eq!((a.start, a.end), (b.start, b.end));
    }

    #[test]
    fn test_every_open_cell_reachable_from_entrance() {
        for seed in [1, 2, 3, 99] {
            let mut mazes = seeded(15, seed);
            for _ in 0..2 {
                let maze = mazes.generate();
                let mut flooded = reachable(&maze.grid, maze.start);
                flooded.sort();
                let mut open: Vec<Point> = maze.grid.walkable_cells().collect();
                open.sort();
                assert_eq!(flooded, open);
            }
        }
    }

    #[test]
    fn test_carved_region_is_a_tree() {
        let maze = seeded(21, 7).generate();
        let g = &maze.grid;
        let open = g.walkable_cells().count();
        let edges = g
            .walkable_cells()
            .map(|p| {
                [p.shift(1, 0), p.shift(0, 1)]
                    .into_iter()
                    .filter(|&n| g.is_walkable(n))
                    .count()
            })
            .sum::<usize>();
        assert_eq!(edges + 1, open);
    }

    #[test]
    fn test_entrance_and_exit() {
        for seed in 0..8 {
            let maze = seeded(11, seed).generate();
            assert_eq!(maze.start, Point::new(1, 0));
            assert!(maze.grid.is_walkable(maze.start));
            assert!(maze.grid.is_walkable(maze.end));
            assert!(maze.end.y >= 1);
            assert_ne!(maze.start, maze.end);
        }
    }

    #[test]
    fn test_border_stays_closed_except_entrance() {
        let maze = seeded(13, 5).generate();
        let size = maze.grid.size();
        for p in maze.grid.bounds() {
            let on_border = p.x == 0 || p.y == 0 || p.x == size.x - 1 || p.y == size.y - 1;
            if on_border && p != maze.start {
                assert!(!maze.grid.is_walkable(p), "border cell {p} was carved");
            }
        }
    }

    #[test]
    fn test_smallest_maze() {
        let maze = seeded(3, 0).generate();
        assert_eq!(maze.grid.to_string(), "#.#\n#.#\n###\n");
        assert_eq!(maze.start, Point::new(1, 0));
        assert_eq!(maze.end, Point::new(1, 1));
    }

    #[test]
    fn test_rectangular_maze() {
        let maze = MazeGen::new(9, 5, StdRng::seed_from_u64(3))
            .unwrap()
            .generate();
        assert_eq!(maze.dimensions(), Point::new(9, 5));
        // 4 x 2 carving cells in a 9 x 5 grid
        let cells = maze
            .grid
            .walkable_cells()
            .filter(|p| p.x % 2 == 1 && p.y % 2 == 1)
            .count();
        assert_eq!(cells, 8);
    }

    #[test]
    fn test_search_solves_generated_maze() {
        let maze = seeded(DEFAULT_SIZE, 11).generate();
        let engine = PathEngine::new();
        let outcome = engine
            .find_path(&maze, maze.start, maze.end)
            .unwrap()
            .run(|_| {});
        let path = outcome.path().expect("entrance and exit are connected");
        assert_eq!(path.points.first(), Some(&maze.start));
        assert_eq!(path.points.last(), Some(&maze.end));
        assert!(path.points.iter().all(|&p| maze.is_walkable(p)));
    }
}
