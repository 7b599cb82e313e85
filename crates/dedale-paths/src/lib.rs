//! Observable A* search for maze grids.
//!
//! A [`PathEngine`] hands out a [`Search`]: an iterator that processes one
//! cell per `next()` and reports what it did as a [`Progress`] snapshot,
//! ending with a single [`Outcome`]. The run can be paused, resumed and
//! cancelled from other threads through a [`SearchControl`].
//!
//! ```
//! use dedale_core::{Grid, Point};
//! use dedale_paths::{Outcome, PathEngine};
//!
//! let grid = Grid::parse("...\n.#.\n...").unwrap();
//! let engine = PathEngine::new();
//! let outcome = engine
//!     .find_path(&grid, Point::new(0, 0), Point::new(2, 2))
//!     .unwrap()
//!     .run(|p| println!("visited {}", p.current));
//! assert!(matches!(outcome, Outcome::Found(ref path) if path.cost == 4));
//! ```
//!
//! Movement is orthogonal with unit cost and the heuristic is
//! [`manhattan`]. The frontier is scanned linearly and ties on `f` go to the
//! entry queued first, so runs are reproducible step by step.

mod candidate;
mod control;
mod distance;
mod engine;
mod flood;
mod frontier;

pub use candidate::{Arena, Candidate, CandidateId};
pub use control::SearchControl;
pub use distance::manhattan;
pub use engine::{FoundPath, Outcome, PathEngine, Progress, Search, SearchConfig, SearchEvent};
pub use flood::reachable;
pub use frontier::{Relaxation, SearchState};
