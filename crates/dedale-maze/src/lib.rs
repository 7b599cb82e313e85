//! Maze generation for dedale: randomized depth-first carving producing a
//! perfect maze with one entrance on the top border and a random exit.

pub mod mapgen;

pub use mapgen::{DEFAULT_SIZE, Maze, MazeGen};
