//! Presentation model for the maze demo: what the terminal shows for a maze
//! and the search running over it, plus the key bindings.
//!
//! Nothing here touches the terminal; [`terminal`] does the drawing.

pub mod terminal;

use std::time::Duration;

use dedale_core::{Point, Tile};
use dedale_maze::Maze;
use dedale_paths::{Outcome, SearchEvent};

pub const HELP: &str = "s solve | p pause | r resume | c reset | n new maze | +/- speed | q quit";

/// Bounds and increment of the speed control, in milliseconds.
const DELAY_STEP_MS: u64 = 25;
const DELAY_MAX_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A user request, decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Solve,
    Pause,
    Resume,
    /// Abort the running search and clear the overlay.
    Reset,
    Regenerate,
    Faster,
    Slower,
    Quit,
}

impl Command {
    pub fn from_key(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            's' => Some(Command::Solve),
            'p' => Some(Command::Pause),
            'r' => Some(Command::Resume),
            'c' => Some(Command::Reset),
            'n' => Some(Command::Regenerate),
            '+' | '=' => Some(Command::Faster),
            '-' => Some(Command::Slower),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }
}

/// New step delay after a speed key. Zero delay is reported as `None`.
pub fn adjust_delay(current: Option<Duration>, cmd: Command) -> Option<Duration> {
    let ms = current.map_or(0, |d| d.as_millis() as u64);
    let ms = match cmd {
        Command::Faster => ms.saturating_sub(DELAY_STEP_MS),
        Command::Slower => (ms + DELAY_STEP_MS).min(DELAY_MAX_MS),
        _ => ms,
    };
    (ms > 0).then(|| Duration::from_millis(ms))
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Where the demo is in a search's life cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    Paused,
    Done(Outcome),
}

/// Everything drawn on screen.
#[derive(Debug, Clone)]
pub struct View {
    pub maze: Maze,
    pub status: Status,
    steps: usize,
    current: Option<Point>,
    frontier: Vec<Point>,
    visited: Vec<Point>,
}

impl View {
    pub fn new(maze: Maze) -> Self {
        Self {
            maze,
            status: Status::Idle,
            steps: 0,
            current: None,
            frontier: Vec::new(),
            visited: Vec::new(),
        }
    }

    /// Clear the search overlay and go back to idle.
    pub fn reset(&mut self) {
        self.status = Status::Idle;
        self.steps = 0;
        self.current = None;
        self.frontier.clear();
        self.visited.clear();
    }

    /// Clear the overlay for a new run.
    pub fn begin(&mut self) {
        self.reset();
        self.status = Status::Running;
    }

    pub fn set_paused(&mut self, paused: bool) {
        match (&self.status, paused) {
            (Status::Running, true) => self.status = Status::Paused,
            (Status::Paused, false) => self.status = Status::Running,
            _ => {}
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, Status::Running | Status::Paused)
    }

    /// Fold a search event into the view.
    pub fn apply(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::Progress(p) => {
                self.steps = p.step;
                self.current = Some(p.current);
                self.frontier = p.frontier;
                self.visited = p.visited;
            }
            SearchEvent::Finished(outcome) => {
                self.current = None;
                self.status = Status::Done(outcome);
            }
        }
    }

    fn path(&self) -> &[Point] {
        match &self.status {
            Status::Done(Outcome::Found(p)) => &p.points,
            _ => &[],
        }
    }

    /// One string per grid row.
    ///
    /// `#` wall, `.` visited, `+` frontier, `@` cell being processed, `*`
    /// path, `S` entrance, `E` exit.
    pub fn render(&self) -> Vec<String> {
        let grid = &self.maze.grid;
        let width = grid.width() as usize;
        let mut cells: Vec<char> = grid
            .iter()
            .map(|(_, t)| match t {
                Tile::Walkable => ' ',
                Tile::Blocked => '#',
            })
            .collect();
        let mut mark = |p: Point, c: char| {
            if grid.contains(p) {
                cells[p.y as usize * width + p.x as usize] = c;
            }
        };

        for &p in &self.visited {
            mark(p, '.');
        }
        for &p in &self.frontier {
            mark(p, '+');
        }
        for &p in self.path() {
            mark(p, '*');
        }
        if let Some(p) = self.current {
            mark(p, '@');
        }
        mark(self.maze.start, 'S');
        mark(self.maze.end, 'E');

        cells.chunks(width).map(|row| row.iter().collect()).collect()
    }

    /// Status line shown under the maze.
    pub fn status_line(&self, delay: Option<Duration>) -> String {
        let state = match &self.status {
            Status::Idle => "ready".to_string(),
            Status::Running => format!("searching, step {}", self.steps),
            Status::Paused => format!("paused at step {}", self.steps),
            Status::Done(Outcome::Found(p)) => {
                format!("path found: {} cells after {} steps", p.len(), self.steps)
            }
            Status::Done(Outcome::NotFound) => format!("no path after {} steps", self.steps),
            Status::Done(Outcome::Cancelled) => format!("cancelled at step {}", self.steps),
        };
        let ms = delay.map_or(0, |d| d.as_millis());
        format!("{state} | delay {ms}ms")
    }
}
