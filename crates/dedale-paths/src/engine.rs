//! The observable A* run: [`PathEngine`] validates a request and hands out a
//! [`Search`], an iterator yielding one [`SearchEvent::Progress`] per
//! processed cell and a single terminal [`SearchEvent::Finished`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dedale_core::{Error, Point, Result, Walkable};

use crate::candidate::{Candidate, CandidateId};
use crate::control::SearchControl;
use crate::distance::manhattan;
use crate::frontier::SearchState;

/// Recognized engine options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Artificial pause served between progress events, for presentation.
    pub step_delay: Option<Duration>,
}

/// Snapshot emitted after a cell is moved from the frontier to visited.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Progress {
    /// 1-based count of processed cells.
    pub step: usize,
    pub current: Point,
    pub g: i32,
    pub h: i32,
    pub f: i32,
    /// Frontier coordinates in frontier order, after removing `current`.
    pub frontier: Vec<Point>,
    /// Visited coordinates in finalization order, `current` last.
    pub visited: Vec<Point>,
}

/// A path from start to end, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoundPath {
    pub points: Vec<Point>,
    /// Number of unit steps, `points.len() - 1`.
    pub cost: i32,
}

impl FoundPath {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Found(FoundPath),
    /// The frontier ran dry: no path exists.
    NotFound,
    /// The run was aborted through `cancel()`.
    Cancelled,
}

impl Outcome {
    pub fn path(&self) -> Option<&FoundPath> {
        match self {
            Outcome::Found(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }
}

/// Items produced by a [`Search`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchEvent {
    Progress(Progress),
    Finished(Outcome),
}

// ---------------------------------------------------------------------------
// PathEngine
// ---------------------------------------------------------------------------

/// Entry point for searches, owning the control gate they share.
///
/// At most one [`Search`] may be alive per engine; a second `find_path`
/// while one exists fails with [`Error::Busy`].
#[derive(Debug, Default)]
pub struct PathEngine {
    control: SearchControl,
    busy: AtomicBool,
}

impl PathEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given configuration.
    pub fn with_config(config: SearchConfig) -> Self {
        let engine = Self::default();
        engine.control.set_step_delay(config.step_delay);
        engine
    }

    /// The current configuration.
    pub fn config(&self) -> SearchConfig {
        SearchConfig {
            step_delay: self.control.step_delay(),
        }
    }

    /// Change the delay between progress events, also for a running search.
    pub fn set_step_delay(&self, delay: Option<Duration>) {
        self.control.set_step_delay(delay);
    }

    /// A handle for pausing, resuming or cancelling from another thread.
    pub fn control(&self) -> SearchControl {
        self.control.clone()
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Whether a [`Search`] from this engine is alive.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Start a search from `start` to `end` over `grid`.
    ///
    /// Both endpoints must be inside the grid and walkable. Any pending pause
    /// or cancel request from a previous run is cleared. Nothing is explored
    /// until the returned [`Search`] is iterated.
    pub fn find_path<'a, G: Walkable>(
        &'a self,
        grid: &'a G,
        start: Point,
        end: Point,
    ) -> Result<Search<'a, G>> {
        let bounds = grid.bounds();
        for (role, p) in [("start", start), ("end", end)] {
            if !bounds.contains(p) {
                return Err(Error::out_of_bounds(role, p));
            }
            if !grid.is_walkable(p) {
                return Err(Error::blocked(role, p));
            }
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy);
        }

        self.control.reset();
        log::debug!("searching {start} -> {end} on {}x{} grid", bounds.width(), bounds.height());

        let mut state = SearchState::new(bounds);
        state.relax(Candidate::start(start, manhattan(start, end)));

        Ok(Search {
            grid,
            control: &self.control,
            busy: &self.busy,
            end,
            state,
            step: 0,
            delay_due: false,
            pending: None,
            outcome: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// One in-flight run. Each call to `next` performs at most one iteration of
/// the main loop; the caller decides the pace.
///
/// The only suspension point is at the top of an iteration: the step delay
/// is served there, then cancellation is checked, then the run blocks while
/// paused. Expansion of a processed cell always completes before control
/// returns.
#[derive(Debug)]
pub struct Search<'a, G: Walkable> {
    grid: &'a G,
    control: &'a SearchControl,
    busy: &'a AtomicBool,
    end: Point,
    state: SearchState,
    step: usize,
    delay_due: bool,
    // set once the goal is processed, reported by the following `next`
    pending: Option<Outcome>,
    outcome: Option<Outcome>,
}

impl<'a, G: Walkable> Search<'a, G> {
    /// The terminal outcome, once reached.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Number of cells processed so far.
    pub fn steps(&self) -> usize {
        self.step
    }

    /// Current frontier coordinates in frontier order.
    pub fn frontier(&self) -> Vec<Point> {
        self.state.frontier_points()
    }

    /// Current visited coordinates in finalization order.
    pub fn visited(&self) -> Vec<Point> {
        self.state.visited_points()
    }

    /// Drive the run to its end, handing every progress snapshot to
    /// `on_progress`.
    pub fn run(mut self, mut on_progress: impl FnMut(&Progress)) -> Outcome {
        for event in self.by_ref() {
            match event {
                SearchEvent::Progress(p) => on_progress(&p),
                SearchEvent::Finished(outcome) => return outcome,
            }
        }
        self.outcome.take().unwrap_or(Outcome::NotFound)
    }

    fn finish(&mut self, outcome: Outcome) -> SearchEvent {
        match &outcome {
            Outcome::Found(p) => {
                log::debug!("path found after {} steps, cost {}", self.step, p.cost)
            }
            Outcome::NotFound => log::debug!("no path after {} steps", self.step),
            Outcome::Cancelled => log::debug!("search cancelled after {} steps", self.step),
        }
        self.outcome = Some(outcome.clone());
        SearchEvent::Finished(outcome)
    }

    fn advance(&mut self) -> SearchEvent {
        let mut stop = false;
        if std::mem::take(&mut self.delay_due) {
            if let Some(delay) = self.control.step_delay() {
                stop = self.control.sleep(delay);
            }
        }
        // a goal processed before the cancel still reports Found
        if let Some(outcome) = self.pending.take() {
            return self.finish(outcome);
        }
        if self.state.is_frontier_empty() {
            return self.finish(Outcome::NotFound);
        }
        if stop || self.control.is_cancelled() || self.control.wait_if_paused() {
            return self.finish(Outcome::Cancelled);
        }

        let Some(id) = self.state.pop_min() else {
            return self.finish(Outcome::NotFound);
        };
        let current = self.state.arena()[id];
        self.step += 1;
        log::trace!(
            "processing {} | f: {} | g: {} | h: {}",
            current.pos,
            current.f,
            current.g,
            current.h
        );

        let progress = Progress {
            step: self.step,
            current: current.pos,
            g: current.g,
            h: current.h,
            f: current.f,
            frontier: self.state.frontier_points(),
            visited: self.state.visited_points(),
        };

        if current.pos == self.end {
            self.pending = Some(Outcome::Found(FoundPath {
                points: self.state.arena().trace(id),
                cost: current.g,
            }));
        } else {
            self.expand(&current, id);
        }
        self.delay_due = true;
        SearchEvent::Progress(progress)
    }

    fn expand(&mut self, current: &Candidate, id: CandidateId) {
        let bounds = self.grid.bounds();
        for np in current.pos.neighbors_4() {
            if !bounds.contains(np) || !self.grid.is_walkable(np) || self.state.is_visited(np) {
                continue;
            }
            let g = current.g + 1;
            let h = manhattan(np, self.end);
            self.state.relax(Candidate::new(np, g, h, Some(id)));
        }
    }
}

impl<G: Walkable> Iterator for Search<'_, G> {
    type Item = SearchEvent;

    fn next(&mut self) -> Option<SearchEvent> {
        if self.outcome.is_some() {
            return None;
        }
        Some(self.advance())
    }
}

impl<G: Walkable> Drop for Search<'_, G> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedale_core::{Grid, Tile};
    use std::sync::mpsc;
    use std::thread;

    fn open(w: i32, h: i32) -> Grid {
        Grid::new(w, h, Tile::Walkable).unwrap()
    }

    fn collect<G: Walkable>(search: Search<'_, G>) -> (Vec<Progress>, Outcome) {
        let mut progress = Vec::new();
        let outcome = search.run(|p| progress.push(p.clone()));
        (progress, outcome)
    }

    #[test]
    fn open_grid_path_is_manhattan_plus_one() {
        let grid = open(8, 6);
        let engine = PathEngine::new();
        for (start, end) in [
            (Point::new(0, 0), Point::new(7, 5)),
            (Point::new(6, 1), Point::new(2, 4)),
            (Point::new(3, 3), Point::new(3, 0)),
        ] {
            let outcome = engine.find_path(&grid, start, end).unwrap().run(|_| {});
            let path = outcome.path().expect("open grid must be solvable");
            let d = manhattan(start, end);
            assert_eq!(path.len(), d as usize + 1);
            assert_eq!(path.cost, d);
            assert_eq!(path.points.first(), Some(&start));
            assert_eq!(path.points.last(), Some(&end));
            for w in path.points.windows(2) {
                assert_eq!(manhattan(w[0], w[1]), 1);
            }
        }
    }

    #[test]
    fn five_by_five_corner_to_corner() {
        let grid = open(5, 5);
        let engine = PathEngine::new();
        let search = engine
            .find_path(&grid, Point::new(0, 0), Point::new(4, 4))
            .unwrap();
        let (progress, outcome) = collect(search);
        let path = outcome.path().unwrap();
        assert_eq!(path.len(), 9);
        let last = progress.last().unwrap();
        assert_eq!(last.current, Point::new(4, 4));
        assert_eq!(last.f, 8);
        assert_eq!(last.g, 8);
        assert_eq!(last.h, 0);
    }

    #[test]
    fn single_gap_wall_is_routed_through() {
        let grid = Grid::parse(
            "
            ..#..
            ..#..
            .....
            ..#..
            ..#..
            ",
        )
        .unwrap();
        let engine = PathEngine::new();
        let outcome = engine
            .find_path(&grid, Point::new(0, 0), Point::new(4, 0))
            .unwrap()
            .run(|_| {});
        let expected: Vec<Point> = [
            (0, 0),
            (1, 0),
            (1, 1),
            (1, 2),
            (2, 2),
            (3, 2),
            (3, 1),
            (3, 0),
            (4, 0),
        ]
        .into_iter()
        .map(|(x, y)| Point::new(x, y))
        .collect();
        assert_eq!(outcome.path().map(|p| p.points.clone()), Some(expected));
    }

    #[test]
    fn enclosed_start_processes_only_the_start() {
        let grid = Grid::parse(
            "
            .#...
            ##...
            .....
            ",
        )
        .unwrap();
        let engine = PathEngine::new();
        let search = engine
            .find_path(&grid, Point::new(0, 0), Point::new(4, 2))
            .unwrap();
        let (progress, outcome) = collect(search);
        assert_eq!(outcome, Outcome::NotFound);
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].current, Point::new(0, 0));
        assert!(progress[0].frontier.is_empty());
        assert_eq!(progress[0].visited, vec![Point::new(0, 0)]);
    }

    #[test]
    fn start_equal_to_end() {
        let grid = open(3, 3);
        let engine = PathEngine::new();
        let p = Point::new(1, 1);
        let (progress, outcome) = collect(engine.find_path(&grid, p, p).unwrap());
        assert_eq!(progress.len(), 1);
        assert_eq!(outcome.path().map(|f| f.points.clone()), Some(vec![p]));
        assert_eq!(outcome.path().map(|f| f.cost), Some(0));
    }

    #[test]
    fn first_steps_follow_expansion_order() {
        // From (1,1) toward (1,3): up (1,0) has f = 4, right (2,1) f = 4,
        // down (1,2) f = 2, left (0,1) f = 4.
        let grid = open(3, 4);
        let engine = PathEngine::new();
        let mut search = engine
            .find_path(&grid, Point::new(1, 1), Point::new(1, 3))
            .unwrap();
        let Some(SearchEvent::Progress(first)) = search.next() else {
            panic!("expected progress");
        };
        assert_eq!(first.current, Point::new(1, 1));
        assert_eq!(
            search.frontier(),
            vec![Point::new(1, 0), Point::new(2, 1), Point::new(1, 2), Point::new(0, 1)]
        );
        let Some(SearchEvent::Progress(second)) = search.next() else {
            panic!("expected progress");
        };
        assert_eq!(second.current, Point::new(1, 2));
        assert_eq!(
            second.frontier,
            vec![Point::new(1, 0), Point::new(2, 1), Point::new(0, 1)]
        );
        assert_eq!(second.visited, vec![Point::new(1, 1), Point::new(1, 2)]);
    }

    #[test]
    fn iterator_ends_after_terminal_event() {
        let grid = open(2, 1);
        let engine = PathEngine::new();
        let mut search = engine
            .find_path(&grid, Point::new(0, 0), Point::new(1, 0))
            .unwrap();
        let events: Vec<_> = search.by_ref().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], SearchEvent::Finished(Outcome::Found(_))));
        assert!(search.next().is_none());
        assert!(search.outcome().is_some_and(Outcome::is_found));
    }

    #[test]
    fn invalid_endpoints_are_rejected_before_searching() {
        let grid = Grid::parse("..#\n...").unwrap();
        let engine = PathEngine::new();
        let err = engine
            .find_path(&grid, Point::new(5, 0), Point::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
        assert!(engine
            .find_path(&grid, Point::new(0, 0), Point::new(2, 0))
            .is_err());
        assert!(engine
            .find_path(&grid, Point::new(0, 0), Point::new(0, -1))
            .is_err());
        assert!(!engine.is_busy());
    }

    #[test]
    fn second_search_on_same_engine_is_busy() {
        let grid = open(3, 3);
        let engine = PathEngine::new();
        let first = engine
            .find_path(&grid, Point::new(0, 0), Point::new(2, 2))
            .unwrap();
        assert!(engine.is_busy());
        assert_eq!(
            engine
                .find_path(&grid, Point::new(0, 0), Point::new(2, 2))
                .unwrap_err(),
            Error::Busy
        );
        drop(first);
        assert!(!engine.is_busy());
        assert!(engine
            .find_path(&grid, Point::new(0, 0), Point::new(2, 2))
            .is_ok());
    }

    #[test]
    fn cancel_before_iteration_yields_cancelled() {
        let grid = open(4, 4);
        let engine = PathEngine::new();
        let mut search = engine
            .find_path(&grid, Point::new(0, 0), Point::new(3, 3))
            .unwrap();
        assert!(matches!(search.next(), Some(SearchEvent::Progress(_))));
        engine.cancel();
        assert_eq!(search.next(), Some(SearchEvent::Finished(Outcome::Cancelled)));
        assert!(search.next().is_none());
    }

    #[test]
    fn new_run_clears_previous_cancel() {
        let grid = open(3, 3);
        let engine = PathEngine::new();
        engine.cancel();
        let outcome = engine
            .find_path(&grid, Point::new(0, 0), Point::new(2, 2))
            .unwrap()
            .run(|_| {});
        assert!(outcome.is_found());
    }

    #[test]
    fn pause_blocks_events_until_resume() {
        let grid = open(6, 6);
        let engine = PathEngine::new();
        let control = engine.control();
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| {
            let mut search = engine
                .find_path(&grid, Point::new(0, 0), Point::new(5, 5))
                .unwrap();
            let first = search.next();
            assert!(matches!(first, Some(SearchEvent::Progress(_))));
            control.pause();

            s.spawn(move || {
                for event in search {
                    tx.send(event).unwrap();
                }
            });

            assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
            control.resume();
            let mut last = None;
            while let Ok(event) = rx.recv_timeout(Duration::from_secs(5)) {
                last = Some(event);
            }
            assert!(matches!(last, Some(SearchEvent::Finished(Outcome::Found(_)))));
        });
    }

    #[test]
    fn cancel_while_paused_ends_cancelled() {
        let grid = open(6, 6);
        let engine = PathEngine::new();
        let control = engine.control();
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| {
            let search = engine
                .find_path(&grid, Point::new(0, 0), Point::new(5, 5))
                .unwrap();
            control.pause();
            s.spawn(move || {
                let mut events = Vec::new();
                let outcome = search.run(|p| events.push(p.step));
                tx.send((events, outcome)).unwrap();
            });

            thread::sleep(Duration::from_millis(50));
            assert!(rx.try_recv().is_err());
            control.cancel();
            let (events, outcome) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert!(events.is_empty());
            assert_eq!(outcome, Outcome::Cancelled);
        });
    }

    #[test]
    fn cancel_interrupts_step_delay() {
        let grid = open(10, 10);
        let engine = PathEngine::with_config(SearchConfig {
            step_delay: Some(Duration::from_secs(60)),
        });
        assert_eq!(engine.config().step_delay, Some(Duration::from_secs(60)));
        let control = engine.control();

        thread::scope(|s| {
            let search = engine
                .find_path(&grid, Point::new(0, 0), Point::new(9, 9))
                .unwrap();
            let handle = s.spawn(move || search.run(|_| {}));
            thread::sleep(Duration::from_millis(50));
            control.cancel();
            assert_eq!(handle.join().unwrap(), Outcome::Cancelled);
        });
    }

    #[test]
    fn cancel_during_delay_after_goal_still_reports_found() {
        let grid = open(2, 1);
        let engine = PathEngine::with_config(SearchConfig {
            step_delay: Some(Duration::from_secs(60)),
        });
        let control = engine.control();
        let mut search = engine
            .find_path(&grid, Point::new(0, 0), Point::new(0, 0))
            .unwrap();
        assert!(matches!(search.next(), Some(SearchEvent::Progress(_))));

        thread::scope(|s| {
            let handle = s.spawn(move || search.next());
            thread::sleep(Duration::from_millis(50));
            control.cancel();
            let event = handle.join().unwrap();
            assert!(matches!(event, Some(SearchEvent::Finished(Outcome::Found(_)))));
        });
    }

    #[test]
    fn walkable_can_be_any_type() {
        struct Corridor;
        impl Walkable for Corridor {
            fn is_walkable(&self, p: Point) -> bool {
                p.y == 0 && (0..4).contains(&p.x)
            }
            fn dimensions(&self) -> Point {
                Point::new(4, 1)
            }
        }
        let engine = PathEngine::new();
        let outcome = engine
            .find_path(&Corridor, Point::new(0, 0), Point::new(3, 0))
            .unwrap()
            .run(|_| {});
        assert_eq!(outcome.path().map(|p| p.cost), Some(3));
    }
}
