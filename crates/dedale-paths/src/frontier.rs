//! Frontier and visited bookkeeping for one search run.

use dedale_core::{Point, Range};

use crate::candidate::{Arena, Candidate, CandidateId};

/// What [`SearchState::relax`] did with a newly computed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relaxation {
    /// No frontier entry existed for the coordinate; the candidate was queued.
    Inserted,
    /// A costlier frontier entry was dropped and the candidate queued at the
    /// back of the frontier.
    Replaced,
    /// The frontier entry already had `g` lower or equal; the candidate was
    /// discarded.
    Kept,
}

/// The two disjoint collections of a run plus per-cell lookup tables.
///
/// The frontier is an order-preserving list scanned linearly, so among
/// equal-`f` entries the one that comes first in the list wins.
#[derive(Debug)]
pub struct SearchState {
    arena: Arena,
    frontier: Vec<CandidateId>,
    visited: Vec<CandidateId>,
    // per-cell: the frontier entry for that coordinate, if any
    open: Vec<Option<CandidateId>>,
    closed: Vec<bool>,
    bounds: Range,
    width: usize,
}

impl SearchState {
    /// Empty state for a grid covering `bounds`.
    pub fn new(bounds: Range) -> Self {
        let len = bounds.len();
        Self {
            arena: Arena::new(),
            frontier: Vec::new(),
            visited: Vec::new(),
            open: vec![None; len],
            closed: vec![false; len],
            bounds,
            width: bounds.width().max(0) as usize,
        }
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        let x = (p.x - self.bounds.min.x) as usize;
        let y = (p.y - self.bounds.min.y) as usize;
        Some(y * self.width + x)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_frontier_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Whether `p` has been finalized.
    pub fn is_visited(&self, p: Point) -> bool {
        self.idx(p).is_some_and(|i| self.closed[i])
    }

    /// The frontier entry for `p`, if one is queued.
    pub fn queued(&self, p: Point) -> Option<&Candidate> {
        let i = self.idx(p)?;
        self.open[i].map(|id| &self.arena[id])
    }

    /// Remove the first minimum-`f` frontier entry, finalize it and return
    /// its id.
    pub fn pop_min(&mut self) -> Option<CandidateId> {
        let mut best = 0;
        let mut best_f = self.arena[*self.frontier.first()?].f;
        for (i, &id) in self.frontier.iter().enumerate().skip(1) {
            let f = self.arena[id].f;
            if f < best_f {
                best = i;
                best_f = f;
            }
        }

        let id = self.frontier.remove(best);
        let pos = self.arena[id].pos;
        if let Some(i) = self.idx(pos) {
            self.open[i] = None;
            self.closed[i] = true;
        }
        self.visited.push(id);
        Some(id)
    }

    /// Queue `c` unless a frontier entry for the same coordinate is at least
    /// as cheap. Ties go to the entry already queued.
    ///
    /// Visited coordinates are never reopened; callers filter them out before
    /// relaxing.
    pub fn relax(&mut self, c: Candidate) -> Relaxation {
        let Some(i) = self.idx(c.pos) else {
            debug_assert!(false, "relaxing {} outside {}", c.pos, self.bounds);
            return Relaxation::Kept;
        };
        debug_assert!(!self.closed[i], "reopening visited cell {}", c.pos);

        let mut outcome = Relaxation::Inserted;
        if let Some(existing) = self.open[i] {
            if self.arena[existing].g <= c.g {
                return Relaxation::Kept;
            }
            if let Some(at) = self.frontier.iter().position(|&id| id == existing) {
                self.frontier.remove(at);
            }
            outcome = Relaxation::Replaced;
        }

        let id = self.arena.push(c);
        self.frontier.push(id);
        self.open[i] = Some(id);
        outcome
    }

    /// Frontier coordinates in frontier order.
    pub fn frontier_points(&self) -> Vec<Point> {
        self.frontier.iter().map(|&id| self.arena[id].pos).collect()
    }

    /// Visited coordinates in finalization order.
    pub fn visited_points(&self) -> Vec<Point> {
        self.visited.iter().map(|&id| self.arena[id].pos).collect()
    }
}
