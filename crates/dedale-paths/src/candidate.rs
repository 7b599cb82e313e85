//! Search-time records and the per-run arena that owns them.

use std::ops::Index;

use dedale_core::Point;

/// Position of a [`Candidate`] inside its run's [`Arena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CandidateId(usize);

/// One grid coordinate's cost and provenance within a single search run.
///
/// `parent` is an arena index rather than a reference; following it is the
/// only way a path is rebuilt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub pos: Point,
    /// Cost from the start.
    pub g: i32,
    /// Heuristic estimate to the goal.
    pub h: i32,
    /// `g + h`.
    pub f: i32,
    pub parent: Option<CandidateId>,
}

impl Candidate {
    pub fn new(pos: Point, g: i32, h: i32, parent: Option<CandidateId>) -> Self {
        Self {
            pos,
            g,
            h,
            f: g + h,
            parent,
        }
    }

    /// The root of a run: zero cost, no parent.
    pub fn start(pos: Point, h: i32) -> Self {
        Self::new(pos, 0, h, None)
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.pos.y
    }
}

/// Append-only storage for every candidate created during one run.
///
/// Superseded candidates stay in the arena unreferenced; the arena is dropped
/// with the run.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Candidate>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a candidate and return its id.
    pub fn push(&mut self, c: Candidate) -> CandidateId {
        self.nodes.push(c);
        CandidateId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk parent links from `id` back to the root and return the
    /// coordinates in root-to-`id` order.
    pub fn trace(&self, id: CandidateId) -> Vec<Point> {
        let mut path = Vec::new();
        let mut cur = Some(id);
        while let Some(ci) = cur {
            let c = &self[ci];
            path.push(c.pos);
            cur = c.parent;
        }
        path.reverse();
        path
    }
}

impl Index<CandidateId> for Arena {
    type Output = Candidate;

    fn index(&self, id: CandidateId) -> &Candidate {
        &self.nodes[id.0]
    }
}
