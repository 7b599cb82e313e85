//! Reachability flood fill.

use dedale_core::{Point, Walkable};

/// Every walkable cell connected to `from` through orthogonal steps,
/// `from` included, in discovery order. Empty if `from` is outside the grid
/// or not walkable.
pub fn reachable<G: Walkable + ?Sized>(grid: &G, from: Point) -> Vec<Point> {
    let bounds = grid.bounds();
    if !bounds.contains(from) || !grid.is_walkable(from) {
        return Vec::new();
    }
    let width = bounds.width() as usize;
    let idx = |p: Point| (p.y - bounds.min.y) as usize * width + (p.x - bounds.min.x) as usize;

    let mut seen = vec![false; bounds.len()];
    let mut stack = vec![from];
    let mut out = vec![from];
    seen[idx(from)] = true;

    // Iterative DFS from `from`.
    while let Some(cp) = stack.pop() {
        for np in cp.neighbors_4() {
            if !bounds.contains(np) || !grid.is_walkable(np) || seen[idx(np)] {
                continue;
            }
            seen[idx(np)] = true;
            stack.push(np);
            out.push(np);
        }
    }
    out
}
