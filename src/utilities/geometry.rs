use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Sign of the cross product of the triangle p, q, r. Zero means collinear.
pub fn orientation(p: &Point, q: &Point, r: &Point) -> f64 {
    (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y)
}

/**
    Checks if the segments a1-b1 and a2-b2 cross each other. Touching counts
    as crossing.

    Collinear segments intersect when their projections overlap on both
    axes, so vertical segments are handled like any other.
**/
pub fn segments_intersect(a1: &Point, b1: &Point, a2: &Point, b2: &Point) -> bool {
    let d1 = orientation(a1, b1, a2);
    let d2 = orientation(a1, b1, b2);
    let d3 = orientation(a2, b2, a1);
    let d4 = orientation(a2, b2, b1);

    if d1 == 0.0 && d2 == 0.0 {
        return overlaps(a1.x, b1.x, a2.x, b2.x) && overlaps(a1.y, b1.y, a2.y, b2.y);
    }

    straddles(d1, d2) && straddles(d3, d4)
}

fn straddles(d1: f64, d2: f64) -> bool {
    (d1 >= 0.0 && d2 <= 0.0) || (d1 <= 0.0 && d2 >= 0.0)
}

fn overlaps(a1: f64, b1: f64, a2: f64, b2: f64) -> bool {
    a1.min(b1) <= a2.max(b2) && a2.min(b2) <= a1.max(b1)
}

/// Checks that every node is reached exactly once when walking down from
/// `root`, i.e. the child lists describe a proper tree.
pub fn is_proper_tree<C>(children: &[C], root: usize) -> bool
where
    for<'a> &'a C: IntoIterator<Item = &'a usize>,
{
    let mut visited = vec![false; children.len()];
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node >= children.len() || visited[node] {
            return false;
        }
        visited[node] = true;

        for &child in &children[node] {
            stack.push(child);
        }
    }

    visited.into_iter().all(|seen| seen)
}
