use crate::utilities::geometry::Point;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Dense, symmetric matrix of euclidean distances between every pair of
/// nodes. Built once when an instance is loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn row(&self, node: usize) -> &[f64] {
        &self.cells[node * self.size..(node + 1) * self.size]
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = f64;

    fn index(&self, (a, b): (usize, usize)) -> &Self::Output {
        &self.cells[a * self.size + b]
    }
}

pub fn build_cache(positions: &[Point]) -> DistanceMatrix {
    let size = positions.len();
    let mut cells = vec![0.0; size * size];

    for i in 0..size {
        for j in (i + 1)..size {
            let distance = positions[i].distance(&positions[j]);

            cells[i * size + j] = distance;
            cells[j * size + i] = distance;
        }
    }

    DistanceMatrix { size, cells }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cache() {
        let positions = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(-3.0, 4.0),
        ];

        let dm = build_cache(&positions);

        assert_eq!(dm.len(), 3);
        for i in 0..3 {
            assert_eq!(dm[(i, i)], 0.0);
            for j in 0..3 {
                assert_eq!(dm[(i, j)], dm[(j, i)]);
            }
        }

        assert_eq!(dm[(0, 1)], 5.0);
        assert_eq!(dm[(0, 2)], 5.0);
        assert_eq!(dm[(1, 2)], 6.0);
        assert_eq!(dm.row(1), &[5.0, 0.0, 6.0]);
    }
}
