use serde::{Deserialize, Serialize};
use std::{
    f64::consts::PI,
    fs,
    ops::{Range, RangeInclusive},
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

use crate::{
    operators::distance_matrix::{self, DistanceMatrix},
    utilities::geometry::Point,
};

pub type NodeID = usize;

/// Directed edge `(child, parent)`.
pub type Edge = (NodeID, NodeID);

pub const SUBSTATION: NodeID = 0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cable {
    pub capacity: usize,
    pub cost_per_meter: usize,
    pub availability: usize,
}

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{} is missing the substation header line", .0.display())]
    MissingHeader(PathBuf),

    #[error("instance has no cable types")]
    NoCables,

    #[error("invalid turbine spread {0}")]
    InvalidSpread(f64),

    #[error("C ({requested}) cannot be lower than the instance's Cmin ({minimum})")]
    CapacityBelowMinimum { requested: usize, minimum: usize },
}

/**
    A wind farm: the substation (node 0) and the turbines (nodes 1..=n),
    positioned relative to the substation and numbered by clockwise angle
    around it, starting from the positive x axis.
**/
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instance {
    name: String,
    delta: Point,
    position: Vec<Point>,
    distance: DistanceMatrix,
    capacity: usize,
    min_capacity: usize,
    cables: Vec<Cable>,
    cable_indices: Vec<usize>,
}

impl Instance {
    /// Builds an instance from absolute positions. `capacity` defaults to
    /// `min_capacity + 1`.
    pub fn new(
        name: &str,
        substation: Point,
        turbines: Vec<Point>,
        mut cables: Vec<Cable>,
        min_capacity: usize,
        capacity: Option<usize>,
    ) -> Result<Instance, InstanceError> {
        let capacity = match capacity {
            None => min_capacity + 1,
            Some(requested) if requested < min_capacity => {
                return Err(InstanceError::CapacityBelowMinimum {
                    requested,
                    minimum: min_capacity,
                })
            }
            Some(requested) => requested,
        };

        if cables.is_empty() {
            return Err(InstanceError::NoCables);
        }
        cables.sort();

        let mut turbines: Vec<(f64, Point)> = turbines
            .into_iter()
            .map(|t| Point::new(t.x - substation.x, t.y - substation.y))
            .map(|t| (clockwise_angle(&t), t))
            .collect();
        turbines.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut position = Vec::with_capacity(turbines.len() + 1);
        position.push(Point::new(0.0, 0.0));
        position.extend(turbines.into_iter().map(|(_, t)| t));

        let distance = distance_matrix::build_cache(&position);
        let cable_indices = build_cable_indices(&cables);

        Ok(Instance {
            name: name.to_string(),
            delta: substation,
            position,
            distance,
            capacity,
            min_capacity,
            cables,
            cable_indices,
        })
    }

    /// Reads `<dir>/<name>.turb` and `<dir>/<name>.cable`.
    pub fn load(dir: &Path, name: &str, capacity: Option<usize>) -> Result<Instance, InstanceError> {
        let turb_path = dir.join(format!("{}.turb", name));
        let cable_path = dir.join(format!("{}.cable", name));

        let (substation, min_capacity, turbines) = read_turbines(&turb_path)?;
        let cables = read_cables(&cable_path)?;

        Instance::new(name, substation, turbines, cables, min_capacity, capacity)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of turbines
    pub fn n(&self) -> usize {
        self.position.len() - 1
    }

    /// Substation and turbines
    pub fn nodes(&self) -> Range<NodeID> {
        0..self.position.len()
    }

    pub fn turbines(&self) -> RangeInclusive<NodeID> {
        1..=self.n()
    }

    /// Substation capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Substation's original position
    pub fn delta(&self) -> Point {
        self.delta
    }

    pub fn position(&self, node: NodeID) -> &Point {
        &self.position[node]
    }

    #[cfg(test)]
    pub fn positions(&self) -> &[Point] {
        &self.position
    }

    pub fn distance(&self, a: NodeID, b: NodeID) -> f64 {
        self.distance[(a, b)]
    }

    pub fn distance_matrix(&self) -> &DistanceMatrix {
        &self.distance
    }

    pub fn cables(&self) -> &[Cable] {
        &self.cables
    }

    pub fn max_cable_capacity(&self) -> usize {
        self.cable_indices.len() - 1
    }

    /// Index of the first cable able to carry `power`. Powers above the
    /// largest capacity get the largest cable.
    pub fn cable_index(&self, power: usize) -> usize {
        self.cable_indices[power.min(self.max_cable_capacity())]
    }

    pub fn cable_price(&self, power: usize) -> f64 {
        self.cables[self.cable_index(power)].cost_per_meter as f64
    }
}

fn clockwise_angle(point: &Point) -> f64 {
    let angle = (-point.y).atan2(point.x);
    if angle < 0.0 {
        angle + 2.0 * PI
    } else {
        angle
    }
}

fn build_cable_indices(cables: &[Cable]) -> Vec<usize> {
    let max_capacity = cables[cables.len() - 1].capacity;
    let mut indices = vec![0; max_capacity + 1];

    let mut i = 0;
    for power in 1..=max_capacity {
        while cables[i].capacity < power {
            i += 1;
        }
        indices[power] = i;
    }

    indices
}

fn read_lines(path: &Path) -> Result<Vec<(usize, String)>, InstanceError> {
    let content = fs::read_to_string(path).map_err(|source| InstanceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty())
        .collect())
}

fn parse_field<T: FromStr>(
    path: &Path,
    line: usize,
    word: Option<&str>,
    what: &str,
) -> Result<T, InstanceError> {
    let parse_error = |reason: String| InstanceError::Parse {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let word = word.ok_or_else(|| parse_error(format!("missing {}", what)))?;
    word.parse()
        .map_err(|_| parse_error(format!("invalid {} '{}'", what, word)))
}

fn read_turbines(path: &Path) -> Result<(Point, usize, Vec<Point>), InstanceError> {
    let lines = read_lines(path)?;
    let mut lines = lines.iter();

    let (header_no, header) = lines
        .next()
        .ok_or_else(|| InstanceError::MissingHeader(path.to_path_buf()))?;

    let mut words = header.split_whitespace();
    let x: f64 = parse_field(path, *header_no, words.next(), "substation x")?;
    let y: f64 = parse_field(path, *header_no, words.next(), "substation y")?;
    let encoded: i64 = parse_field(path, *header_no, words.next(), "minimum capacity")?;

    // The header stores -(Cmin + 1)
    let min_capacity = (-encoded - 1).max(0) as usize;

    let mut turbines = Vec::with_capacity(lines.len());
    for (line_no, line) in lines {
        let mut words = line.split_whitespace();
        let x: f64 = parse_field(path, *line_no, words.next(), "turbine x")?;
        let y: f64 = parse_field(path, *line_no, words.next(), "turbine y")?;

        turbines.push(Point::new(x, y));
    }

    Ok((Point::new(x, y), min_capacity, turbines))
}

fn read_cables(path: &Path) -> Result<Vec<Cable>, InstanceError> {
    let mut cables = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let mut words = line.split_whitespace();

        cables.push(Cable {
            capacity: parse_field(path, line_no, words.next(), "capacity")?,
            cost_per_meter: parse_field(path, line_no, words.next(), "cost per meter")?,
            availability: parse_field(path, line_no, words.next(), "availability")?,
        });
    }

    Ok(cables)
}
