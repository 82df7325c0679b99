use std::{
    fs::File,
    io::{self, prelude::*, BufReader},
    path::Path,
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{models::instance::Edge, operators::solution::Solution, utilities::geometry::Point};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout file error: {0}")]
    Io(#[from] io::Error),
    #[error("layout encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Outcome of one optimisation run, as persisted in the results folder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    pub instance: String,
    pub seed: u64,
    /// RFC 3339 local time at which the run started.
    pub started_at: String,
    pub elapsed_secs: f64,
    /// Absolute position of the substation; node positions are relative to it.
    pub substation: Point,
    pub cost: f64,
    pub cable_cost: f64,
    pub length_cost: f64,
    /// Units of power above the largest cable's capacity.
    pub overflow: usize,
    pub crossings: usize,
    pub fanin: usize,
    pub edges: Vec<Edge>,
}

impl LayoutRecord {
    pub fn new(
        solution: &Solution,
        seed: u64,
        started_at: DateTime<Local>,
        elapsed_secs: f64,
    ) -> LayoutRecord {
        LayoutRecord {
            instance: solution.instance().name().to_string(),
            seed,
            started_at: started_at.to_rfc3339(),
            elapsed_secs,
            substation: solution.instance().delta(),
            cost: solution.cost(false),
            cable_cost: solution.cable_cost(),
            length_cost: solution.length_cost(),
            overflow: solution.overflow(),
            crossings: solution.crossing_count(),
            fanin: solution.substation_fanin(),
            edges: solution.get_edges(),
        }
    }

    pub fn save<W: Write>(&self, mut writer: W) -> Result<(), LayoutError> {
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<LayoutRecord, LayoutError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    /// One `child parent` line per edge.
    pub fn write_edges<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (child, parent) in &self.edges {
            writeln!(writer, "{} {}", child, parent)?;
        }

        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::test_instances, operators::evaluation::Penalties};

    #[test]
    fn test_save_and_load() {
        let instance = test_instances::star(4);
        let solution = Solution::new(
            &instance,
            Penalties::default(),
            &[(1, 0), (2, 1), (3, 0), (4, 3)],
        );

        let record = LayoutRecord::new(&solution, 7, Local::now(), 1.5);
        assert_eq!(record.instance, "star");
        assert_eq!(record.fanin, 2);
        assert_eq!(record.overflow, 0);
        assert_eq!(record.length_cost, record.cable_cost);
        assert_eq!(record.substation, Point::new(0.0, 0.0));
        assert_eq!(record.edges, vec![(1, 0), (2, 1), (3, 0), (4, 3)]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.dat");
        record.save(File::create(&path).unwrap()).unwrap();

        assert_eq!(LayoutRecord::load(&path).unwrap(), record);
    }

    #[test]
    fn test_write_edges() {
        let instance = test_instances::star(4);
        let solution = Solution::star(&instance, Penalties::default());
        let record = LayoutRecord::new(&solution, 0, Local::now(), 0.0);

        let mut out = Vec::new();
        record.write_edges(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "1 0\n2 0\n3 0\n4 0\n");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            LayoutRecord::load(&dir.path().join("missing.dat")),
            Err(LayoutError::Io(_))
        ));
    }
}
