use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

use crate::{
    models::instance::{Cable, Instance, InstanceError},
    utilities::geometry::Point,
};

/// Parameters of a randomly scattered wind farm.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SyntheticFarm {
    pub turbines: usize,
    /// Standard deviation of the turbine coordinates, in meters.
    pub spread: f64,
    pub min_capacity: usize,
    pub seed: u64,
    pub cables: Vec<Cable>,
}

impl Default for SyntheticFarm {
    fn default() -> Self {
        SyntheticFarm {
            turbines: 40,
            spread: 1500.0,
            min_capacity: 4,
            seed: 0,
            cables: vec![
                Cable {
                    capacity: 5,
                    cost_per_meter: 90,
                    availability: 100,
                },
                Cable {
                    capacity: 8,
                    cost_per_meter: 120,
                    availability: 100,
                },
                Cable {
                    capacity: 12,
                    cost_per_meter: 190,
                    availability: 100,
                },
            ],
        }
    }
}

/// Turbine coordinates are normally distributed around the substation.
pub fn scatter(
    name: &str,
    farm: &SyntheticFarm,
    capacity: Option<usize>,
) -> Result<Instance, InstanceError> {
    let mut rng = StdRng::seed_from_u64(farm.seed);

    let coordinate = Normal::new(0.0, farm.spread)
        .map_err(|_| InstanceError::InvalidSpread(farm.spread))?;

    let turbines = (0..farm.turbines)
        .map(|_| {
            let x: f64 = coordinate.sample(&mut rng);
            let y: f64 = coordinate.sample(&mut rng);
            Point::new(x, y)
        })
        .collect();

    Instance::new(
        name,
        Point::new(0.0, 0.0),
        turbines,
        farm.cables.clone(),
        farm.min_capacity,
        capacity,
    )
}
