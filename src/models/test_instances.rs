//! Small hand-built farms shared by the unit tests.

use std::f64::consts::PI;

use crate::{
    models::{
        generator::{self, SyntheticFarm},
        instance::{Cable, Instance},
    },
    utilities::geometry::Point,
};

fn cable(capacity: usize, cost_per_meter: usize) -> Cable {
    Cable {
        capacity,
        cost_per_meter,
        availability: 100,
    }
}

fn cross() -> Vec<Point> {
    vec![
        Point::new(10.0, 0.0),
        Point::new(0.0, 10.0),
        Point::new(-10.0, 0.0),
        Point::new(0.0, -10.0),
    ]
}

/// Four turbines 10m away from the substation along the axes, one cable
/// of capacity 4 at 1 per meter.
pub fn star(substation_capacity: usize) -> Instance {
    star_with_cable(4, substation_capacity)
}

pub fn star_with_cable(cable_capacity: usize, substation_capacity: usize) -> Instance {
    Instance::new(
        "star",
        Point::new(0.0, 0.0),
        cross(),
        vec![cable(cable_capacity, 1)],
        0,
        Some(substation_capacity),
    )
    .unwrap()
}

pub fn with_cables(cables: Vec<Cable>) -> Instance {
    Instance::new("cables", Point::new(0.0, 0.0), cross(), cables, 0, Some(4)).unwrap()
}

/// `n` turbines evenly spaced on a circle around the substation.
pub fn ring(n: usize, radius: f64, cable_capacity: usize, substation_capacity: usize) -> Instance {
    let turbines = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    Instance::new(
        "ring",
        Point::new(0.0, 0.0),
        turbines,
        vec![cable(cable_capacity, 1)],
        0,
        Some(substation_capacity),
    )
    .unwrap()
}

pub fn scattered(n: usize, seed: u64) -> Instance {
    let farm = SyntheticFarm {
        turbines: n,
        spread: 100.0,
        min_capacity: 2,
        seed,
        cables: vec![cable(3, 10), cable(6, 15), cable(10, 25)],
    };

    generator::scatter("scattered", &farm, None).unwrap()
}
