use serde::{Deserialize, Serialize};

/// Relative tolerance under which two costs are considered equal. Cable
/// costs are maintained incrementally, so they drift by a few ulps.
pub const COST_TOLERANCE: f64 = 1e-9;

/**
    Weights of the soft constraints.

    - `cable_overflow` (M1): per unit of power above the largest cable.
    - `substation_overflow` (M2): per connection above the substation's capacity.
    - `crossing` (M3): per pair of crossing cables.
    - `reserved` (M4): carried in configuration, not part of any cost term.
**/
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Penalties {
    pub cable_overflow: f64,
    pub substation_overflow: f64,
    pub crossing: f64,
    pub reserved: f64,
}

impl Default for Penalties {
    fn default() -> Self {
        Penalties {
            cable_overflow: 1e9,
            substation_overflow: 1e9,
            crossing: 1e9,
            reserved: 1e10,
        }
    }
}

impl Penalties {
    pub fn overflow_cost(&self, overflow: usize) -> f64 {
        self.cable_overflow * overflow as f64
    }

    pub fn fanin_cost(&self, fanin: usize, capacity: usize) -> f64 {
        self.substation_overflow * fanin.saturating_sub(capacity) as f64
    }

    pub fn crossing_cost(&self, crossings: usize) -> f64 {
        self.crossing * crossings as f64
    }
}

/// True if `candidate` is strictly cheaper than `incumbent`, beyond the
/// floating point noise of incremental updates.
pub fn improves(candidate: f64, incumbent: f64) -> bool {
    candidate < incumbent - COST_TOLERANCE * incumbent.abs().max(1.0)
}
