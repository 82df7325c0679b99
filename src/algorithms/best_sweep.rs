use rayon::prelude::*;
use tracing::debug;

use crate::{
    models::instance::{Edge, Instance},
    operators::{
        construction::{sweep, sweep_configurations},
        evaluation::Penalties,
        solution::Solution,
    },
};

/**
    Cheapest sweep layout over every start turbine, direction and group
    size, ignoring crossings. Equal costs resolve to the configuration
    enumerated first, so the result does not depend on scheduling.
**/
pub fn best_sweep(instance: &Instance, penalties: Penalties) -> Vec<Edge> {
    let configurations = sweep_configurations(instance);

    let best = configurations
        .par_iter()
        .enumerate()
        .map_init(
            || Solution::star(instance, penalties),
            |solution, (index, &(start, clockwise, turbines_per_group))| {
                let edges = sweep(instance, start, clockwise, turbines_per_group);
                solution.build(&edges, true);
                (solution.cost(true), index, edges)
            },
        )
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    match best {
        Some((cost, index, edges)) => {
            let (start, clockwise, turbines_per_group) = configurations[index];
            debug!(cost, start, clockwise, turbines_per_group, "best sweep");
            edges
        }
        None => Solution::star(instance, penalties).get_edges(),
    }
}
