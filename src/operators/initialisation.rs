use rayon::prelude::*;

use crate::{
    models::instance::{Edge, Instance, NodeID, SUBSTATION},
    operators::{
        construction::{prim, sweep, sweep_configurations},
        evaluation::Penalties,
        solution::Solution,
    },
};

pub trait InitPop<'a> {
    fn apply(&self, pop_size: usize) -> Vec<Solution<'a>>;
}

/**
    Population made of the cheapest distinct sweep layouts, topped up with
    the minimum spanning tree of the whole farm and the star.
**/
pub struct SweepInitialisation<'a> {
    instance: &'a Instance,
    penalties: Penalties,
}

impl<'a> SweepInitialisation<'a> {
    pub fn new(instance: &'a Instance, penalties: Penalties) -> SweepInitialisation<'a> {
        SweepInitialisation {
            instance,
            penalties,
        }
    }

    /// Every distinct sweep layout, edges sorted, cheapest first.
    fn ranked_sweeps(&self) -> Vec<(f64, Vec<Edge>)> {
        let instance = self.instance;
        let penalties = self.penalties;

        let mut layouts: Vec<Vec<Edge>> = sweep_configurations(instance)
            .par_iter()
            .map(|&(start, clockwise, turbines_per_group)| {
                let mut edges = sweep(instance, start, clockwise, turbines_per_group);
                edges.sort_unstable();
                edges
            })
            .collect();

        layouts.sort_unstable();
        layouts.dedup();

        let mut ranked: Vec<(f64, Vec<Edge>)> = layouts
            .into_par_iter()
            .map_init(
                || Solution::star(instance, penalties),
                |solution, edges| {
                    solution.build(&edges, false);
                    (solution.cost(false), edges)
                },
            )
            .collect();

        // Layouts are distinct, so ties on cost resolve on the edges
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        ranked
    }
}

impl<'a> InitPop<'a> for SweepInitialisation<'a> {
    fn apply(&self, pop_size: usize) -> Vec<Solution<'a>> {
        let instance = self.instance;
        let penalties = self.penalties;

        let mut layouts: Vec<Vec<Edge>> = self
            .ranked_sweeps()
            .into_iter()
            .take(pop_size.saturating_sub(2))
            .map(|(_, edges)| edges)
            .collect();

        let nodes: Vec<NodeID> = instance.nodes().collect();
        layouts.push(prim(&nodes, instance.distance_matrix(), SUBSTATION, None));
        layouts.push(Solution::star(instance, penalties).get_edges());
        layouts.truncate(pop_size);

        layouts
            .par_iter()
            .map(|edges| Solution::new(instance, penalties, edges))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_instances;

    #[test]
    fn test_population() {
        let instance = test_instances::scattered(15, 21);
        let init_pop = SweepInitialisation::new(&instance, Penalties::default());

        let population = init_pop.apply(10);
        assert_eq!(population.len(), 10);

        // Sweeps come first, cheapest first
        for pair in population[..8].windows(2) {
            assert!(pair[0].cost(false) <= pair[1].cost(false));
        }

        // The last individual is the star
        let star = &population[9];
        assert_eq!(star.substation_fanin(), instance.n());

        // The minimum spanning tree is the shortest possible layout
        let length = |solution: &Solution| -> f64 {
            solution
                .get_edges()
                .iter()
                .map(|&(child, parent)| instance.distance(child, parent))
                .sum()
        };
        let mst_length = length(&population[8]);
        for individual in &population {
            assert!(mst_length <= length(individual) + 1e-6);
        }
    }

    #[test]
    fn test_small_population() {
        let instance = test_instances::star(4);
        let init_pop = SweepInitialisation::new(&instance, Penalties::default());

        let population = init_pop.apply(1);
        assert_eq!(population.len(), 1);

        // Without room for sweeps only the minimum spanning tree remains
        let population = init_pop.apply(2);
        assert_eq!(population.len(), 2);
        assert_eq!(population[1].substation_fanin(), 4);
    }
}
