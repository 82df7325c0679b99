use crate::{
    models::instance::NodeID,
    operators::{evaluation::improves, solution::Solution},
};

pub trait NeighbourGenerator {
    /// Moves to a neighbouring layout; false once no neighbour is accepted.
    fn step(&self, solution: &mut Solution) -> bool;
}

/**
    Scans every `(turbine, new_parent)` relocation outside the turbine's own
    subtree and applies the strictly best one, if it improves the layout.
**/
#[derive(Clone, Copy, Debug, Default)]
pub struct BestImprovingMove;

impl NeighbourGenerator for BestImprovingMove {
    fn step(&self, solution: &mut Solution) -> bool {
        let ignore_crossings = !solution.crossings_tracked();
        let mut best_cost = solution.cost(ignore_crossings);
        let mut best_move: Option<(NodeID, NodeID)> = None;

        let instance = solution.instance();
        for child in instance.turbines() {
            for new_parent in instance.nodes() {
                if solution.is_node_in_branch(child, new_parent) {
                    continue;
                }

                let snapshot = solution.relocate_saved(child, new_parent);
                let cost = solution.cost(ignore_crossings);
                solution.move_back(snapshot);

                if improves(cost, best_cost) {
                    best_cost = cost;
                    best_move = Some((child, new_parent));
                }
            }
        }

        match best_move {
            Some((child, new_parent)) => {
                solution.relocate(child, new_parent);
                true
            }
            None => false,
        }
    }
}

/// Steps until the generator finds nothing better. Returns the number of
/// accepted moves.
pub fn hill_climb<N: NeighbourGenerator>(neighbour_gen: &N, solution: &mut Solution) -> usize {
    let mut moves = 0;

    while neighbour_gen.step(solution) {
        moves += 1;
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::test_instances,
        operators::{construction::sweep, evaluation::Penalties},
    };

    #[test]
    fn test_star_is_optimal() {
        let instance = test_instances::star(4);
        let mut solution = Solution::star(&instance, Penalties::default());

        assert_eq!(hill_climb(&BestImprovingMove, &mut solution), 0);
        assert_eq!(solution.cost(false), 40.0);
        assert_eq!(solution.crossing_count(), 0);
        assert_eq!(solution.overflow(), 0);
    }

    #[test]
    fn test_star_over_capacity() {
        let instance = test_instances::star(2);
        let mut solution = Solution::star(&instance, Penalties::default());
        assert_eq!(solution.cost(false), 40.0 + 2e9);

        let moves = hill_climb(&BestImprovingMove, &mut solution);

        assert_eq!(moves, 2);
        assert_eq!(solution.substation_fanin(), 2);
        assert_eq!(solution.crossing_count(), 0);

        let expected = 20.0 + 2.0 * 200f64.sqrt();
        assert!((solution.cost(false) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_hill_climb_reaches_local_optimum() {
        let instance = test_instances::scattered(20, 9);
        let mut solution = Solution::new(&instance, Penalties::default(), &sweep(&instance, 3, false, 5));
        let before = solution.cost(false);

        hill_climb(&BestImprovingMove, &mut solution);

        assert!(solution.cost(false) <= before);
        assert!(!BestImprovingMove.step(&mut solution));

        let cost = solution.cost(false);
        assert!((solution.recalculate(false) - cost).abs() <= 1e-6 * cost);
    }
}
