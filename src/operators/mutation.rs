use std::collections::BTreeSet;

use tracing::trace;

use crate::{
    models::instance::{Edge, NodeID, SUBSTATION},
    operators::{evaluation::improves, solution::Solution},
};

pub trait Mutation {
    fn apply(&self, solution: &mut Solution);
}

// Tries every `(child, new_parent)` pair, undoing each move, and keeps the
// cheapest layout found. Returns whether the solution changed.
fn apply_best_of<I>(solution: &mut Solution, moves: I) -> bool
where
    I: IntoIterator<Item = (NodeID, NodeID)>,
{
    let ignore_crossings = !solution.crossings_tracked();
    let mut best_cost = solution.cost(ignore_crossings);
    let mut best_edges = None;

    for (child, new_parent) in moves {
        if solution.is_node_in_branch(child, new_parent) {
            continue;
        }

        let snapshot = solution.relocate_saved(child, new_parent);
        let cost = solution.cost(ignore_crossings);

        if improves(cost, best_cost) {
            best_cost = cost;
            best_edges = Some(solution.get_edges());
        }

        solution.move_back(snapshot);
    }

    match best_edges {
        Some(edges) => {
            solution.build(&edges, ignore_crossings);
            true
        }
        None => false,
    }
}

/**
    Reconnects one node of a branch to another node of the same branch.

    Every such move over every branch is tried and the best one, if it
    improves the layout, is kept. Branch membership never changes.
**/
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleBranchTransposon;

impl Mutation for SingleBranchTransposon {
    fn apply(&self, solution: &mut Solution) {
        let mut moves = Vec::new();

        for root in solution.first_layer() {
            let branch = solution.get_branch_nodes(root);

            for &child in &branch {
                for &new_parent in &branch {
                    moves.push((child, new_parent));
                }
            }
        }

        if apply_best_of(solution, moves) {
            trace!(cost = solution.cost(false), "single branch transposon improved");
        }
    }
}

/**
    Reconnects a node of a branch outside that branch, to the substation
    or to a node of another branch.
**/
#[derive(Clone, Copy, Debug, Default)]
pub struct BetweenBranchesTransposon;

impl Mutation for BetweenBranchesTransposon {
    fn apply(&self, solution: &mut Solution) {
        let nodes = solution.instance().nodes();
        let mut moves = Vec::new();

        for root in solution.first_layer() {
            for child in solution.get_branch_nodes(root) {
                for new_parent in nodes.clone() {
                    if !solution.is_node_in_branch(root, new_parent) {
                        moves.push((child, new_parent));
                    }
                }
            }
        }

        if apply_best_of(solution, moves) {
            trace!(cost = solution.cost(false), "between branches transposon improved");
        }
    }
}

/**
    Grafts a donor fragment onto the solution.

    The donor edges are applied on top of a star; every other node is then
    reconnected to its previous parent wherever that keeps the layout a
    tree. Nodes touched by the donor keep the donor's wiring.
**/
#[derive(Clone, Copy, Debug)]
pub struct Plasmid<'a> {
    donor: &'a [Edge],
}

impl<'a> Plasmid<'a> {
    pub fn new(donor: &'a [Edge]) -> Plasmid<'a> {
        debug_assert!(
            donor.iter().all(|&(child, _)| child != SUBSTATION),
            "a donor fragment cannot move the substation"
        );

        Plasmid { donor }
    }
}

impl<'a> Mutation for Plasmid<'a> {
    fn apply(&self, solution: &mut Solution) {
        let ignore_crossings = !solution.crossings_tracked();
        let previous = solution.get_edges();

        let donated: BTreeSet<NodeID> = self
            .donor
            .iter()
            .flat_map(|&(child, parent)| vec![child, parent])
            .collect();

        solution.build(self.donor, ignore_crossings);

        for (child, parent) in previous {
            if !donated.contains(&child) && !solution.is_node_in_branch(child, parent) {
                solution.relocate(child, parent);
            }
        }

        trace!(
            donor_edges = self.donor.len(),
            cost = solution.cost(ignore_crossings),
            "plasmid applied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{instance::Instance, test_instances},
        operators::{construction::sweep, evaluation::Penalties},
        utilities::geometry::is_proper_tree,
    };

    fn assert_valid(solution: &Solution) {
        let children: Vec<_> = solution
            .instance()
            .nodes()
            .map(|node| solution.children(node).clone())
            .collect();
        assert!(is_proper_tree(&children, SUBSTATION));

        // Cached costs agree with a full recalculation
        let mut recalculated = solution.clone();
        let cost = recalculated.recalculate(false);
        assert!((solution.cost(false) - cost).abs() <= 1e-6 * cost.max(1.0));
    }

    fn branches(solution: &Solution) -> Vec<BTreeSet<NodeID>> {
        solution
            .first_layer()
            .into_iter()
            .map(|root| solution.get_branch_nodes(root).into_iter().collect())
            .collect()
    }

    fn sweep_solution(instance: &Instance) -> Solution<'_> {
        Solution::new(instance, Penalties::default(), &sweep(instance, 1, true, 4))
    }

    #[test]
    fn test_single_branch_keeps_branches() {
        let instance = test_instances::scattered(25, 3);
        let mut solution = sweep_solution(&instance);
        let before = solution.cost(false);
        let branches_before = branches(&solution);

        SingleBranchTransposon.apply(&mut solution);

        assert!(solution.cost(false) <= before);
        assert_eq!(branches(&solution), branches_before);
        assert_valid(&solution);
    }

    #[test]
    fn test_between_branches() {
        let instance = test_instances::scattered(25, 5);
        let mut solution = sweep_solution(&instance);

        for _ in 0..3 {
            let before = solution.cost(false);
            BetweenBranchesTransposon.apply(&mut solution);

            assert!(solution.cost(false) <= before);
            assert_valid(&solution);
        }
    }

    #[test]
    fn test_between_branches_relieves_substation() {
        let instance = test_instances::star(2);
        let mut solution = Solution::star(&instance, Penalties::default());
        assert_eq!(solution.cost(false), 40.0 + 2e9);

        BetweenBranchesTransposon.apply(&mut solution);

        assert_eq!(solution.substation_fanin(), 3);
        assert!(solution.cost(false) < 40.0 + 2e9);
    }

    #[test]
    fn test_single_branch_on_star_is_noop() {
        let instance = test_instances::star(4);
        let mut solution = Solution::star(&instance, Penalties::default());

        SingleBranchTransposon.apply(&mut solution);

        assert_eq!(solution.get_edges(), vec![(1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn test_plasmid_with_own_edges() {
        let instance = test_instances::scattered(20, 11);
        let mut solution = sweep_solution(&instance);
        let edges = solution.get_edges();
        let cost = solution.cost(false);

        Plasmid::new(&edges).apply(&mut solution);

        assert_eq!(solution.get_edges(), edges);
        assert!((solution.cost(false) - cost).abs() <= 1e-6 * cost);
    }

    #[test]
    fn test_plasmid_grafts_donor() {
        let instance = test_instances::scattered(20, 13);
        let mut solution = sweep_solution(&instance);

        let donor_solution = Solution::new(&instance, Penalties::default(), &sweep(&instance, 7, false, 3));
        let root = donor_solution.first_layer()[0];
        let donor = donor_solution.cut_branch(root);

        Plasmid::new(&donor).apply(&mut solution);

        for &(child, parent) in &donor {
            assert_eq!(solution.parent(child), parent);
        }
        assert_valid(&solution);
    }

    #[test]
    fn test_plasmid_restores_untouched_edges() {
        let instance = test_instances::star(4);
        let mut solution = Solution::new(
            &instance,
            Penalties::default(),
            &[(1, 0), (2, 1), (3, 2), (4, 0)],
        );

        // 1 follows the donor instead of its old edge (1, 0). 3 only appears
        // as a donor parent, so it stays on the substation and its old edge
        // (3, 2), which would now close a cycle through 2 and 1, is dropped.
        // 2 and 4 were not touched and get their old parents back.
        Plasmid::new(&[(1, 3)]).apply(&mut solution);

        assert_eq!(solution.get_edges(), vec![(1, 3), (2, 1), (3, 0), (4, 0)]);
        assert_valid(&solution);
    }

    #[test]
    fn test_plasmid_partial_donor() {
        let instance = test_instances::scattered(20, 17);

        for (start, clockwise, tpg) in vec![(1, true, 4), (5, false, 6), (11, true, 3)] {
            let mut solution = sweep_solution(&instance);
            let previous = solution.get_edges();

            let other = Solution::new(&instance, Penalties::default(), &sweep(&instance, start, clockwise, tpg));
            let donor: Vec<Edge> = other
                .first_layer()
                .into_iter()
                .flat_map(|root| other.cut_branch(root))
                .take(5)
                .collect();
            assert!(!donor.is_empty());

            let donated: BTreeSet<NodeID> = donor.iter().flat_map(|&(c, p)| vec![c, p]).collect();
            let donor_children: BTreeSet<NodeID> = donor.iter().map(|&(c, _)| c).collect();

            Plasmid::new(&donor).apply(&mut solution);

            // Donor wiring wins
            for &(child, parent) in &donor {
                assert_eq!(solution.parent(child), parent);
            }
            // Fragment roots are left on the substation
            for &node in donated.difference(&donor_children) {
                assert_eq!(solution.parent(node), SUBSTATION);
            }
            // Everything else is reconnected as before
            for &(child, parent) in &previous {
                if !donated.contains(&child) {
                    assert_eq!(solution.parent(child), parent);
                }
            }
            assert_valid(&solution);
        }
    }

    #[test]
    fn test_plasmid_keeps_ignored_crossings() {
        let instance = test_instances::scattered(15, 2);
        let mut solution = Solution::star(&instance, Penalties::default());
        solution.build(&sweep(&instance, 1, true, 3), true);

        let donor = vec![(2, 1), (3, 2)];
        Plasmid::new(&donor).apply(&mut solution);

        assert!(!solution.crossings_tracked());
        assert_eq!(solution.crossing_count(), 0);
    }
}
