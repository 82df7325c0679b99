use std::collections::HashSet;

use rand::prelude::*;

use crate::{
    models::instance::{Edge, Instance, NodeID, SUBSTATION},
    operators::{construction::prim, solution::Solution},
};

/**
    Archive of tree fragments the plasmid operator grafts onto solutions.

    Fragments are stored with their edges sorted, so the same fragment
    harvested twice is only kept once. Empty fragments carry no
    information and are never stored.
**/
#[derive(Clone, Debug, Default)]
pub struct HostRepository {
    fragments: Vec<Vec<Edge>>,
    seen: HashSet<Vec<Edge>>,
}

impl HostRepository {
    pub fn new() -> HostRepository {
        HostRepository::default()
    }

    /**
        Seeds the repository with a size-bounded minimum spanning fragment
        grown from every node, plus every branch of `seed_solution`.

        Fragments grown from a turbine only span turbines, so no fragment
        ever reconnects the substation.
    **/
    pub fn initialise(instance: &Instance, branch_size: usize, seed_solution: &Solution) -> HostRepository {
        let mut repository = HostRepository::new();

        let all_nodes: Vec<NodeID> = instance.nodes().collect();
        let turbines: Vec<NodeID> = instance.turbines().collect();

        for start in instance.nodes() {
            let nodes = if start == SUBSTATION { &all_nodes } else { &turbines };
            repository.try_push(prim(nodes, instance.distance_matrix(), start, Some(branch_size)));
        }

        for root in seed_solution.first_layer() {
            repository.try_push(seed_solution.cut_branch(root));
        }

        repository
    }

    /// Stores `fragment` unless it is empty or already known.
    pub fn try_push(&mut self, mut fragment: Vec<Edge>) -> bool {
        debug_assert!(
            fragment.iter().all(|&(child, _)| child != SUBSTATION),
            "a fragment cannot move the substation"
        );

        if fragment.is_empty() {
            return false;
        }

        fragment.sort_unstable();
        if !self.seen.insert(fragment.clone()) {
            return false;
        }

        self.fragments.push(fragment);
        true
    }

    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<&[Edge]> {
        self.fragments.choose(rng).map(|fragment| fragment.as_slice())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::test_instances,
        operators::{construction::sweep, evaluation::Penalties},
    };

    #[test]
    fn test_try_push() {
        let mut repository = HostRepository::new();

        assert!(repository.try_push(vec![(2, 1), (3, 2)]));
        assert!(!repository.try_push(vec![(3, 2), (2, 1)]));
        assert!(!repository.try_push(Vec::new()));
        assert!(repository.try_push(vec![(3, 1)]));

        assert_eq!(repository.len(), 2);
    }

    #[test]
    fn test_choose() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut repository = HostRepository::new();
        assert!(repository.choose(&mut rng).is_none());

        repository.try_push(vec![(4, 3)]);
        assert_eq!(repository.choose(&mut rng), Some(&[(4, 3)][..]));
    }

    #[test]
    fn test_initialise() {
        let instance = test_instances::scattered(12, 4);
        let seed_solution = Solution::new(&instance, Penalties::default(), &sweep(&instance, 1, true, 4));

        let repository = HostRepository::initialise(&instance, 4, &seed_solution);

        assert!(!repository.is_empty());
        for fragment in &repository.fragments {
            assert!(!fragment.is_empty());
            assert!(fragment.iter().all(|&(child, _)| child != SUBSTATION));

            // Prim fragments of four nodes and branches of groups of four
            assert!(fragment.len() <= 3);
        }
    }
}
