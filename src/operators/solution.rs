use std::collections::BTreeSet;

use crate::{
    models::instance::{Edge, Instance, NodeID, SUBSTATION},
    operators::evaluation::Penalties,
    utilities::geometry::{is_proper_tree, segments_intersect},
};

/**
    A cable layout: a tree over the substation and the turbines, rooted at
    the substation.

    Every cost component is cached and kept up to date by `relocate`, so a
    speculative move costs O(n) instead of the O(n²) of a full rebuild. The
    layout is assumed to always be a proper tree; callers are responsible for
    never relocating a node into its own subtree.
**/
#[derive(Clone, Debug)]
pub struct Solution<'a> {
    instance: &'a Instance,
    penalties: Penalties,
    parent: Vec<NodeID>,
    children: Vec<BTreeSet<NodeID>>,
    power: Vec<usize>,
    length_cost: f64,
    overflow: usize,
    fanin: usize,
    crossings: usize,
    track_crossings: bool,
}

/// State needed to undo exactly one relocation.
#[must_use = "a saved relocation can only be undone with its snapshot"]
#[derive(Clone, Debug)]
pub struct Snapshot {
    child: NodeID,
    parent: NodeID,
    power: Vec<usize>,
    length_cost: f64,
    overflow: usize,
    fanin: usize,
    crossings: usize,
}

impl<'a> Solution<'a> {
    pub fn new(instance: &'a Instance, penalties: Penalties, edges: &[Edge]) -> Solution<'a> {
        let mut solution = Solution::star(instance, penalties);
        solution.build(edges, false);
        solution
    }

    /// Every turbine connected straight to the substation.
    pub fn star(instance: &'a Instance, penalties: Penalties) -> Solution<'a> {
        let size = instance.nodes().len();

        let mut solution = Solution {
            instance,
            penalties,
            parent: vec![SUBSTATION; size],
            children: vec![BTreeSet::new(); size],
            power: vec![0; size],
            length_cost: 0.0,
            overflow: 0,
            fanin: 0,
            crossings: 0,
            track_crossings: true,
        };

        solution.children[SUBSTATION] = instance.turbines().collect();
        solution.recalculate(false);
        solution
    }

    /**
        Replaces the whole tree with `edges`, given as `(child, parent)`
        pairs. Turbines without an edge hang off the substation.

        With `ignore_crossings` the crossing count is neither computed nor
        maintained by later moves until the next full `recalculate`.
    **/
    pub fn build(&mut self, edges: &[Edge], ignore_crossings: bool) {
        for parent in self.parent.iter_mut() {
            *parent = SUBSTATION;
        }
        for &(child, parent) in edges {
            self.parent[child] = parent;
        }

        for children in self.children.iter_mut() {
            children.clear();
        }
        for node in self.instance.turbines() {
            self.children[self.parent[node]].insert(node);
        }

        debug_assert!(
            is_proper_tree(&self.children, SUBSTATION),
            "edges do not form a spanning tree"
        );

        if ignore_crossings {
            self.crossings = 0;
            self.track_crossings = false;
        }

        self.recalculate(ignore_crossings);
    }

    /// Recomputes power and every cost component from scratch.
    pub fn recalculate(&mut self, ignore_crossings: bool) -> f64 {
        self.recalculate_power();

        self.length_cost = 0.0;
        self.overflow = 0;
        for node in self.instance.turbines() {
            let (length_cost, overflow) = self.edge_price(node, self.parent[node], self.power[node]);

            self.length_cost += length_cost;
            self.overflow += overflow;
        }

        self.fanin = self.children[SUBSTATION].len();

        if !ignore_crossings {
            self.crossings = self.count_crossings();
            self.track_crossings = true;
        }

        self.cost(ignore_crossings)
    }

    pub fn cost(&self, ignore_crossings: bool) -> f64 {
        let cost = self.cable_cost()
            + self
                .penalties
                .fanin_cost(self.fanin, self.instance.capacity());

        if ignore_crossings {
            cost
        } else {
            cost + self.penalties.crossing_cost(self.crossings)
        }
    }

    /// Cable lengths times price plus the overflow penalty.
    pub fn cable_cost(&self) -> f64 {
        self.length_cost + self.penalties.overflow_cost(self.overflow)
    }

    pub fn length_cost(&self) -> f64 {
        self.length_cost
    }

    /// Units of power carried above the largest cable's capacity, summed
    /// over all edges.
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    pub fn crossing_count(&self) -> usize {
        self.crossings
    }

    pub fn crossings_tracked(&self) -> bool {
        self.track_crossings
    }

    pub fn substation_fanin(&self) -> usize {
        self.fanin
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub fn parent(&self, node: NodeID) -> NodeID {
        self.parent[node]
    }

    pub fn children(&self, node: NodeID) -> &BTreeSet<NodeID> {
        &self.children[node]
    }

    /// Roots of the branches, i.e. the nodes connected to the substation.
    pub fn first_layer(&self) -> Vec<NodeID> {
        self.children[SUBSTATION].iter().cloned().collect()
    }

    pub fn power(&self, node: NodeID) -> usize {
        self.power[node]
    }

    #[cfg(test)]
    pub fn powers(&self) -> &[usize] {
        &self.power
    }

    /// `(node, parent)` for every turbine, in node order.
    pub fn get_edges(&self) -> Vec<Edge> {
        self.instance
            .turbines()
            .map(|node| (node, self.parent[node]))
            .collect()
    }

    /// Disconnects `child` from its parent and connects it to `new_parent`.
    ///
    /// `new_parent` must not be in the subtree of `child`.
    pub fn relocate(&mut self, child: NodeID, new_parent: NodeID) {
        debug_assert!(child != SUBSTATION, "the substation cannot be relocated");
        debug_assert!(
            !self.is_node_in_branch(child, new_parent),
            "relocating {} under {} creates a cycle",
            child,
            new_parent
        );

        let old_parent = self.parent[child];
        let moved = self.power[child];

        self.remove_edge_cost(child, old_parent, moved);
        let mut node = old_parent;
        while node != SUBSTATION {
            let next = self.parent[node];
            let power = self.power[node];

            self.remove_edge_cost(node, next, power);
            self.power[node] = power - moved;
            self.add_edge_cost(node, next, power - moved);

            node = next;
        }

        self.add_edge_cost(child, new_parent, moved);
        let mut node = new_parent;
        while node != SUBSTATION {
            let next = self.parent[node];
            let power = self.power[node];

            self.remove_edge_cost(node, next, power);
            self.power[node] = power + moved;
            self.add_edge_cost(node, next, power + moved);

            node = next;
        }

        if old_parent == SUBSTATION {
            self.fanin -= 1;
        }
        if new_parent == SUBSTATION {
            self.fanin += 1;
        }

        if self.track_crossings {
            let (removed, added) = self.crossing_delta(child, old_parent, new_parent);
            self.crossings = self.crossings + added - removed;
        }

        self.children[old_parent].remove(&child);
        self.parent[child] = new_parent;
        self.children[new_parent].insert(child);
    }

    /// Same as `relocate`, returning what `move_back` needs to undo it.
    pub fn relocate_saved(&mut self, child: NodeID, new_parent: NodeID) -> Snapshot {
        let snapshot = Snapshot {
            child,
            parent: self.parent[child],
            power: self.power.clone(),
            length_cost: self.length_cost,
            overflow: self.overflow,
            fanin: self.fanin,
            crossings: self.crossings,
        };

        self.relocate(child, new_parent);
        snapshot
    }

    pub fn move_back(&mut self, snapshot: Snapshot) {
        let child = snapshot.child;
        let current = self.parent[child];

        self.children[current].remove(&child);
        self.parent[child] = snapshot.parent;
        self.children[snapshot.parent].insert(child);

        self.power = snapshot.power;
        self.length_cost = snapshot.length_cost;
        self.overflow = snapshot.overflow;
        self.fanin = snapshot.fanin;
        self.crossings = snapshot.crossings;
    }

    /// Is `node` in the subtree rooted at `root`.
    pub fn is_node_in_branch(&self, root: NodeID, mut node: NodeID) -> bool {
        loop {
            if node == root {
                return true;
            }
            if node == SUBSTATION {
                return false;
            }
            node = self.parent[node];
        }
    }

    /// Nodes of the subtree rooted at `root` in depth-first pre-order,
    /// children visited in ascending order.
    pub fn get_branch_nodes(&self, root: NodeID) -> Vec<NodeID> {
        let mut nodes = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            nodes.push(node);
            stack.extend(self.children[node].iter().rev());
        }

        nodes
    }

    /// Edges below `root`, excluding the one connecting `root` itself.
    pub fn cut_branch(&self, root: NodeID) -> Vec<Edge> {
        self.get_branch_nodes(root)
            .into_iter()
            .skip(1)
            .map(|node| (node, self.parent[node]))
            .collect()
    }

    fn recalculate_power(&mut self) {
        for (node, power) in self.power.iter_mut().enumerate() {
            *power = if node == SUBSTATION { 0 } else { 1 };
        }

        for node in self.get_branch_nodes(SUBSTATION).into_iter().rev() {
            if node != SUBSTATION {
                let parent = self.parent[node];
                self.power[parent] += self.power[node];
            }
        }
    }

    fn edge_price(&self, child: NodeID, parent: NodeID, power: usize) -> (f64, usize) {
        let length_cost = self.instance.distance(child, parent) * self.instance.cable_price(power);
        let overflow = power.saturating_sub(self.instance.max_cable_capacity());

        (length_cost, overflow)
    }

    fn add_edge_cost(&mut self, child: NodeID, parent: NodeID, power: usize) {
        let (length_cost, overflow) = self.edge_price(child, parent, power);

        self.length_cost += length_cost;
        self.overflow += overflow;
    }

    fn remove_edge_cost(&mut self, child: NodeID, parent: NodeID, power: usize) {
        let (length_cost, overflow) = self.edge_price(child, parent, power);

        self.length_cost -= length_cost;
        self.overflow -= overflow;
    }

    fn crosses(&self, a1: NodeID, b1: NodeID, a2: NodeID, b2: NodeID) -> bool {
        segments_intersect(
            self.instance.position(a1),
            self.instance.position(b1),
            self.instance.position(a2),
            self.instance.position(b2),
        )
    }

    fn count_crossings(&self) -> usize {
        let edges = self.get_edges();
        let mut crossings = 0;

        for i in 0..edges.len() {
            let (a1, b1) = edges[i];

            for &(a2, b2) in &edges[i + 1..] {
                if a1 != a2 && a1 != b2 && b1 != a2 && b1 != b2 && self.crosses(a1, b1, a2, b2) {
                    crossings += 1;
                }
            }
        }

        crossings
    }

    // Crossings lost by the edge (child, old_parent) and gained by the edge
    // (child, new_parent), against every edge sharing no endpoint with them.
    // The subtree of `child` keeps its parents, so one pass serves both.
    fn crossing_delta(&self, child: NodeID, old_parent: NodeID, new_parent: NodeID) -> (usize, usize) {
        let mut removed = 0;
        let mut added = 0;

        for node in self.instance.turbines() {
            let parent = self.parent[node];
            if node == child || parent == child {
                continue;
            }

            if node != old_parent && parent != old_parent && self.crosses(child, old_parent, node, parent) {
                removed += 1;
            }
            if node != new_parent && parent != new_parent && self.crosses(child, new_parent, node, parent) {
                added += 1;
            }
        }

        (removed, added)
    }
}
