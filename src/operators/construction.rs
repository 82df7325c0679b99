use crate::{
    models::instance::{Edge, Instance, NodeID, SUBSTATION},
    operators::distance_matrix::DistanceMatrix,
};

/**
    Minimum spanning tree over `nodes`, grown from `start`.

    Every edge points from the newly attached node to its closest tree
    neighbour, so the result is a tree directed towards `start`. Growth stops
    once `size_limit` nodes are in the tree.
**/
pub fn prim(
    nodes: &[NodeID],
    distance: &DistanceMatrix,
    start: NodeID,
    size_limit: Option<usize>,
) -> Vec<Edge> {
    let limit = size_limit.unwrap_or(nodes.len()).min(nodes.len());

    let start_pos = match nodes.iter().position(|&node| node == start) {
        Some(pos) => pos,
        None => return Vec::new(),
    };

    // Closest tree node for every node still on the fringe
    let start_row = distance.row(start);
    let mut closest: Vec<(f64, NodeID)> = nodes.iter().map(|&node| (start_row[node], start)).collect();
    let mut in_tree = vec![false; nodes.len()];
    in_tree[start_pos] = true;

    let mut edges = Vec::with_capacity(limit.saturating_sub(1));

    while edges.len() + 1 < limit {
        let mut next: Option<usize> = None;
        for pos in 0..nodes.len() {
            if in_tree[pos] {
                continue;
            }
            match next {
                Some(best) if closest[best].0 <= closest[pos].0 => {}
                _ => next = Some(pos),
            }
        }

        let next = match next {
            Some(next) => next,
            None => break,
        };

        let node = nodes[next];
        in_tree[next] = true;
        edges.push((node, closest[next].1));

        let row = distance.row(node);
        for pos in 0..nodes.len() {
            if !in_tree[pos] && row[nodes[pos]] < closest[pos].0 {
                closest[pos] = (row[nodes[pos]], node);
            }
        }
    }

    edges
}

/// Turbines split into runs of `turbines_per_group` consecutive angular
/// positions, walking from `start` and wrapping around.
pub fn sweep_groups(
    n: usize,
    start: NodeID,
    clockwise: bool,
    turbines_per_group: usize,
) -> Vec<Vec<NodeID>> {
    let order: Vec<NodeID> = (0..n)
        .map(|k| {
            if clockwise {
                (start - 1 + k) % n + 1
            } else {
                (start - 1 + n - k) % n + 1
            }
        })
        .collect();

    order
        .chunks(turbines_per_group.max(1))
        .map(|group| group.to_vec())
        .collect()
}

/**
    Sweep construction: every angular group gets its own minimum spanning
    tree, rooted at the group's turbine closest to the substation, which in
    turn is connected to the substation.
**/
pub fn sweep(
    instance: &Instance,
    start: NodeID,
    clockwise: bool,
    turbines_per_group: usize,
) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(instance.n());

    for mut group in sweep_groups(instance.n(), start, clockwise, turbines_per_group) {
        group.sort_by(|&a, &b| {
            instance
                .distance(a, SUBSTATION)
                .total_cmp(&instance.distance(b, SUBSTATION))
        });

        edges.push((group[0], SUBSTATION));
        edges.extend(prim(&group, instance.distance_matrix(), group[0], None));
    }

    edges
}

/// Group sizes worth sweeping: from the smallest that can respect the
/// substation's capacity up to what the largest cable carries.
pub fn group_sizes(instance: &Instance) -> std::ops::RangeInclusive<usize> {
    let smallest = (instance.n() / instance.capacity().max(1)).max(1);
    smallest..=instance.max_cable_capacity()
}

/// Every `(start, clockwise, turbines_per_group)` sweep of the instance.
pub fn sweep_configurations(instance: &Instance) -> Vec<(NodeID, bool, usize)> {
    let mut configurations = Vec::new();

    for start in instance.turbines() {
        for &clockwise in &[false, true] {
            for turbines_per_group in group_sizes(instance) {
                configurations.push((start, clockwise, turbines_per_group));
            }
        }
    }

    configurations
}
