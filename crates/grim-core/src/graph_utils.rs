use crate::{LineRecord, NodeId};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;

/// Connectivity summary for a line list over the node domain `0..n`.
#[derive(Debug)]
pub struct TopologyStats {
    pub node_count: usize,
    pub line_count: usize,
    pub connected_components: usize,
    pub max_degree: usize,
}

fn build_graph(n_nodes: usize, lines: &[LineRecord]) -> UnGraph<(), ()> {
    let mut graph = UnGraph::<(), ()>::with_capacity(n_nodes, lines.len());
    for _ in 0..n_nodes {
        graph.add_node(());
    }
    for line in lines {
        let (a, b) = (line.from.value(), line.to.value());
        if a < n_nodes && b < n_nodes {
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }
    }
    graph
}

/// Nodes that no path of lines connects to `root` (breadth-first search).
///
/// Lines referencing out-of-range nodes are ignored here; range checks belong
/// to the caller.
pub fn unreachable_nodes(n_nodes: usize, lines: &[LineRecord], root: NodeId) -> Vec<NodeId> {
    if root.value() >= n_nodes {
        return (0..n_nodes).map(NodeId::new).collect();
    }
    let graph = build_graph(n_nodes, lines);
    let mut seen = vec![false; n_nodes];
    let mut bfs = Bfs::new(&graph, NodeIndex::new(root.value()));
    while let Some(ix) = bfs.next(&graph) {
        seen[ix.index()] = true;
    }
    seen.iter()
        .enumerate()
        .filter(|(_, reached)| !**reached)
        .map(|(i, _)| NodeId::new(i))
        .collect()
}

pub fn topology_stats(n_nodes: usize, lines: &[LineRecord]) -> TopologyStats {
    let graph = build_graph(n_nodes, lines);
    let max_degree = graph
        .node_indices()
        .map(|n| graph.neighbors(n).count())
        .max()
        .unwrap_or(0);
    TopologyStats {
        node_count: graph.node_count(),
        line_count: graph.edge_count(),
        connected_components: connected_components(&graph),
        max_degree,
    }
}
