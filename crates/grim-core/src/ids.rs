use serde::{Deserialize, Serialize};
use std::fmt;

// Newtype wrappers for index sets. Both are dense 0-based ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(usize);

/// The reference node. Its PTDF column is identically zero.
pub const SLACK_NODE: NodeId = NodeId(0);

impl NodeId {
    #[inline]
    pub fn new(value: usize) -> Self {
        NodeId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
    /// Column label used by node-keyed tables ("0", "1", ...).
    pub fn label(&self) -> String {
        self.0.to_string()
    }
}

impl LineId {
    #[inline]
    pub fn new(value: usize) -> Self {
        LineId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Iterate the node index domain `0..n`.
pub fn node_range(n: usize) -> impl Iterator<Item = NodeId> {
    (0..n).map(NodeId::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_labels_match_table_headers() {
        assert_eq!(NodeId::new(7).label(), "7");
        assert_eq!(SLACK_NODE.value(), 0);
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&LineId::new(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn node_range_is_dense() {
        let nodes: Vec<usize> = node_range(3).map(|n| n.value()).collect();
        assert_eq!(nodes, vec![0, 1, 2]);
    }
}
