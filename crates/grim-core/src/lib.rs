//! # grim-core: shared data model for GRIM capacity-expansion runs
//!
//! Provides the index newtypes, the in-memory input/output tables exchanged
//! between the I/O layer and the optimization core, topology helpers, and the
//! unified [`GrimError`].
//!
//! ## Index domains
//!
//! - Nodes are dense ordinals `0..N`; node `0` is the slack ([`SLACK_NODE`]).
//! - Lines are dense ordinals in topology-table row order.
//! - Technologies are referenced by name and resolved to ordinals by the
//!   parameter assembler in `grim-algo`.
//!
//! ## Example
//!
//! ```rust
//! use grim_core::{LineRecord, NodeId, graph_utils};
//!
//! let lines = vec![LineRecord::new(0, 1, 0.1, 100.0, 50.0)];
//! assert!(graph_utils::unreachable_nodes(2, &lines, NodeId::new(0)).is_empty());
//! ```

pub mod error;
pub mod graph_utils;
pub mod ids;
pub mod tables;

pub use error::{GrimError, GrimResult};
pub use ids::{node_range, LineId, NodeId, SLACK_NODE};
pub use tables::{
    CapacityTable, InputTables, LineCapacityTable, LineRecord, ParameterTable, RunSummary,
    TimeSeriesTable,
};
