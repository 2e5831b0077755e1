//! In-memory tables exchanged between the I/O layer and the optimization core.
//!
//! Input tables are read-only for the duration of a run. Output tables are
//! produced once from a solved model and handed to a sink.

use crate::{GrimError, GrimResult, LineId, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A numeric table keyed by a row label, with named columns.
///
/// Used for the technoeconomic parameters (rows = technologies), the
/// existing-capacity table (rows = nodes, columns = technologies) and the
/// land-area table (rows = nodes). Empty cells are stored as `None`.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    columns: Vec<String>,
    keys: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
    column_to_idx: HashMap<String, usize>,
    key_to_idx: HashMap<String, usize>,
}

impl ParameterTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let column_to_idx = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            columns,
            column_to_idx,
            ..Self::default()
        }
    }

    /// Append a row. The row key must be unique and the width must match.
    pub fn push_row(
        &mut self,
        key: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> GrimResult<()> {
        let key = key.into();
        if values.len() != self.columns.len() {
            return Err(GrimError::Validation(format!(
                "row '{}' has {} values, expected {}",
                key,
                values.len(),
                self.columns.len()
            )));
        }
        if self.key_to_idx.contains_key(&key) {
            return Err(GrimError::Validation(format!("duplicate row key '{}'", key)));
        }
        self.key_to_idx.insert(key.clone(), self.keys.len());
        self.keys.push(key);
        self.values.push(values);
        Ok(())
    }

    pub fn get(&self, key: &str, column: &str) -> Option<f64> {
        let row = *self.key_to_idx.get(key)?;
        let col = *self.column_to_idx.get(column)?;
        self.values[row][col]
    }

    pub fn has_row(&self, key: &str) -> bool {
        self.key_to_idx.contains_key(key)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn num_rows(&self) -> usize {
        self.keys.len()
    }
}

/// Hourly series stored column-major: one column per node label.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesTable {
    columns: HashMap<String, Vec<f64>>,
    num_rows: usize,
}

impl TimeSeriesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. All columns must share a length.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> GrimResult<()> {
        let name = name.into();
        if !self.columns.is_empty() && values.len() != self.num_rows {
            return Err(GrimError::Validation(format!(
                "column '{}' has {} rows, expected {}",
                name,
                values.len(),
                self.num_rows
            )));
        }
        self.num_rows = values.len();
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn node(&self, node: NodeId) -> Option<&[f64]> {
        self.column(&node.label())
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }
}

/// One row of the transmission topology table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    #[serde(rename = "region1")]
    pub from: NodeId,
    #[serde(rename = "region2")]
    pub to: NodeId,
    /// Series reactance; only used for the PTDF
    #[serde(rename = "x")]
    pub reactance: f64,
    /// Existing thermal capacity (MW)
    pub capacity: f64,
    /// Route length (km), drives incremental transmission cost
    pub length: f64,
}

impl LineRecord {
    pub fn new(from: usize, to: usize, reactance: f64, capacity: f64, length: f64) -> Self {
        Self {
            from: NodeId::new(from),
            to: NodeId::new(to),
            reactance,
            capacity,
            length,
        }
    }
}

/// Every table the optimization core consumes for one run.
#[derive(Debug, Clone, Default)]
pub struct InputTables {
    /// Rows = technology names
    pub techno_economic: ParameterTable,
    /// Rows = node labels, columns = technology names
    pub existing_capacity: ParameterTable,
    /// Line id = position in this list
    pub lines: Vec<LineRecord>,
    pub demand: TimeSeriesTable,
    pub wind_capacity_factors: TimeSeriesTable,
    pub solar_capacity_factors: TimeSeriesTable,
    /// Rows = node labels, columns `wind` and `solar` (km²)
    pub land_area: ParameterTable,
}

/// New capacity per technology (rows) and node (columns).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityTable {
    pub technologies: Vec<String>,
    pub nodes: Vec<NodeId>,
    /// values[technology][node]
    pub values: Vec<Vec<f64>>,
}

impl CapacityTable {
    pub fn get(&self, technology: &str, node: NodeId) -> Option<f64> {
        let row = self.technologies.iter().position(|t| t == technology)?;
        self.values.get(row)?.get(node.value()).copied()
    }

    /// Total new capacity of one technology across all nodes.
    pub fn technology_total(&self, technology: &str) -> Option<f64> {
        let row = self.technologies.iter().position(|t| t == technology)?;
        Some(self.values[row].iter().sum())
    }
}

/// New transmission capacity per line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineCapacityTable {
    pub lines: Vec<LineId>,
    pub values: Vec<f64>,
}

impl LineCapacityTable {
    pub fn get(&self, line: LineId) -> Option<f64> {
        self.values.get(line.value()).copied()
    }
}

/// Solved-run summary written next to the capacity tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: String,
    pub solver: String,
    pub omega: f64,
    pub objective: f64,
    pub cost_investment_generation: f64,
    pub cost_investment_storage: f64,
    pub cost_investment_transmission: f64,
    pub cost_operation: f64,
    pub cost_loss_of_load: f64,
    pub total_loss_of_load: f64,
    pub renewable_share: f64,
    pub solve_time_ms: u64,
}
