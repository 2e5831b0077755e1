//! Output sinks for solved runs.

use crate::csv_tables::write_matrix;
use crate::paths::ExperimentPaths;
use grim_core::{CapacityTable, GrimError, GrimResult, LineCapacityTable, RunSummary};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Destination for the result tables of one run.
pub trait OutputSink {
    /// New capacity, technologies as rows and nodes as columns.
    fn write_capacity(&mut self, table: &CapacityTable) -> GrimResult<()>;

    /// New transmission capacity, one row per line.
    fn write_line_capacity(&mut self, table: &LineCapacityTable) -> GrimResult<()>;

    fn write_summary(&mut self, summary: &RunSummary) -> GrimResult<()>;
}

/// Writes CSV tables and a JSON summary under the experiment output names.
#[derive(Debug, Clone)]
pub struct CsvSink {
    pub gencap: PathBuf,
    pub transcap: PathBuf,
    pub summary: PathBuf,
}

impl CsvSink {
    pub fn for_run(paths: &ExperimentPaths, omega: f64) -> Self {
        Self {
            gencap: paths.gencap_output(omega),
            transcap: paths.transcap_output(omega),
            summary: paths.summary_output(omega),
        }
    }

    fn ensure_parent(path: &Path) -> GrimResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl OutputSink for CsvSink {
    fn write_capacity(&mut self, table: &CapacityTable) -> GrimResult<()> {
        Self::ensure_parent(&self.gencap)?;
        let columns: Vec<String> = table.nodes.iter().map(|n| n.label()).collect();
        let rows: Vec<(String, Vec<f64>)> = table
            .technologies
            .iter()
            .cloned()
            .zip(table.values.iter().cloned())
            .collect();
        write_matrix(&self.gencap, "technology", &columns, &rows)?;
        info!(path = %self.gencap.display(), "capacity table written");
        Ok(())
    }

    fn write_line_capacity(&mut self, table: &LineCapacityTable) -> GrimResult<()> {
        Self::ensure_parent(&self.transcap)?;
        let rows: Vec<(String, Vec<f64>)> = table
            .lines
            .iter()
            .zip(&table.values)
            .map(|(id, value)| (id.to_string(), vec![*value]))
            .collect();
        write_matrix(&self.transcap, "line", &["new_capacity".to_string()], &rows)?;
        info!(path = %self.transcap.display(), "line capacity table written");
        Ok(())
    }

    fn write_summary(&mut self, summary: &RunSummary) -> GrimResult<()> {
        Self::ensure_parent(&self.summary)?;
        let json = serde_json::to_string_pretty(summary)
            .map_err(|e| GrimError::Other(format!("serializing run summary: {}", e)))?;
        fs::write(&self.summary, json)?;
        info!(path = %self.summary.display(), "run summary written");
        Ok(())
    }
}
