use anyhow::{Context, Result};
use grim_algo::compute_ptdf;
use grim_core::node_range;
use grim_io::csv_tables::{read_lines, write_matrix};
use std::path::Path;

pub fn handle(lines_path: &Path, nodes: Option<usize>, out: &Path) -> Result<()> {
    let lines = read_lines(lines_path)
        .with_context(|| format!("reading topology {}", lines_path.display()))?;
    let n_nodes = nodes.unwrap_or_else(|| {
        lines
            .iter()
            .map(|l| l.from.value().max(l.to.value()) + 1)
            .max()
            .unwrap_or(0)
    });

    let ptdf = compute_ptdf(&lines, n_nodes)?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let columns: Vec<String> = node_range(n_nodes).map(|n| n.label()).collect();
    let rows: Vec<(String, Vec<f64>)> = ptdf
        .rows()
        .iter()
        .enumerate()
        .map(|(l, row)| (l.to_string(), row.clone()))
        .collect();
    write_matrix(out, "line", &columns, &rows)
        .with_context(|| format!("writing {}", out.display()))?;

    println!(
        "PTDF computed: {} lines x {} nodes, written to {}",
        ptdf.num_lines(),
        ptdf.num_nodes(),
        out.display()
    );
    Ok(())
}
