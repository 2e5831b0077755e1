//! Power Transfer Distribution Factors (PTDF) for the transport network.
//!
//! PTDF[ℓ,n] = sensitivity of flow on line ℓ to a net injection at node n,
//! withdrawn at the slack node:
//! ```text
//! f = PTDF × z            (Σ_n z_n = 0)
//! ```
//!
//! Derivation under the DC approximation, with incidence matrix A
//! (+1 at the from-node, -1 at the to-node) and B = diag(1/x_ℓ):
//! ```text
//! M1 = B·A                (|FL| × N)
//! M2 = Aᵗ·B·A             (N × N, nodal susceptance)
//! PTDF[:, 1..] = M1[:, 1..] · (M2[1.., 1..])⁻¹
//! PTDF[:, 0]   = 0        (slack)
//! ```

use grim_core::{graph_utils, LineId, LineRecord, NodeId, SLACK_NODE};
use sprs::{CsMat, TriMat};
use thiserror::Error;
use tracing::{debug, instrument};

/// Reactances with magnitude below this are rejected.
const MIN_REACTANCE: f64 = 1e-12;
/// Relative pivot threshold for the reduced susceptance inverse.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Errors from sensitivity matrix construction
#[derive(Debug, Error)]
pub enum SensitivityError {
    #[error("Network must have at least 2 nodes, got {0}")]
    TooFewNodes(usize),

    #[error("Network must have at least 1 line")]
    NoLines,

    #[error("Line {0} has zero or near-zero reactance")]
    ZeroReactance(LineId),

    #[error("Line {line} references node {node}, but only {n_nodes} nodes exist")]
    NodeOutOfRange {
        line: LineId,
        node: NodeId,
        n_nodes: usize,
    },

    #[error("Nodes {0:?} are not connected to the slack node")]
    Disconnected(Vec<NodeId>),

    #[error("Matrix inversion failed: {0}")]
    InversionFailed(String),
}

/// PTDF matrix: sensitivity of line flows to nodal injections.
///
/// Dense storage; every line is affected by injections at every node of its
/// component.
#[derive(Debug, Clone)]
pub struct PtdfMatrix {
    /// values[line][node]
    values: Vec<Vec<f64>>,
    n_nodes: usize,
}

impl PtdfMatrix {
    pub fn get(&self, line: LineId, node: NodeId) -> Option<f64> {
        self.values.get(line.value())?.get(node.value()).copied()
    }

    /// Row of sensitivities for one line, indexed by node ordinal.
    pub fn row(&self, line: LineId) -> &[f64] {
        &self.values[line.value()]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn num_lines(&self) -> usize {
        self.values.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Line flows for a balanced nodal injection vector.
    pub fn flows(&self, injections: &[f64]) -> Vec<f64> {
        self.values
            .iter()
            .map(|row| row.iter().zip(injections).map(|(p, z)| p * z).sum())
            .collect()
    }
}

/// Aggregate line flows into nodal net outflow (Aᵗ·f).
///
/// For flows produced by a valid PTDF this reproduces the injection vector.
pub fn nodal_net_outflow(lines: &[LineRecord], n_nodes: usize, flows: &[f64]) -> Vec<f64> {
    let mut net = vec![0.0; n_nodes];
    for (line, flow) in lines.iter().zip(flows) {
        net[line.from.value()] += flow;
        net[line.to.value()] -= flow;
    }
    net
}

/// Compute the PTDF for `lines` over nodes `0..n_nodes`, slack at node 0.
///
/// Algorithm:
/// 1. Assemble sparse A, B and the products M1 = B·A, M2 = Aᵗ·B·A
/// 2. Check every node reaches the slack (otherwise M2 reduced is singular)
/// 3. Invert the reduced M2 by LU with partial pivoting
/// 4. Multiply the non-slack columns of M1 by the inverse, zero slack column
#[instrument(skip(lines), fields(lines = lines.len()))]
pub fn compute_ptdf(lines: &[LineRecord], n_nodes: usize) -> Result<PtdfMatrix, SensitivityError> {
    if n_nodes < 2 {
        return Err(SensitivityError::TooFewNodes(n_nodes));
    }
    if lines.is_empty() {
        return Err(SensitivityError::NoLines);
    }
    validate_lines(lines, n_nodes)?;

    let unreachable = graph_utils::unreachable_nodes(n_nodes, lines, SLACK_NODE);
    if !unreachable.is_empty() {
        return Err(SensitivityError::Disconnected(unreachable));
    }

    let n_lines = lines.len();
    let mut incidence = TriMat::new((n_lines, n_nodes));
    let mut incidence_t = TriMat::new((n_nodes, n_lines));
    let mut susceptance = TriMat::new((n_lines, n_lines));
    for (l, line) in lines.iter().enumerate() {
        let (i, j) = (line.from.value(), line.to.value());
        incidence.add_triplet(l, i, 1.0);
        incidence.add_triplet(l, j, -1.0);
        incidence_t.add_triplet(i, l, 1.0);
        incidence_t.add_triplet(j, l, -1.0);
        susceptance.add_triplet(l, l, 1.0 / line.reactance);
    }
    let a: CsMat<f64> = incidence.to_csr();
    let a_t: CsMat<f64> = incidence_t.to_csr();
    let b: CsMat<f64> = susceptance.to_csr();

    let m1: CsMat<f64> = &b * &a;
    let m2: CsMat<f64> = &(&a_t * &b) * &a;

    let m1_dense = to_dense(&m1, n_lines, n_nodes);
    let m2_dense = to_dense(&m2, n_nodes, n_nodes);

    // Drop the slack row and column
    let reduced: Vec<Vec<f64>> = m2_dense[1..].iter().map(|row| row[1..].to_vec()).collect();
    let inverse = lu_inverse(&reduced)?;
    debug!(n_reduced = reduced.len(), "reduced susceptance matrix inverted");

    let m = n_nodes - 1;
    let mut values = vec![vec![0.0; n_nodes]; n_lines];
    for (l, row) in values.iter_mut().enumerate() {
        for col in 0..m {
            let mut acc = 0.0;
            for k in 0..m {
                acc += m1_dense[l][k + 1] * inverse[k][col];
            }
            row[col + 1] = acc;
        }
    }

    Ok(PtdfMatrix { values, n_nodes })
}

fn validate_lines(lines: &[LineRecord], n_nodes: usize) -> Result<(), SensitivityError> {
    for (l, line) in lines.iter().enumerate() {
        let id = LineId::new(l);
        for node in [line.from, line.to] {
            if node.value() >= n_nodes {
                return Err(SensitivityError::NodeOutOfRange {
                    line: id,
                    node,
                    n_nodes,
                });
            }
        }
        if !line.reactance.is_finite() || line.reactance.abs() < MIN_REACTANCE {
            return Err(SensitivityError::ZeroReactance(id));
        }
    }
    Ok(())
}

fn to_dense(matrix: &CsMat<f64>, rows: usize, cols: usize) -> Vec<Vec<f64>> {
    let mut dense = vec![vec![0.0; cols]; rows];
    for (val, (i, j)) in matrix.iter() {
        dense[i][j] += *val;
    }
    dense
}

/// LU decomposition-based matrix inverse with partial pivoting.
fn lu_inverse(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, SensitivityError> {
    let n = a.len();
    if n == 0 {
        return Err(SensitivityError::InversionFailed("Empty matrix".into()));
    }

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let threshold = PIVOT_TOLERANCE * scale.max(f64::MIN_POSITIVE);

    let mut lu: Vec<Vec<f64>> = a.to_vec();
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let mut max_val = lu[k][k].abs();
        let mut max_row = k;
        for (i, row) in lu.iter().enumerate().skip(k + 1) {
            if row[k].abs() > max_val {
                max_val = row[k].abs();
                max_row = i;
            }
        }

        if max_val < threshold {
            return Err(SensitivityError::InversionFailed(format!(
                "reduced susceptance matrix is singular at pivot {}",
                k
            )));
        }

        if max_row != k {
            lu.swap(k, max_row);
            perm.swap(k, max_row);
        }

        for i in (k + 1)..n {
            lu[i][k] /= lu[k][k];
            let factor = lu[i][k];
            for j in (k + 1)..n {
                lu[i][j] -= factor * lu[k][j];
            }
        }
    }

    // Solve for each column of the inverse: P·A = L·U
    let mut inv = vec![vec![0.0; n]; n];
    for col in 0..n {
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut acc = if perm[i] == col { 1.0 } else { 0.0 };
            for j in 0..i {
                acc -= lu[i][j] * y[j];
            }
            y[i] = acc;
        }

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut acc = y[i];
            for j in (i + 1)..n {
                acc -= lu[i][j] * x[j];
            }
            x[i] = acc / lu[i][i];
        }

        for (i, value) in x.into_iter().enumerate() {
            inv[i][col] = value;
        }
    }

    Ok(inv)
}
