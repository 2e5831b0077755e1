use crate::grid::{Grid2, Grid3};
use crate::params::ModelData;
use good_lp::{variable, ProblemVariables, Variable};

/// Decision variable handles, one dense container per family.
///
/// Capacity rows are ordered G then SC, so storage tech `s` sits at row
/// `generation.len() + s` of [`VariableSet::capacity`].
#[derive(Debug, Clone)]
pub struct VariableSet {
    /// K: new power capacity, (G + SC) × N
    pub capacity: Grid2<Variable>,
    /// K_S: new energy capacity, S × N
    pub storage_energy: Grid2<Variable>,
    /// P: dispatch, G × N × T
    pub dispatch: Grid3<Variable>,
    /// lol: unserved energy, N × T
    pub loss_of_load: Grid2<Variable>,
    /// DP: storage discharge, SC × N × T
    pub discharge: Grid3<Variable>,
    /// CP: storage charge, SC × N × T
    pub charge: Grid3<Variable>,
    /// SP: state of charge, S × N × T
    pub state_of_charge: Grid3<Variable>,
    /// K_T: new line capacity, FL
    pub line_capacity: Vec<Variable>,
    /// F: signed line flow, FL × T
    pub flow: Grid2<Variable>,
    /// Z_net: signed net injection, N × T
    pub injection: Grid2<Variable>,
    n_generation: usize,
}

impl VariableSet {
    pub fn declare(vars: &mut ProblemVariables, data: &ModelData) -> Self {
        let g = data.generation.len();
        let s = data.storage.len();
        let n = data.n_nodes;
        let t = data.n_hours;
        let l = data.num_lines();

        let mut nonneg = || vars.add(variable().min(0.0));
        let capacity = Grid2::from_fn(g + s, n, |_, _| nonneg());
        let storage_energy = Grid2::from_fn(s, n, |_, _| nonneg());
        let dispatch = Grid3::from_fn(g, n, t, |_, _, _| nonneg());
        let loss_of_load = Grid2::from_fn(n, t, |_, _| nonneg());
        let discharge = Grid3::from_fn(s, n, t, |_, _, _| nonneg());
        let charge = Grid3::from_fn(s, n, t, |_, _, _| nonneg());
        let state_of_charge = Grid3::from_fn(s, n, t, |_, _, _| nonneg());
        let line_capacity = (0..l).map(|_| nonneg()).collect();

        let flow = Grid2::from_fn(l, t, |_, _| vars.add(variable()));
        let injection = Grid2::from_fn(n, t, |_, _| vars.add(variable()));

        Self {
            capacity,
            storage_energy,
            dispatch,
            loss_of_load,
            discharge,
            charge,
            state_of_charge,
            line_capacity,
            flow,
            injection,
            n_generation: g,
        }
    }

    /// K row of storage technology `s`.
    pub fn storage_power(&self, s: usize, node: usize) -> Variable {
        self.capacity[(self.n_generation + s, node)]
    }

    pub fn count(&self) -> usize {
        self.capacity.iter().count()
            + self.storage_energy.iter().count()
            + self.dispatch.iter().count()
            + self.loss_of_load.iter().count()
            + self.discharge.iter().count()
            + self.charge.iter().count()
            + self.state_of_charge.iter().count()
            + self.line_capacity.len()
            + self.flow.iter().count()
            + self.injection.iter().count()
    }
}
