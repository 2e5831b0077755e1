//! Objective coefficients.
//!
//! ```text
//! cost = R/denR · Σ C_i (1+rm) K_i,n · crf(L_i)              generation + conversion
//!      + R/denR · Σ C_S,s (1+rm) K_S,s,n · crf(L_s)          storage energy
//!      + R/denR · Σ len_ℓ e_l CT K_T,ℓ · crf(LT)             transmission
//!      + R/denR · Σ (exist_i,n + (1+rm) K_i,n) a_i           fixed O&M
//!      + R/denR · Σ b_g P_g,n,t                              variable O&M
//!      + Σ lol · lol_n,t                                     unserved energy
//! ```
//!
//! The same coefficients produce the LP objective and, after the solve, the
//! numeric cost breakdown of the run summary.

use super::variables::VariableSet;
use crate::params::{capital_recovery_factor, ModelData};
use crate::results::SolutionValues;
use good_lp::Expression;
use serde::Serialize;

/// Objective split into its reported components.
#[derive(Debug, Clone, Serialize)]
pub struct CostTerms<T> {
    pub investment_generation: T,
    pub investment_storage: T,
    pub investment_transmission: T,
    /// Fixed and variable O&M
    pub operation: T,
    pub loss_of_load: T,
}

impl CostTerms<Expression> {
    pub fn total(self) -> Expression {
        self.investment_generation
            + self.investment_storage
            + self.investment_transmission
            + self.operation
            + self.loss_of_load
    }
}

impl CostTerms<f64> {
    pub fn total(&self) -> f64 {
        self.investment_generation
            + self.investment_storage
            + self.investment_transmission
            + self.operation
            + self.loss_of_load
    }
}

/// Annualized per-unit cost coefficients.
#[derive(Debug, Clone)]
pub struct CostCoefficients {
    /// Per capacity row (G then SC), applied to K
    pub capacity: Vec<f64>,
    /// Per capacity row, fixed O&M applied to K
    pub fixed_new: Vec<f64>,
    /// Fixed O&M on existing capacity
    pub fixed_existing: f64,
    /// Per storage tech, applied to K_S
    pub storage_energy: Vec<f64>,
    /// Per line, applied to K_T
    pub line: Vec<f64>,
    /// Per generation tech, applied to P
    pub dispatch: Vec<f64>,
    pub loss_of_load: f64,
    n_generation: usize,
}

impl CostCoefficients {
    pub fn new(data: &ModelData) -> Self {
        let p = &data.params;
        let ann = p.annualization();
        let gross = 1.0 + p.reserve_margin;
        let r = p.discount_rate;

        let capacity = data
            .generation
            .iter()
            .map(|g| ann * g.capex * gross * capital_recovery_factor(r, g.lifetime))
            .chain(
                data.storage
                    .iter()
                    .map(|s| ann * s.capex_power * gross * capital_recovery_factor(r, s.lifetime)),
            )
            .collect();

        let fixed_new = data
            .generation
            .iter()
            .map(|g| g.fom)
            .chain(data.storage.iter().map(|s| s.fom))
            .map(|fom| ann * gross * fom)
            .collect();

        let fixed_existing = ann
            * (data
                .generation
                .iter()
                .map(|g| g.fom * g.existing.iter().sum::<f64>())
                .sum::<f64>()
                + data
                    .storage
                    .iter()
                    .map(|s| s.fom * s.existing.iter().sum::<f64>())
                    .sum::<f64>());

        let storage_energy = data
            .storage
            .iter()
            .map(|s| ann * s.capex_energy * gross * capital_recovery_factor(r, s.lifetime))
            .collect();

        let line_crf = capital_recovery_factor(r, p.transmission_lifetime);
        let line = data
            .lines
            .iter()
            .map(|l| ann * l.length * p.extra_length * p.transmission_cost * line_crf)
            .collect();

        let dispatch = data.generation.iter().map(|g| ann * g.vom).collect();

        Self {
            capacity,
            fixed_new,
            fixed_existing,
            storage_energy,
            line,
            dispatch,
            loss_of_load: p.lol,
            n_generation: data.generation.len(),
        }
    }

    pub fn expressions(&self, vars: &VariableSet) -> CostTerms<Expression> {
        let (n_cap, n_nodes) = vars.capacity.dims();
        let (n_gen, _, n_hours) = vars.dispatch.dims();

        let mut investment_generation = Expression::from(0.0);
        let mut operation = Expression::from(self.fixed_existing);
        for i in 0..n_cap {
            for n in 0..n_nodes {
                let k = vars.capacity[(i, n)];
                investment_generation += self.capacity[i] * k;
                operation += self.fixed_new[i] * k;
            }
        }

        let mut investment_storage = Expression::from(0.0);
        let (n_storage, _) = vars.storage_energy.dims();
        for s in 0..n_storage {
            for n in 0..n_nodes {
                investment_storage += self.storage_energy[s] * vars.storage_energy[(s, n)];
            }
        }

        let mut investment_transmission = Expression::from(0.0);
        for (coef, k) in self.line.iter().zip(&vars.line_capacity) {
            investment_transmission += *coef * *k;
        }

        for g in 0..n_gen {
            if self.dispatch[g] == 0.0 {
                continue;
            }
            for n in 0..n_nodes {
                for t in 0..n_hours {
                    operation += self.dispatch[g] * vars.dispatch[(g, n, t)];
                }
            }
        }

        let mut loss_of_load = Expression::from(0.0);
        for lol in vars.loss_of_load.iter() {
            loss_of_load += self.loss_of_load * *lol;
        }

        CostTerms {
            investment_generation,
            investment_storage,
            investment_transmission,
            operation,
            loss_of_load,
        }
    }

    /// Cost components at a solved point.
    pub fn evaluate(&self, values: &SolutionValues) -> CostTerms<f64> {
        let (n_cap, n_nodes) = values.capacity.dims();
        let (n_gen, _, n_hours) = values.dispatch.dims();
        debug_assert_eq!(n_gen, self.n_generation);

        let mut investment_generation = 0.0;
        let mut operation = self.fixed_existing;
        for i in 0..n_cap {
            for n in 0..n_nodes {
                let k = values.capacity[(i, n)];
                investment_generation += self.capacity[i] * k;
                operation += self.fixed_new[i] * k;
            }
        }

        let (n_storage, _) = values.storage_energy.dims();
        let mut investment_storage = 0.0;
        for s in 0..n_storage {
            for n in 0..n_nodes {
                investment_storage += self.storage_energy[s] * values.storage_energy[(s, n)];
            }
        }

        let investment_transmission = self
            .line
            .iter()
            .zip(&values.line_capacity)
            .map(|(c, k)| c * k)
            .sum();

        for g in 0..n_gen {
            for n in 0..n_nodes {
                for t in 0..n_hours {
                    operation += self.dispatch[g] * values.dispatch[(g, n, t)];
                }
            }
        }

        let loss_of_load = self.loss_of_load * values.loss_of_load.iter().sum::<f64>();

        CostTerms {
            investment_generation,
            investment_storage,
            investment_transmission,
            operation,
            loss_of_load,
        }
    }
}
