use super::variables::VariableSet;
use crate::params::{ModelData, OutputLimit};
use crate::sensitivity::PtdfMatrix;
use good_lp::{constraint, Constraint, Expression};
use serde::Serialize;
use std::collections::BTreeMap;

/// Constraint families of the expansion LP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    /// Σ P + lol + Σ (DP − CP) − demand = Z, per node/time
    NodalBalance,
    /// Σ_n Z = 0, per time
    InjectionBalance,
    /// F = PTDF · Z, per line/time
    FlowDefinition,
    /// F ≤ K_T/2 + cap
    ThermalUpper,
    /// F ≥ −(K_T/2 + cap)
    ThermalLower,
    /// P ≤ cf · (K + existing) for wind and solar
    WeatherOutput,
    /// P ≤ K + existing for the capacity-capped subset
    CapacityOutput,
    /// SP[0] = SP[R−1] + η_in CP[0] − DP[0]/η_out
    StorageCyclic,
    /// SP[t] = SP[t−1] + η_in CP[t] − DP[t]/η_out, t ≥ 1
    StorageBalance,
    /// SP ≤ K_S
    StorageEnergy,
    /// CP ≤ K, new power capacity only
    ChargeLimit,
    /// DP ≤ K, new power capacity only
    DischargeLimit,
    /// Σ_RES P ≥ ω · Σ_G P over the horizon
    RenewableShare,
    /// (1+rm) K ≤ area · density − existing for wind and solar
    LandUse,
}

impl ConstraintFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintFamily::NodalBalance => "nodal_balance",
            ConstraintFamily::InjectionBalance => "injection_balance",
            ConstraintFamily::FlowDefinition => "flow_definition",
            ConstraintFamily::ThermalUpper => "thermal_upper",
            ConstraintFamily::ThermalLower => "thermal_lower",
            ConstraintFamily::WeatherOutput => "weather_output",
            ConstraintFamily::CapacityOutput => "capacity_output",
            ConstraintFamily::StorageCyclic => "storage_cyclic",
            ConstraintFamily::StorageBalance => "storage_balance",
            ConstraintFamily::StorageEnergy => "storage_energy",
            ConstraintFamily::ChargeLimit => "charge_limit",
            ConstraintFamily::DischargeLimit => "discharge_limit",
            ConstraintFamily::RenewableShare => "renewable_share",
            ConstraintFamily::LandUse => "land_use",
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ConstraintFamily::StorageCyclic
                | ConstraintFamily::StorageBalance
                | ConstraintFamily::StorageEnergy
                | ConstraintFamily::ChargeLimit
                | ConstraintFamily::DischargeLimit
        )
    }
}

/// Collected constraints plus per-family counts.
#[derive(Default)]
pub(super) struct ConstraintSet {
    pub constraints: Vec<Constraint>,
    pub counts: BTreeMap<ConstraintFamily, usize>,
}

impl ConstraintSet {
    fn push(&mut self, family: ConstraintFamily, c: Constraint) {
        self.constraints.push(c);
        *self.counts.entry(family).or_insert(0) += 1;
    }
}

pub(super) fn build_constraints(
    data: &ModelData,
    ptdf: &PtdfMatrix,
    vars: &VariableSet,
) -> ConstraintSet {
    let mut set = ConstraintSet::default();
    network(&mut set, data, ptdf, vars);
    generation(&mut set, data, vars);
    storage(&mut set, data, vars);
    policy(&mut set, data, vars);
    set
}

fn network(set: &mut ConstraintSet, data: &ModelData, ptdf: &PtdfMatrix, vars: &VariableSet) {
    use ConstraintFamily::*;
    let (n_nodes, n_hours) = (data.n_nodes, data.n_hours);

    for t in 0..n_hours {
        for n in 0..n_nodes {
            let mut supply = Expression::from(vars.loss_of_load[(n, t)]);
            for g in 0..data.generation.len() {
                supply += vars.dispatch[(g, n, t)];
            }
            for s in 0..data.storage.len() {
                supply += vars.discharge[(s, n, t)];
                supply -= vars.charge[(s, n, t)];
            }
            supply -= vars.injection[(n, t)];
            set.push(NodalBalance, constraint!(supply == data.demand[(n, t)]));
        }

        let mut net = Expression::from(0.0);
        for n in 0..n_nodes {
            net += vars.injection[(n, t)];
        }
        set.push(InjectionBalance, constraint!(net == 0.0));

        for (l, line) in data.lines.iter().enumerate() {
            let mut flow = Expression::from(vars.flow[(l, t)]);
            for (n, factor) in ptdf.rows()[l].iter().enumerate() {
                if *factor != 0.0 {
                    flow -= *factor * vars.injection[(n, t)];
                }
            }
            set.push(FlowDefinition, constraint!(flow == 0.0));

            let f = vars.flow[(l, t)];
            let k = vars.line_capacity[l];
            set.push(
                ThermalUpper,
                constraint!(Expression::from(f) - 0.5 * k <= line.capacity),
            );
            set.push(
                ThermalLower,
                constraint!(Expression::from(f) + 0.5 * k >= -line.capacity),
            );
        }
    }
}

fn generation(set: &mut ConstraintSet, data: &ModelData, vars: &VariableSet) {
    use ConstraintFamily::*;
    let gross = 1.0 + data.params.reserve_margin;

    for (g, tech) in data.generation.iter().enumerate() {
        for n in 0..data.n_nodes {
            let k = vars.capacity[(g, n)];
            let existing = tech.existing[n];
            for t in 0..data.n_hours {
                let p = Expression::from(vars.dispatch[(g, n, t)]);
                match &tech.output_limit {
                    OutputLimit::CapacityFactor(cf) => {
                        let cf = cf[(n, t)];
                        set.push(WeatherOutput, constraint!(p - cf * k <= cf * existing));
                    }
                    OutputLimit::Capacity => {
                        set.push(CapacityOutput, constraint!(p - k <= existing));
                    }
                    OutputLimit::Unbounded => {}
                }
            }
            if let Some(ceiling) = &tech.land_ceiling {
                set.push(LandUse, constraint!(gross * k <= ceiling[n] - existing));
            }
        }
    }
}

fn storage(set: &mut ConstraintSet, data: &ModelData, vars: &VariableSet) {
    use ConstraintFamily::*;
    let last = data.n_hours.saturating_sub(1);

    for (s, tech) in data.storage.iter().enumerate() {
        let discharge_loss = 1.0 / tech.eta_out;
        for n in 0..data.n_nodes {
            let k = vars.storage_power(s, n);
            let k_s = vars.storage_energy[(s, n)];

            for t in 0..data.n_hours {
                let prev = if t == 0 { last } else { t - 1 };
                let mut soc = Expression::from(vars.state_of_charge[(s, n, t)]);
                soc -= vars.state_of_charge[(s, n, prev)];
                soc -= tech.eta_in * vars.charge[(s, n, t)];
                soc += discharge_loss * vars.discharge[(s, n, t)];
                let family = if t == 0 { StorageCyclic } else { StorageBalance };
                set.push(family, constraint!(soc == 0.0));

                let sp = Expression::from(vars.state_of_charge[(s, n, t)]);
                set.push(StorageEnergy, constraint!(sp - k_s <= 0.0));

                let cp = Expression::from(vars.charge[(s, n, t)]);
                set.push(ChargeLimit, constraint!(cp - k <= 0.0));

                let dp = Expression::from(vars.discharge[(s, n, t)]);
                set.push(DischargeLimit, constraint!(dp - k <= 0.0));
            }
        }
    }
}

fn policy(set: &mut ConstraintSet, data: &ModelData, vars: &VariableSet) {
    let omega = data.params.omega;
    let mut share = Expression::from(0.0);
    for (g, tech) in data.generation.iter().enumerate() {
        let coef = if tech.renewable { 1.0 - omega } else { -omega };
        if coef == 0.0 {
            continue;
        }
        for n in 0..data.n_nodes {
            for t in 0..data.n_hours {
                share += coef * vars.dispatch[(g, n, t)];
            }
        }
    }
    set.push(ConstraintFamily::RenewableShare, constraint!(share >= 0.0));
}
