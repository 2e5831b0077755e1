//! Index & parameter assembly.
//!
//! Joins the raw input tables into per-technology parameter records and
//! dense node × time arrays, keyed by the model's index sets. Everything the
//! model builder reads comes out of [`assemble`] already validated, so a
//! missing column or technology stops the run before any variable exists.

use crate::grid::Grid2;
use grim_core::{node_range, InputTables, LineRecord, NodeId, ParameterTable, TimeSeriesTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Weather-dependent technology driven by the wind capacity-factor series.
pub const WIND: &str = "onshore";
/// Weather-dependent technology driven by the solar capacity-factor series.
pub const SOLAR: &str = "solar";

/// Column names of the technoeconomic parameter table.
pub mod columns {
    pub const CAPEX: &str = "CapEx(€/kW)";
    pub const CAPEX_STORAGE: &str = "CapExStorage(€/kWh)";
    pub const FOM: &str = "FOM(€/kW/yr)";
    pub const VOM: &str = "VOM(€/kWh)";
    pub const LIFETIME: &str = "Lifetime(yr)";
    pub const ETA_IN: &str = "eta_in";
    pub const ETA_OUT: &str = "eta_out";
    /// Land-area table columns (km²)
    pub const AREA_WIND: &str = "wind";
    pub const AREA_SOLAR: &str = "solar";
}

/// Errors raised while joining input tables into model parameters
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("technology '{0}' is missing from the technoeconomic table")]
    MissingTechnology(String),

    #[error("technology '{technology}' has no value in column '{column}'")]
    MissingParameter { technology: String, column: String },

    #[error("{table} table has no column for node {node}")]
    MissingSeries { table: &'static str, node: NodeId },

    #[error("{table} table has {rows} rows, need at least {required}")]
    TooFewRows {
        table: &'static str,
        rows: usize,
        required: usize,
    },

    #[error("land-area table has no '{column}' value for node {node}")]
    MissingLandArea { node: NodeId, column: &'static str },

    #[error("{context} references node '{node}', valid nodes are 0..{n_nodes}")]
    NodeOutOfRange {
        context: String,
        node: String,
        n_nodes: usize,
    },

    #[error("invalid set definition: {0}")]
    InvalidSets(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Index sets of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnologySets {
    /// Number of nodes; the node domain is `0..nodes`
    pub nodes: usize,
    /// Generation technologies (G)
    pub generation: Vec<String>,
    /// Storage / conversion technologies (SC = S)
    pub storage: Vec<String>,
    /// Renewable subset of G (RES)
    pub renewable: Vec<String>,
    /// Technologies capped by plain installed capacity; defaults to G without
    /// the two weather-dependent technologies
    pub non_vres: Option<Vec<String>>,
}

impl Default for TechnologySets {
    fn default() -> Self {
        Self {
            nodes: 32,
            generation: vec![WIND.into(), SOLAR.into(), "biomass".into(), "gas".into()],
            storage: vec!["battery".into(), "hydrogen".into()],
            renewable: vec![WIND.into(), SOLAR.into(), "biomass".into()],
            non_vres: None,
        }
    }
}

impl TechnologySets {
    pub fn non_vres(&self) -> Vec<String> {
        match &self.non_vres {
            Some(list) => list.clone(),
            None => self
                .generation
                .iter()
                .filter(|t| !is_weather_dependent(t))
                .cloned()
                .collect(),
        }
    }

    pub fn has_wind(&self) -> bool {
        self.generation.iter().any(|t| t == WIND)
    }

    pub fn has_solar(&self) -> bool {
        self.generation.iter().any(|t| t == SOLAR)
    }
}

fn is_weather_dependent(tech: &str) -> bool {
    tech == WIND || tech == SOLAR
}

/// Scalar model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// Loss-of-load penalty per unit of unserved energy
    pub lol: f64,
    /// Number of sampled hours (R)
    pub hours: usize,
    /// Hours in the representative year (denominator_R)
    pub denominator_hours: usize,
    /// Transmission cost per unit capacity and length (CT)
    pub transmission_cost: f64,
    pub discount_rate: f64,
    /// Economic life of new lines (LT)
    pub transmission_lifetime: f64,
    pub reserve_margin: f64,
    /// Renewable share target
    pub omega: f64,
    /// Length factor applied to line cost (e_l)
    pub extra_length: f64,
    /// MW per km²
    pub capacity_density_wind: f64,
    /// MW per km²
    pub capacity_density_solar: f64,
    /// Applied to the CapEx, CapExStorage, FOM and VOM columns
    #[serde(alias = "num_rows_cost_params")]
    pub cost_multiplier: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            lol: 23000.0,
            hours: 1,
            denominator_hours: 8760,
            transmission_cost: 10000.0,
            discount_rate: 0.05,
            transmission_lifetime: 40.0,
            reserve_margin: 0.5,
            omega: 1.0,
            extra_length: 0.25,
            capacity_density_wind: 5.0,
            capacity_density_solar: 30.0,
            cost_multiplier: 1000.0,
        }
    }
}

impl ModelParameters {
    /// Factor turning a sampled-period cost into an annual one (R / denominator_R).
    pub fn annualization(&self) -> f64 {
        self.hours as f64 / self.denominator_hours as f64
    }

    fn validate(&self) -> Result<(), AssemblyError> {
        let invalid = |name: &str, reason: String| AssemblyError::InvalidParameter {
            name: name.to_string(),
            reason,
        };
        if self.hours == 0 || self.hours > self.denominator_hours {
            return Err(invalid(
                "hours",
                format!("must be in 1..={}, got {}", self.denominator_hours, self.hours),
            ));
        }
        if !(0.0..=1.0).contains(&self.omega) {
            return Err(invalid("omega", format!("must be in [0, 1], got {}", self.omega)));
        }
        if self.discount_rate < 0.0 {
            return Err(invalid(
                "discount_rate",
                format!("must be non-negative, got {}", self.discount_rate),
            ));
        }
        if self.transmission_lifetime <= 0.0 {
            return Err(invalid(
                "transmission_lifetime",
                format!("must be positive, got {}", self.transmission_lifetime),
            ));
        }
        for (name, value) in [
            ("lol", self.lol),
            ("transmission_cost", self.transmission_cost),
            ("cost_multiplier", self.cost_multiplier),
        ] {
            if !(value >= 0.0) {
                return Err(invalid(name, format!("must be non-negative, got {}", value)));
            }
        }
        if self.reserve_margin < 0.0 {
            return Err(invalid(
                "reserve_margin",
                format!("must be non-negative, got {}", self.reserve_margin),
            ));
        }
        Ok(())
    }
}

/// Capital recovery factor `r / (1 - (1+r)^-L)`; `1/L` at zero interest.
pub fn capital_recovery_factor(rate: f64, lifetime: f64) -> f64 {
    if rate.abs() < 1e-12 {
        return 1.0 / lifetime;
    }
    rate / (1.0 - (1.0 + rate).powf(-lifetime))
}

/// How dispatch of a generation technology is capped.
#[derive(Debug, Clone)]
pub enum OutputLimit {
    /// `P ≤ cf[n,t] · (K + existing)`; grid is node × time
    CapacityFactor(Grid2<f64>),
    /// `P ≤ K + existing`
    Capacity,
    /// Neither weather-dependent nor in the capacity-capped subset
    Unbounded,
}

#[derive(Debug, Clone)]
pub struct GenerationTech {
    pub name: String,
    /// Scaled capital cost per unit capacity
    pub capex: f64,
    pub fom: f64,
    pub vom: f64,
    pub lifetime: f64,
    pub renewable: bool,
    /// Existing capacity per node
    pub existing: Vec<f64>,
    pub output_limit: OutputLimit,
    /// Area-derived ceiling per node, wind and solar only
    pub land_ceiling: Option<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct StorageTech {
    pub name: String,
    /// Scaled capital cost per unit power capacity
    pub capex_power: f64,
    /// Scaled capital cost per unit energy capacity
    pub capex_energy: f64,
    pub fom: f64,
    pub lifetime: f64,
    pub eta_in: f64,
    pub eta_out: f64,
    pub existing: Vec<f64>,
}

/// Fully indexed parameter set for one model instance.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub params: ModelParameters,
    pub n_nodes: usize,
    pub n_hours: usize,
    pub generation: Vec<GenerationTech>,
    pub storage: Vec<StorageTech>,
    pub lines: Vec<LineRecord>,
    /// node × time, first `n_hours` rows of the demand table
    pub demand: Grid2<f64>,
}

impl ModelData {
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Technology names in variable order: G then SC.
    pub fn capacity_technologies(&self) -> Vec<String> {
        self.generation
            .iter()
            .map(|g| g.name.clone())
            .chain(self.storage.iter().map(|s| s.name.clone()))
            .collect()
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }
}

/// Assemble model parameters from raw tables.
///
/// Existing capacities default to zero where the table has no row, column
/// or value; every other missing input is an error.
#[instrument(skip_all, fields(nodes = sets.nodes, hours = params.hours))]
pub fn assemble(
    tables: &InputTables,
    sets: &TechnologySets,
    params: &ModelParameters,
) -> Result<ModelData, AssemblyError> {
    validate_sets(sets)?;
    params.validate()?;

    let n_nodes = sets.nodes;
    let n_hours = params.hours;

    check_existing_rows(&tables.existing_capacity, n_nodes)?;
    check_line_nodes(&tables.lines, n_nodes)?;

    let demand = select_hours(&tables.demand, "demand", n_nodes, n_hours)?;

    let non_vres: HashSet<String> = sets.non_vres().into_iter().collect();
    let renewable: HashSet<&str> = sets.renewable.iter().map(String::as_str).collect();
    let techno = &tables.techno_economic;
    let scale = params.cost_multiplier;

    let mut generation = Vec::with_capacity(sets.generation.len());
    for name in &sets.generation {
        require_technology(techno, name)?;
        let (output_limit, land_ceiling) = if name == WIND {
            let cf = select_hours(&tables.wind_capacity_factors, "wind capacity factor", n_nodes, n_hours)?;
            let area = land_areas(&tables.land_area, columns::AREA_WIND, n_nodes)?;
            let ceiling = area.iter().map(|a| a * params.capacity_density_wind).collect();
            (OutputLimit::CapacityFactor(cf), Some(ceiling))
        } else if name == SOLAR {
            let cf = select_hours(&tables.solar_capacity_factors, "solar capacity factor", n_nodes, n_hours)?;
            let area = land_areas(&tables.land_area, columns::AREA_SOLAR, n_nodes)?;
            let ceiling = area.iter().map(|a| a * params.capacity_density_solar).collect();
            (OutputLimit::CapacityFactor(cf), Some(ceiling))
        } else if non_vres.contains(name) {
            (OutputLimit::Capacity, None)
        } else {
            warn!(technology = %name, "generation technology has no output cap");
            (OutputLimit::Unbounded, None)
        };

        generation.push(GenerationTech {
            name: name.clone(),
            capex: scale * require_cost(techno, name, columns::CAPEX)?,
            fom: scale * require_cost(techno, name, columns::FOM)?,
            vom: scale * require_cost(techno, name, columns::VOM)?,
            lifetime: require_lifetime(techno, name)?,
            renewable: renewable.contains(name.as_str()),
            existing: existing_capacity(&tables.existing_capacity, name, n_nodes),
            output_limit,
            land_ceiling,
        });
    }

    let mut storage = Vec::with_capacity(sets.storage.len());
    for name in &sets.storage {
        require_technology(techno, name)?;
        let eta_in = require_positive(techno, name, columns::ETA_IN)?;
        let eta_out = require_positive(techno, name, columns::ETA_OUT)?;
        storage.push(StorageTech {
            name: name.clone(),
            capex_power: scale * require_cost(techno, name, columns::CAPEX)?,
            capex_energy: scale * require_cost(techno, name, columns::CAPEX_STORAGE)?,
            fom: scale * require_cost(techno, name, columns::FOM)?,
            lifetime: require_lifetime(techno, name)?,
            eta_in,
            eta_out,
            existing: existing_capacity(&tables.existing_capacity, name, n_nodes),
        });
    }

    info!(
        nodes = n_nodes,
        lines = tables.lines.len(),
        generation = generation.len(),
        storage = storage.len(),
        hours = n_hours,
        "parameters assembled"
    );

    Ok(ModelData {
        params: params.clone(),
        n_nodes,
        n_hours,
        generation,
        storage,
        lines: tables.lines.clone(),
        demand,
    })
}

fn validate_sets(sets: &TechnologySets) -> Result<(), AssemblyError> {
    if sets.nodes == 0 {
        return Err(AssemblyError::InvalidSets("node set is empty".into()));
    }
    if sets.generation.is_empty() {
        return Err(AssemblyError::InvalidSets(
            "generation technology set is empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for tech in sets.generation.iter().chain(&sets.storage) {
        if !seen.insert(tech.as_str()) {
            return Err(AssemblyError::InvalidSets(format!(
                "technology '{}' listed more than once",
                tech
            )));
        }
    }

    for storage in &sets.storage {
        if is_weather_dependent(storage) {
            return Err(AssemblyError::InvalidSets(format!(
                "'{}' cannot be a storage technology",
                storage
            )));
        }
    }

    let generation: HashSet<&str> = sets.generation.iter().map(String::as_str).collect();
    for (label, subset) in [("renewable", sets.renewable.clone()), ("non_vres", sets.non_vres())] {
        if let Some(outside) = subset.iter().find(|t| !generation.contains(t.as_str())) {
            return Err(AssemblyError::InvalidSets(format!(
                "{} technology '{}' is not a generation technology",
                label, outside
            )));
        }
    }
    Ok(())
}

fn parse_node_key(key: &str) -> Option<usize> {
    key.trim().parse::<f64>().ok().and_then(|v| {
        (v >= 0.0 && v.fract() == 0.0).then_some(v as usize)
    })
}

fn check_existing_rows(table: &ParameterTable, n_nodes: usize) -> Result<(), AssemblyError> {
    for key in table.keys() {
        match parse_node_key(key) {
            Some(node) if node < n_nodes => {}
            _ => {
                return Err(AssemblyError::NodeOutOfRange {
                    context: "existing-capacity table".into(),
                    node: key.clone(),
                    n_nodes,
                })
            }
        }
    }
    Ok(())
}

fn check_line_nodes(lines: &[LineRecord], n_nodes: usize) -> Result<(), AssemblyError> {
    for (l, line) in lines.iter().enumerate() {
        if !(line.length >= 0.0) || !(line.capacity >= 0.0) {
            return Err(AssemblyError::InvalidParameter {
                name: format!("line {}", l),
                reason: format!(
                    "length and capacity must be non-negative, got {} and {}",
                    line.length, line.capacity
                ),
            });
        }
        for node in [line.from, line.to] {
            if node.value() >= n_nodes {
                return Err(AssemblyError::NodeOutOfRange {
                    context: format!("line {}", l),
                    node: node.label(),
                    n_nodes,
                });
            }
        }
    }
    Ok(())
}

/// First `n_hours` rows of every node column, as a node × time grid.
fn select_hours(
    table: &TimeSeriesTable,
    name: &'static str,
    n_nodes: usize,
    n_hours: usize,
) -> Result<Grid2<f64>, AssemblyError> {
    if table.num_rows() < n_hours {
        return Err(AssemblyError::TooFewRows {
            table: name,
            rows: table.num_rows(),
            required: n_hours,
        });
    }
    let mut series = Vec::with_capacity(n_nodes);
    for node in node_range(n_nodes) {
        let column = table
            .node(node)
            .ok_or(AssemblyError::MissingSeries { table: name, node })?;
        series.push(&column[..n_hours]);
    }
    debug!(table = name, nodes = n_nodes, hours = n_hours, "time series selected");
    Ok(Grid2::from_fn(n_nodes, n_hours, |n, t| series[n][t]))
}

fn land_areas(
    table: &ParameterTable,
    column: &'static str,
    n_nodes: usize,
) -> Result<Vec<f64>, AssemblyError> {
    node_range(n_nodes)
        .map(|node| {
            lookup_node_row(table, node, column)
                .ok_or(AssemblyError::MissingLandArea { node, column })
        })
        .collect()
}

/// Look up a node-keyed row, accepting "3" as well as "3.0" style keys.
fn lookup_node_row(table: &ParameterTable, node: NodeId, column: &str) -> Option<f64> {
    table.get(&node.label(), column).or_else(|| {
        table
            .keys()
            .iter()
            .find(|k| parse_node_key(k) == Some(node.value()))
            .and_then(|k| table.get(k, column))
    })
}

fn existing_capacity(table: &ParameterTable, technology: &str, n_nodes: usize) -> Vec<f64> {
    node_range(n_nodes)
        .map(|node| lookup_node_row(table, node, technology).unwrap_or(0.0))
        .collect()
}

fn require_technology(table: &ParameterTable, name: &str) -> Result<(), AssemblyError> {
    if table.has_row(name) {
        Ok(())
    } else {
        Err(AssemblyError::MissingTechnology(name.to_string()))
    }
}

fn require(table: &ParameterTable, technology: &str, column: &str) -> Result<f64, AssemblyError> {
    table
        .get(technology, column)
        .ok_or_else(|| AssemblyError::MissingParameter {
            technology: technology.to_string(),
            column: column.to_string(),
        })
}

fn require_positive(
    table: &ParameterTable,
    technology: &str,
    column: &str,
) -> Result<f64, AssemblyError> {
    let value = require(table, technology, column)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(AssemblyError::InvalidParameter {
            name: format!("{}.{}", technology, column),
            reason: format!("must be positive, got {}", value),
        })
    }
}

/// Cost columns must be non-negative, otherwise the LP objective is unbounded.
fn require_cost(table: &ParameterTable, technology: &str, column: &str) -> Result<f64, AssemblyError> {
    let value = require(table, technology, column)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(AssemblyError::InvalidParameter {
            name: format!("{}.{}", technology, column),
            reason: format!("must be non-negative, got {}", value),
        })
    }
}

fn require_lifetime(table: &ParameterTable, technology: &str) -> Result<f64, AssemblyError> {
    require_positive(table, technology, columns::LIFETIME)
}
