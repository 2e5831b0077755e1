//! Small in-memory scenarios shared by unit and integration tests.

use crate::params::{columns, ModelParameters, TechnologySets};
use grim_core::{InputTables, LineRecord, NodeId, ParameterTable, TimeSeriesTable};

const TECHNO_COLUMNS: [&str; 7] = [
    columns::CAPEX,
    columns::CAPEX_STORAGE,
    columns::FOM,
    columns::VOM,
    columns::LIFETIME,
    columns::ETA_IN,
    columns::ETA_OUT,
];

/// Technoeconomic rows in spreadsheet units (€/kW, €/kWh).
///
/// Gas has zero operating cost so existing gas capacity is free to run.
pub fn techno_economic_table() -> ParameterTable {
    let mut table = ParameterTable::new(TECHNO_COLUMNS);
    let rows: [(&str, [Option<f64>; 7]); 5] = [
        ("gas", [Some(1000.0), None, Some(0.0), Some(0.0), Some(30.0), None, None]),
        ("biomass", [Some(2500.0), None, Some(0.0), Some(0.05), Some(30.0), None, None]),
        ("onshore", [Some(1200.0), None, Some(0.0), Some(0.0), Some(25.0), None, None]),
        ("solar", [Some(600.0), None, Some(0.0), Some(0.0), Some(25.0), None, None]),
        (
            "battery",
            [Some(300.0), Some(150.0), Some(0.0), Some(0.0), Some(15.0), Some(0.95), Some(0.95)],
        ),
    ];
    for (name, values) in rows {
        table
            .push_row(name, values.to_vec())
            .expect("row width matches columns");
    }
    table
}

fn single_column(node_values: &[f64]) -> TimeSeriesTable {
    let mut table = TimeSeriesTable::new();
    for (n, value) in node_values.iter().enumerate() {
        table
            .insert_column(NodeId::new(n).label(), vec![*value])
            .expect("distinct node columns");
    }
    table
}

/// Hourly series with one column per node; `series[n]` is node `n`.
pub fn hourly(series: &[Vec<f64>]) -> TimeSeriesTable {
    let mut table = TimeSeriesTable::new();
    for (n, values) in series.iter().enumerate() {
        table
            .insert_column(NodeId::new(n).label(), values.clone())
            .expect("distinct node columns");
    }
    table
}

/// Two nodes joined by one line (x = 0.1, length 50).
///
/// 1000 MW of existing gas at node 0, nothing at node 1, a single hour of
/// 500 MW demand at node 1.
pub fn two_node_tables(line_capacity: f64) -> InputTables {
    let mut existing = ParameterTable::new(["gas"]);
    existing
        .push_row("0", vec![Some(1000.0)])
        .expect("single gas column");

    InputTables {
        techno_economic: techno_economic_table(),
        existing_capacity: existing,
        lines: vec![LineRecord::new(0, 1, 0.1, line_capacity, 50.0)],
        demand: single_column(&[0.0, 500.0]),
        ..InputTables::default()
    }
}

/// Two nodes, gas only, no storage.
pub fn gas_only_sets() -> TechnologySets {
    TechnologySets {
        nodes: 2,
        generation: vec!["gas".into()],
        storage: vec![],
        renewable: vec![],
        non_vres: None,
    }
}

/// Defaults with the renewable-share target switched off.
pub fn scenario_params() -> ModelParameters {
    ModelParameters {
        omega: 0.0,
        ..ModelParameters::default()
    }
}
