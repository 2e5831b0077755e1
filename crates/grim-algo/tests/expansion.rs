use grim_algo::test_utils::{
    gas_only_sets, hourly, scenario_params, techno_economic_table, two_node_tables,
};
use grim_algo::params::columns;
use grim_algo::{
    build_model, prepare, run_capacity_expansion, ConstraintFamily, ExpansionError,
    ExpansionResult, ModelParameters, SolveStatus, SolverOptions, TechnologySets,
};
use grim_core::{InputTables, LineId, LineRecord, NodeId, ParameterTable};

const TOL: f64 = 1e-3;

fn solve(tables: &InputTables, sets: &TechnologySets, params: &ModelParameters) -> ExpansionResult {
    run_capacity_expansion(tables, sets, params, &SolverOptions::default())
        .expect("model should solve")
}

/// Two nodes, gas at node 0, four hours of varying demand at node 1.
fn storage_tables() -> InputTables {
    let mut existing = ParameterTable::new(["gas"]);
    existing.push_row("0", vec![Some(1000.0)]).unwrap();
    InputTables {
        techno_economic: techno_economic_table(),
        existing_capacity: existing,
        lines: vec![LineRecord::new(0, 1, 0.1, 1000.0, 50.0)],
        demand: hourly(&[vec![0.0; 4], vec![300.0, 600.0, 200.0, 500.0]]),
        ..InputTables::default()
    }
}

fn storage_sets() -> TechnologySets {
    TechnologySets {
        storage: vec!["battery".into()],
        ..gas_only_sets()
    }
}

/// Gas capped at 400 MW by a prohibitive build cost, against 1600 MWh of
/// demand over four hours. Hours 1 and 3 have surplus, hours 2 and 4 fall short.
fn shortage_tables(battery_power_capex: f64, existing_battery: f64) -> InputTables {
    let mut techno = ParameterTable::new([
        columns::CAPEX,
        columns::CAPEX_STORAGE,
        columns::FOM,
        columns::VOM,
        columns::LIFETIME,
        columns::ETA_IN,
        columns::ETA_OUT,
    ]);
    techno
        .push_row(
            "gas",
            vec![Some(1e7), None, Some(0.0), Some(0.0), Some(30.0), None, None],
        )
        .unwrap();
    techno
        .push_row(
            "battery",
            vec![
                Some(battery_power_capex),
                Some(150.0),
                Some(0.0),
                Some(0.0),
                Some(15.0),
                Some(0.95),
                Some(0.95),
            ],
        )
        .unwrap();
    let mut existing = ParameterTable::new(["gas", "battery"]);
    existing
        .push_row("0", vec![Some(400.0), Some(existing_battery)])
        .unwrap();
    existing.push_row("1", vec![None, Some(existing_battery)]).unwrap();
    InputTables {
        techno_economic: techno,
        existing_capacity: existing,
        lines: vec![LineRecord::new(0, 1, 0.1, 1000.0, 50.0)],
        demand: hourly(&[vec![0.0; 4], vec![300.0, 600.0, 200.0, 500.0]]),
        ..InputTables::default()
    }
}

fn assert_balances(tables: &InputTables, sets: &TechnologySets, result: &ExpansionResult) {
    let v = &result.values;
    let (n_nodes, n_hours) = v.injection.dims();
    for t in 0..n_hours {
        let mut net = 0.0;
        for n in 0..n_nodes {
            let mut supply = v.loss_of_load[(n, t)];
            for g in 0..sets.generation.len() {
                supply += v.dispatch[(g, n, t)];
            }
            for s in 0..sets.storage.len() {
                supply += v.discharge[(s, n, t)] - v.charge[(s, n, t)];
            }
            let demand = tables.demand.node(NodeId::new(n)).unwrap()[t];
            let z = v.injection[(n, t)];
            assert!(
                (supply - demand - z).abs() < TOL,
                "balance at node {} hour {}: supply {} demand {} injection {}",
                n,
                t,
                supply,
                demand,
                z
            );
            net += z;
        }
        assert!(net.abs() < TOL, "injections at hour {} sum to {}", t, net);
    }
}

#[test]
fn two_node_flow_without_investment() {
    let tables = two_node_tables(1000.0);
    let sets = gas_only_sets();
    let result = solve(&tables, &sets, &scenario_params());
    let v = &result.values;

    assert!((v.flow[(0, 0)] - 500.0).abs() < TOL, "flow {}", v.flow[(0, 0)]);
    assert!((v.injection[(0, 0)] - 500.0).abs() < TOL);
    assert!((v.injection[(1, 0)] + 500.0).abs() < TOL);
    assert!(v.total_loss_of_load().abs() < TOL);
    assert!(result.capacity.get("gas", NodeId::new(0)).unwrap().abs() < TOL);
    assert!(result.capacity.get("gas", NodeId::new(1)).unwrap().abs() < TOL);
    assert!(result.line_capacity.get(LineId::new(0)).unwrap().abs() < TOL);
    assert_eq!(result.summary.status, SolveStatus::Optimal.as_str());
    assert_balances(&tables, &sets, &result);
}

#[test]
fn thermal_limit_drives_line_expansion() {
    // 100 MW existing, 500 MW needed: new capacity is split across both
    // directions, so K_T/2 + 100 >= 500.
    let tables = two_node_tables(100.0);
    let result = solve(&tables, &gas_only_sets(), &scenario_params());

    let k_t = result.line_capacity.get(LineId::new(0)).unwrap();
    assert!((k_t - 800.0).abs() < 0.1, "new line capacity {}", k_t);
    assert!((result.values.flow[(0, 0)] - 500.0).abs() < TOL);
    assert!(result.values.total_loss_of_load().abs() < TOL);
    assert!(result.summary.cost_investment_transmission > 0.0);
}

#[test]
fn output_tables_follow_model_sets() {
    let result = solve(&storage_tables(), &storage_sets(), &scenario_params());
    assert_eq!(result.capacity.technologies, vec!["gas", "battery"]);
    assert_eq!(result.capacity.nodes, vec![NodeId::new(0), NodeId::new(1)]);
    assert_eq!(result.line_capacity.lines, vec![LineId::new(0)]);
}

#[test]
fn storage_state_of_charge_is_cyclic() {
    let tables = storage_tables();
    let sets = storage_sets();
    let params = ModelParameters {
        hours: 4,
        ..scenario_params()
    };
    let result = solve(&tables, &sets, &params);
    let v = &result.values;
    let (eta_in, eta_out) = (0.95, 0.95);

    for n in 0..2 {
        for t in 0..4 {
            let prev = if t == 0 { 3 } else { t - 1 };
            let expected = v.state_of_charge[(0, n, prev)] + eta_in * v.charge[(0, n, t)]
                - v.discharge[(0, n, t)] / eta_out;
            assert!(
                (v.state_of_charge[(0, n, t)] - expected).abs() < TOL,
                "state of charge at node {} hour {}",
                n,
                t
            );
            assert!(v.state_of_charge[(0, n, t)] <= v.storage_energy[(0, n)] + TOL);
        }
    }
    assert_balances(&tables, &sets, &result);
}

#[test]
fn single_hour_without_storage_has_no_storage_constraints() {
    let prepared = prepare(&two_node_tables(1000.0), &gas_only_sets(), &scenario_params()).unwrap();
    let model = build_model(&prepared.data, &prepared.ptdf);
    for (family, count) in model.family_counts() {
        if family.is_storage() {
            assert_eq!(*count, 0, "{:?}", family);
        }
    }
    assert_eq!(model.family_count(ConstraintFamily::StorageCyclic), 0);
    assert_eq!(model.variables().state_of_charge.dims(), (0, 2, 1));

    let result = solve(&two_node_tables(1000.0), &gas_only_sets(), &scenario_params());
    assert!(result.values.total_loss_of_load().abs() < TOL);
}

#[test]
fn storage_families_scale_with_hours() {
    let params = ModelParameters {
        hours: 4,
        ..scenario_params()
    };
    let prepared = prepare(&storage_tables(), &storage_sets(), &params).unwrap();
    let model = build_model(&prepared.data, &prepared.ptdf);
    assert_eq!(model.family_count(ConstraintFamily::StorageCyclic), 2);
    assert_eq!(model.family_count(ConstraintFamily::StorageBalance), 6);
    assert_eq!(model.family_count(ConstraintFamily::StorageEnergy), 8);
}

#[test]
fn renewable_target_never_lowers_cost() {
    let tables = two_node_tables(1000.0);
    let sets = TechnologySets {
        generation: vec!["gas".into(), "biomass".into()],
        renewable: vec!["biomass".into()],
        ..gas_only_sets()
    };

    let mut previous: Option<f64> = None;
    for omega in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let params = ModelParameters {
            omega,
            ..scenario_params()
        };
        let result = solve(&tables, &sets, &params);
        let cost = result.summary.objective;
        assert!(result.summary.renewable_share >= omega - TOL);
        if let Some(prev) = previous {
            assert!(
                cost >= prev - TOL * (1.0 + prev.abs()),
                "omega {} cost {} below previous {}",
                omega,
                cost,
                prev
            );
        }
        previous = Some(cost);
    }
}

#[test]
fn land_limit_violation_is_infeasible() {
    let mut tables = two_node_tables(1000.0);
    let mut existing = ParameterTable::new(["gas", "onshore"]);
    existing.push_row("0", vec![Some(1000.0), Some(50.0)]).unwrap();
    tables.existing_capacity = existing;
    tables.wind_capacity_factors = hourly(&[vec![0.5], vec![0.5]]);
    let mut land = ParameterTable::new(["wind", "solar"]);
    land.push_row("0", vec![Some(0.0), Some(0.0)]).unwrap();
    land.push_row("1", vec![Some(10.0), Some(10.0)]).unwrap();
    tables.land_area = land;

    let sets = TechnologySets {
        generation: vec!["gas".into(), "onshore".into()],
        renewable: vec!["onshore".into()],
        ..gas_only_sets()
    };
    let err = run_capacity_expansion(&tables, &sets, &scenario_params(), &SolverOptions::default())
        .unwrap_err();
    assert!(err.is_solve_error(), "unexpected error: {}", err);
    match err {
        ExpansionError::Solve(e) => assert_eq!(e.status(), SolveStatus::Infeasible),
        other => panic!("expected solve error, got {}", other),
    }
}

#[test]
fn disconnected_topology_is_a_build_error() {
    let mut tables = two_node_tables(1000.0);
    tables.lines = vec![LineRecord::new(0, 1, 0.1, 1000.0, 50.0)];
    tables.demand = hourly(&[vec![0.0], vec![500.0], vec![0.0]]);
    let sets = TechnologySets {
        nodes: 3,
        ..gas_only_sets()
    };
    let err = run_capacity_expansion(&tables, &sets, &scenario_params(), &SolverOptions::default())
        .unwrap_err();
    assert!(err.is_build_error());
    assert!(err.to_string().contains("not connected"));
}

#[test]
fn unknown_solver_is_a_build_error() {
    let options = SolverOptions {
        name: "glpk".into(),
        ..SolverOptions::default()
    };
    let err = run_capacity_expansion(
        &two_node_tables(1000.0),
        &gas_only_sets(),
        &scenario_params(),
        &options,
    )
    .unwrap_err();
    assert!(err.is_build_error());
    assert!(err.to_string().contains("glpk"));
}

#[test]
fn storage_power_limits_bind_at_optimum() {
    let tables = shortage_tables(300.0, 0.0);
    let params = ModelParameters {
        hours: 4,
        ..scenario_params()
    };
    let result = solve(&tables, &storage_sets(), &params);
    let v = &result.values;

    // 300 MWh of surplus shifted at 0.95 x 0.95 round trip covers 270.75 MWh
    let lol = v.total_loss_of_load();
    assert!((lol - 29.25).abs() < 0.1, "loss of load {}", lol);

    let mut built = 0.0;
    for n in 0..2 {
        let k = result.capacity.get("battery", NodeId::new(n)).unwrap();
        let mut peak: f64 = 0.0;
        for t in 0..4 {
            let (cp, dp) = (v.charge[(0, n, t)], v.discharge[(0, n, t)]);
            assert!(cp <= k + TOL && dp <= k + TOL, "node {} hour {} exceeds {}", n, t, k);
            peak = peak.max(cp).max(dp);
        }
        assert!((peak - k).abs() < 1e-2, "node {}: peak use {} vs power {}", n, peak, k);
        built += k;
    }
    assert!(built > 100.0, "battery power built {}", built);
    assert_balances(&tables, &storage_sets(), &result);
}

#[test]
fn existing_storage_power_does_not_allow_cycling() {
    // New battery power is priced out; only existing power is available
    let tables = shortage_tables(1e7, 500.0);
    let params = ModelParameters {
        hours: 4,
        ..scenario_params()
    };
    let result = solve(&tables, &storage_sets(), &params);
    let v = &result.values;

    for n in 0..2 {
        assert!(result.capacity.get("battery", NodeId::new(n)).unwrap().abs() < TOL);
        for t in 0..4 {
            assert!(v.charge[(0, n, t)].abs() < TOL, "charging at node {} hour {}", n, t);
            assert!(v.discharge[(0, n, t)].abs() < TOL);
        }
    }
    let lol = v.total_loss_of_load();
    assert!((lol - 300.0).abs() < 0.1, "loss of load {}", lol);
}

#[test]
fn wind_output_and_land_ceiling_bind() {
    let mut tables = two_node_tables(1000.0);
    tables.wind_capacity_factors = hourly(&[vec![0.5], vec![0.5]]);
    let mut land = ParameterTable::new(["wind", "solar"]);
    land.push_row("0", vec![Some(60.0), Some(0.0)]).unwrap();
    land.push_row("1", vec![Some(60.0), Some(0.0)]).unwrap();
    tables.land_area = land;

    let sets = TechnologySets {
        generation: vec!["gas".into(), "onshore".into()],
        renewable: vec!["onshore".into()],
        ..gas_only_sets()
    };
    let params = ModelParameters {
        omega: 1.0,
        ..scenario_params()
    };
    let result = solve(&tables, &sets, &params);
    let v = &result.values;

    // 60 km² at 5 MW/km² is 300 MW, divided by 1.5 for the reserve margin
    for n in 0..2 {
        let k = result.capacity.get("onshore", NodeId::new(n)).unwrap();
        assert!((k - 200.0).abs() < 0.1, "onshore at node {}: {}", n, k);
        assert!((v.dispatch[(1, n, 0)] - 100.0).abs() < 0.1);
        assert!(v.dispatch[(0, n, 0)].abs() < TOL, "gas runs at node {}", n);
    }
    let lol = v.total_loss_of_load();
    assert!((lol - 300.0).abs() < 0.1, "loss of load {}", lol);
    assert_balances(&tables, &sets, &result);
}

#[test]
fn negative_cost_is_a_build_error() {
    let mut tables = two_node_tables(1000.0);
    let mut techno = ParameterTable::new([
        columns::CAPEX,
        columns::FOM,
        columns::VOM,
        columns::LIFETIME,
    ]);
    techno
        .push_row("gas", vec![Some(-1000.0), Some(0.0), Some(0.0), Some(30.0)])
        .unwrap();
    tables.techno_economic = techno;

    let sets = gas_only_sets();
    let err = run_capacity_expansion(&tables, &sets, &scenario_params(), &SolverOptions::default())
        .unwrap_err();
    assert!(err.is_build_error(), "unexpected error: {}", err);
    assert!(err.to_string().contains("non-negative"));
}
