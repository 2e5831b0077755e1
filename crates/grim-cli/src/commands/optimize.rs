//! `grim optimize`: solve one scenario and write its result tables.

use anyhow::{Context, Result};
use grim_algo::{run_capacity_expansion, ExpansionError};
use grim_cli::{Scenario, ScenarioArgs};
use grim_io::{load_inputs, renew_pct, CsvSink, OutputSink};
use tracing::info;

pub fn handle(scenario_args: &ScenarioArgs, solver: Option<&str>, threads: Option<u32>) -> Result<()> {
    let mut scenario = Scenario::load(scenario_args)?;
    scenario.apply_solver_overrides(solver, threads);

    let params = scenario.params();
    let paths = scenario.paths();
    info!(
        omega = params.omega,
        hours = params.hours,
        solver = %scenario.solver().name,
        "optimizing scenario"
    );

    let tables = load_inputs(&paths, scenario.required_tables()).context("loading inputs")?;
    let result = run_capacity_expansion(&tables, scenario.sets(), &params, scenario.solver())?;

    let mut sink = CsvSink::for_run(&paths, params.omega);
    write_outputs(&mut sink, &result).map_err(|e| ExpansionError::Output(e.to_string()))?;

    let summary = &result.summary;
    println!(
        "Capacity expansion ({}% renewable): status {} via {}",
        renew_pct(params.omega),
        summary.status,
        summary.solver
    );
    println!("  Objective:                {:.4}", summary.objective);
    println!("  Generation investment:    {:.4}", summary.cost_investment_generation);
    println!("  Storage investment:       {:.4}", summary.cost_investment_storage);
    println!("  Transmission investment:  {:.4}", summary.cost_investment_transmission);
    println!("  Operation:                {:.4}", summary.cost_operation);
    println!("  Loss of load penalty:     {:.4}", summary.cost_loss_of_load);
    println!("  Renewable share:          {:.4}", summary.renewable_share);
    println!("  Solve time:               {} ms", summary.solve_time_ms);
    println!("Generation capacity written to {}", sink.gencap.display());
    println!("Line capacity written to {}", sink.transcap.display());
    Ok(())
}

fn write_outputs(sink: &mut impl OutputSink, result: &grim_algo::ExpansionResult) -> Result<()> {
    sink.write_capacity(&result.capacity)?;
    sink.write_line_capacity(&result.line_capacity)?;
    sink.write_summary(&result.summary)?;
    Ok(())
}
