use anyhow::{Context, Result};
use grim_algo::{build_model, prepare, BuildError};
use grim_cli::{Scenario, ScenarioArgs};
use grim_core::graph_utils;
use grim_io::load_inputs;

/// Load and assemble a scenario without solving it.
pub fn handle(scenario_args: &ScenarioArgs) -> Result<()> {
    let scenario = Scenario::load(scenario_args)?;
    let paths = scenario.paths();
    let tables = load_inputs(&paths, scenario.required_tables()).context("loading inputs")?;

    let params = scenario.params();
    scenario.solver().kind().map_err(BuildError::Solver)?;
    let prepared = prepare(&tables, scenario.sets(), &params)?;
    let data = &prepared.data;
    let stats = graph_utils::topology_stats(data.n_nodes, &data.lines);
    let model = build_model(data, &prepared.ptdf);

    println!("Scenario is valid");
    println!(
        "  Nodes: {}, lines: {} (components: {}, max degree: {})",
        stats.node_count, stats.line_count, stats.connected_components, stats.max_degree
    );
    println!(
        "  Generation: {}, storage: {}, hours: {}",
        data.generation.len(),
        data.storage.len(),
        data.n_hours
    );
    println!(
        "  Variables: {}, constraints: {}",
        model.num_variables(),
        model.num_constraints()
    );
    for (family, count) in model.family_counts() {
        println!("    {:<18} {}", family.as_str(), count);
    }
    Ok(())
}
