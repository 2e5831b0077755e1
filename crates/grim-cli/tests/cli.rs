//! Integration tests for the `grim` binary

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const TECHNO: &str = "\
technology,CapEx(€/kW),CapExStorage(€/kWh),FOM(€/kW/yr),VOM(€/kWh),Lifetime(yr),eta_in,eta_out
gas,1000,,0,0,30,,
onshore,1200,,0,0,25,,
battery,300,150,0,0,15,0.95,0.95
";

const GAS_ONLY: &str = r#"
[optimization.sets]
nodes = 2
generation = ["gas"]
storage = []
renewable = []

[optimization.params]
hours = 1
omega = 0.0
"#;

/// Two-node experiment: 1000 MW of gas at node 0, 500 MW of demand at node 1.
fn experiment(config: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let inputs = dir.path().join("inputs");
    fs::create_dir_all(&inputs).unwrap();
    write(&inputs, "parameters_techno_econ.csv", TECHNO);
    write(&inputs, "electricity_gencap_existing.csv", "node,gas,onshore\n0,1000,50\n");
    write(
        &inputs,
        "electricity_transcap_connections.csv",
        "region1,region2,x,capacity,length\n0,1,0.1,1000,50\n",
    );
    write(&inputs, "electricity_demand.csv", "0,1\n0,500\n");
    let config_path = dir.path().join("grim.toml");
    fs::write(&config_path, config).unwrap();
    (dir, config_path)
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("grim");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("optimize"))
        .stdout(predicate::str::contains("ptdf"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_optimize_help() {
    let mut cmd = cargo_bin_cmd!("grim");
    cmd.args(["optimize", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--omega"))
        .stdout(predicate::str::contains("--solver"))
        .stdout(predicate::str::contains("--threads"));
}

#[test]
fn test_validate_reports_dimensions() {
    let (_dir, config) = experiment(GAS_ONLY);
    let mut cmd = cargo_bin_cmd!("grim");
    cmd.args(["validate", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Scenario is valid"))
        .stdout(predicate::str::contains("Nodes: 2, lines: 1"))
        .stdout(predicate::str::contains("nodal_balance"));
}

#[test]
fn test_optimize_writes_result_tables() {
    let (dir, config) = experiment(GAS_ONLY);
    let mut cmd = cargo_bin_cmd!("grim");
    cmd.args(["optimize", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("status optimal"));

    let outputs = dir.path().join("outputs");
    let gencap = fs::read_to_string(outputs.join("optimized_gencap_0%_renew.csv")).unwrap();
    assert!(gencap.starts_with("technology,0,1"));
    assert!(gencap.lines().nth(1).unwrap().starts_with("gas,"));

    let transcap = fs::read_to_string(outputs.join("optimized_transcap_0%_renew.csv")).unwrap();
    assert_eq!(transcap.lines().count(), 2);
    assert!(outputs.join("run_summary_0%_renew.json").is_file());
}

#[test]
fn test_omega_flag_names_output_files() {
    let (dir, config) = experiment(GAS_ONLY);
    let mut cmd = cargo_bin_cmd!("grim");
    cmd.args(["optimize", "--omega", "0.29", "--config"])
        .arg(&config)
        .assert()
        .success();
    let outputs = dir.path().join("outputs");
    assert!(outputs.join("optimized_gencap_28%_renew.csv").is_file());
    assert!(!outputs.join("optimized_gencap_29%_renew.csv").exists());
}

#[test]
fn test_unknown_solver_is_a_build_error() {
    let (_dir, config) = experiment(GAS_ONLY);
    let mut cmd = cargo_bin_cmd!("grim");
    cmd.args(["optimize", "--solver", "glpk", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("glpk"));
}

#[test]
fn test_disconnected_node_is_a_build_error() {
    let (dir, config) = experiment(
        r#"
[optimization.sets]
nodes = 3
generation = ["gas"]
storage = []
renewable = []

[optimization.params]
omega = 0.0
"#,
    );
    write(&dir.path().join("inputs"), "electricity_demand.csv", "0,1,2\n0,500,10\n");
    let mut cmd = cargo_bin_cmd!("grim");
    cmd.args(["validate", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not connected"));
}

#[test]
fn test_missing_input_is_a_build_error() {
    let (dir, config) = experiment(GAS_ONLY);
    fs::remove_file(dir.path().join("inputs/electricity_demand.csv")).unwrap();
    let mut cmd = cargo_bin_cmd!("grim");
    cmd.args(["optimize", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("electricity_demand.csv"));
}

#[test]
fn test_infeasible_land_limit_is_a_solve_error() {
    let (dir, config) = experiment(
        r#"
[optimization.sets]
nodes = 2
generation = ["gas", "onshore"]
storage = []
renewable = ["onshore"]

[optimization.params]
omega = 0.0
"#,
    );
    // 50 MW of existing wind on zero land leaves a negative ceiling for new builds
    write(
        &dir.path().join("inputs"),
        "electricity_gencap_factors_new_wind.csv",
        "0,1\n0.5,0.5\n",
    );
    let outputs = dir.path().join("outputs");
    fs::create_dir_all(&outputs).unwrap();
    write(&outputs, "region_area_generation.csv", "node,wind,solar\n0,0,0\n1,0,0\n");

    let mut cmd = cargo_bin_cmd!("grim");
    cmd.args(["optimize", "--config"])
        .arg(&config)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("infeasible"));
}

#[test]
fn test_ptdf_command_writes_matrix() {
    let dir = tempdir().unwrap();
    let lines = dir.path().join("lines.csv");
    fs::write(
        &lines,
        "region1,region2,x,capacity,length\n0,1,0.1,100,10\n1,2,0.1,100,10\n0,2,0.1,100,10\n",
    )
    .unwrap();
    let out = dir.path().join("out/ptdf.csv");

    let mut cmd = cargo_bin_cmd!("grim");
    cmd.args(["ptdf", "--lines"])
        .arg(&lines)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 lines x 3 nodes"));

    let text = fs::read_to_string(&out).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows[0], "line,0,1,2");
    assert_eq!(rows.len(), 4);
    assert!(rows[1].starts_with("0,0,"));
}
