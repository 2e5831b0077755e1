//! Experiment directory convention.
//!
//! ```text
//! <root>/
//! ├── inputs/
//! │   ├── parameters_techno_econ.csv
//! │   ├── electricity_gencap_existing.csv
//! │   ├── electricity_transcap_connections.csv
//! │   ├── electricity_demand.csv
//! │   ├── electricity_gencap_factors_new_wind.csv
//! │   └── electricity_gencap_factors_new_solar.csv
//! └── outputs/
//!     ├── region_area_generation.csv            (land-cover step)
//!     ├── optimized_gencap_{pct}%_renew.csv
//!     ├── optimized_transcap_{pct}%_renew.csv
//!     └── run_summary_{pct}%_renew.json
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Resolved locations of every file one run touches.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentPaths {
    pub techno_economic: PathBuf,
    pub existing_capacity: PathBuf,
    pub transmission: PathBuf,
    pub demand: PathBuf,
    pub wind_capacity_factors: PathBuf,
    pub solar_capacity_factors: PathBuf,
    pub land_area: PathBuf,
    pub output_dir: PathBuf,
}

/// Optional per-file overrides, relative to a base directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOverrides {
    pub root: Option<PathBuf>,
    pub techno_economic: Option<PathBuf>,
    pub existing_capacity: Option<PathBuf>,
    pub transmission: Option<PathBuf>,
    pub demand: Option<PathBuf>,
    pub wind_capacity_factors: Option<PathBuf>,
    pub solar_capacity_factors: Option<PathBuf>,
    pub land_area: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Whole-percent renewable target used in output file names.
///
/// Truncates `omega * 100` without snapping, so existing result folders keep
/// their names: 0.29 is stored as 0.28999... and is tagged `28%`.
pub fn renew_pct(omega: f64) -> u32 {
    (omega * 100.0).max(0.0) as u32
}

impl ExperimentPaths {
    pub fn convention(root: &Path) -> Self {
        let inputs = root.join("inputs");
        let outputs = root.join("outputs");
        Self {
            techno_economic: inputs.join("parameters_techno_econ.csv"),
            existing_capacity: inputs.join("electricity_gencap_existing.csv"),
            transmission: inputs.join("electricity_transcap_connections.csv"),
            demand: inputs.join("electricity_demand.csv"),
            wind_capacity_factors: inputs.join("electricity_gencap_factors_new_wind.csv"),
            solar_capacity_factors: inputs.join("electricity_gencap_factors_new_solar.csv"),
            land_area: outputs.join("region_area_generation.csv"),
            output_dir: outputs,
        }
    }

    /// Convention paths under `base` (or `base/root`), then explicit overrides.
    pub fn resolve(base: &Path, overrides: &PathOverrides) -> Self {
        let root = match &overrides.root {
            Some(root) => base.join(root),
            None => base.to_path_buf(),
        };
        let mut paths = Self::convention(&root);
        let apply = |slot: &mut PathBuf, value: &Option<PathBuf>| {
            if let Some(p) = value {
                *slot = base.join(p);
            }
        };
        apply(&mut paths.techno_economic, &overrides.techno_economic);
        apply(&mut paths.existing_capacity, &overrides.existing_capacity);
        apply(&mut paths.transmission, &overrides.transmission);
        apply(&mut paths.demand, &overrides.demand);
        apply(&mut paths.wind_capacity_factors, &overrides.wind_capacity_factors);
        apply(&mut paths.solar_capacity_factors, &overrides.solar_capacity_factors);
        apply(&mut paths.land_area, &overrides.land_area);
        apply(&mut paths.output_dir, &overrides.output_dir);
        paths
    }

    pub fn gencap_output(&self, omega: f64) -> PathBuf {
        self.output_dir
            .join(format!("optimized_gencap_{}%_renew.csv", renew_pct(omega)))
    }

    pub fn transcap_output(&self, omega: f64) -> PathBuf {
        self.output_dir
            .join(format!("optimized_transcap_{}%_renew.csv", renew_pct(omega)))
    }

    pub fn summary_output(&self, omega: f64) -> PathBuf {
        self.output_dir
            .join(format!("run_summary_{}%_renew.json", renew_pct(omega)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_use_whole_percent() {
        let paths = ExperimentPaths::convention(Path::new("exp"));
        assert_eq!(
            paths.gencap_output(1.0),
            Path::new("exp/outputs/optimized_gencap_100%_renew.csv")
        );
        assert_eq!(
            paths.transcap_output(0.755),
            Path::new("exp/outputs/optimized_transcap_75%_renew.csv")
        );
        assert_eq!(renew_pct(0.5), 50);
        assert_eq!(renew_pct(0.29), 28);
        assert_eq!(renew_pct(0.0), 0);
    }

    #[test]
    fn overrides_are_relative_to_base() {
        let overrides = PathOverrides {
            root: Some("run1".into()),
            demand: Some("shared/demand.csv".into()),
            ..PathOverrides::default()
        };
        let paths = ExperimentPaths::resolve(Path::new("/data"), &overrides);
        assert_eq!(paths.demand, Path::new("/data/shared/demand.csv"));
        assert_eq!(
            paths.techno_economic,
            Path::new("/data/run1/inputs/parameters_techno_econ.csv")
        );
        assert_eq!(paths.output_dir, Path::new("/data/run1/outputs"));
    }
}
