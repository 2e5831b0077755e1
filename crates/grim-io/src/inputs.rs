use crate::csv_tables::{read_lines, read_parameter_table, read_time_series};
use crate::paths::ExperimentPaths;
use grim_core::{GrimError, GrimResult, InputTables};
use std::path::Path;
use tracing::{info, instrument};

/// Optional tables a run actually needs.
///
/// Capacity-factor series and land areas only matter when wind or solar is a
/// generation technology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiredTables {
    pub wind: bool,
    pub solar: bool,
}

fn require_file(path: &Path) -> GrimResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(GrimError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input file not found: {}", path.display()),
        )))
    }
}

/// Read every input table of one run.
#[instrument(skip_all, fields(wind = required.wind, solar = required.solar))]
pub fn load_inputs(paths: &ExperimentPaths, required: RequiredTables) -> GrimResult<InputTables> {
    for path in [
        &paths.techno_economic,
        &paths.existing_capacity,
        &paths.transmission,
        &paths.demand,
    ] {
        require_file(path)?;
    }

    let mut tables = InputTables {
        techno_economic: read_parameter_table(&paths.techno_economic)?,
        existing_capacity: read_parameter_table(&paths.existing_capacity)?,
        lines: read_lines(&paths.transmission)?,
        demand: read_time_series(&paths.demand)?,
        ..InputTables::default()
    };

    if required.wind {
        require_file(&paths.wind_capacity_factors)?;
        tables.wind_capacity_factors = read_time_series(&paths.wind_capacity_factors)?;
    }
    if required.solar {
        require_file(&paths.solar_capacity_factors)?;
        tables.solar_capacity_factors = read_time_series(&paths.solar_capacity_factors)?;
    }
    if required.wind || required.solar {
        require_file(&paths.land_area)?;
        tables.land_area = read_parameter_table(&paths.land_area)?;
    }

    info!(
        technologies = tables.techno_economic.num_rows(),
        lines = tables.lines.len(),
        demand_hours = tables.demand.num_rows(),
        "inputs loaded"
    );
    Ok(tables)
}
