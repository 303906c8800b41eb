//! Code for reading the scenario file, which holds the user's thresholds, costs and region
//! selection.
use super::read_toml;
use crate::orchestrator::CalculationInputs;
use crate::parameters::{CostInputs, MaintenanceParameters};
use crate::region::{RegionFilter, parse_region_str};
use anyhow::Result;
use serde::{Deserialize, Deserializer};
use std::path::Path;

const SCENARIO_FILE_NAME: &str = "scenario.toml";

/// A maintenance planning scenario.
///
/// Every field is optional; missing values take the default thresholds and costs, and every
/// region.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    /// Classification thresholds
    pub parameters: MaintenanceParameters,
    /// Unit costs per square metre
    pub costs: CostInputs,
    /// Regions to include, as `all` or a `;`-separated list
    #[serde(deserialize_with = "deserialise_region_filter")]
    pub regions: RegionFilter,
}

fn deserialise_region_filter<'de, D>(deserialiser: D) -> Result<RegionFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserialiser)?;
    parse_region_str(&s).map_err(serde::de::Error::custom)
}

impl Scenario {
    /// Convert into the inputs of a calculation run
    pub fn into_inputs(self) -> CalculationInputs {
        CalculationInputs {
            parameters: self.parameters,
            costs: self.costs,
            region_filter: self.regions,
        }
    }
}

/// Read the scenario from the specified data directory.
///
/// If there is no scenario file, the default scenario is returned.
pub fn read_scenario(data_dir: &Path) -> Result<Scenario> {
    let file_path = data_dir.join(SCENARIO_FILE_NAME);
    if !file_path.is_file() {
        return Ok(Scenario::default());
    }

    read_toml(&file_path)
}
