//! The module responsible for writing output data to disk.
use crate::aggregate::AggregationResult;
use crate::category::MaintenanceCategory;
use crate::parameters::{CostInputs, MaintenanceParameters};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

/// The root folder in which dataset-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "rmo_results";

/// The output file name for the per-category summary
pub const SUMMARY_FILE_NAME: &str = "maintenance_summary.csv";

/// The output file name for the parameters used in a run
pub const PARAMETERS_FILE_NAME: &str = "parameters.csv";

/// Label of the row holding the network totals
const TOTAL_ROW_LABEL: &str = "TOTAL";

/// Get the output folder for the dataset in the specified directory
pub fn get_output_dir(data_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let data_dir = data_dir
        .canonicalize()
        .context("Could not resolve path to dataset")?;

    let dataset_name = data_dir
        .file_name()
        .context("Dataset cannot be in root folder")?
        .to_str()
        .context("Invalid chars in dataset dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, dataset_name].iter().collect())
}

/// Create a new output directory, deleting an existing non-empty one if `allow_overwrite` is set.
///
/// # Returns
///
/// True if an existing directory was overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let mut overwrite = false;
    if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Already exists and is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        overwrite = true;
    }

    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// A row in the maintenance summary CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SummaryRow {
    category: String,
    segment_count: u64,
    length_km: f64,
    cost_eur: f64,
    length_share: f64,
    cost_share: f64,
}

/// A row in the parameters CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ParameterRow {
    name: String,
    value: f64,
}

/// Write the per-category totals, followed by the network total, to a CSV file
pub fn write_summary(output_path: &Path, result: &AggregationResult) -> Result<()> {
    let file_path = output_path.join(SUMMARY_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;

    for (category, totals) in result.iter() {
        writer.serialize(SummaryRow {
            category: category.to_string(),
            segment_count: totals.segment_count,
            length_km: totals.length.value(),
            cost_eur: totals.cost.value(),
            length_share: result.length_share(category),
            cost_share: result.cost_share(category),
        })?;
    }

    let has_data = !result.is_empty();
    let total_share = if has_data { 100.0 } else { 0.0 };
    writer.serialize(SummaryRow {
        category: TOTAL_ROW_LABEL.to_string(),
        segment_count: result.total_segment_count(),
        length_km: result.total_length().value(),
        cost_eur: result.total_cost().value(),
        length_share: total_share,
        cost_share: total_share,
    })?;
    writer.flush()?;

    Ok(())
}

/// Write every threshold and unit cost used in a run to a CSV file
pub fn write_parameters(
    output_path: &Path,
    parameters: &MaintenanceParameters,
    costs: &CostInputs,
) -> Result<()> {
    let file_path = output_path.join(PARAMETERS_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;

    for (key, value) in parameters.iter() {
        writer.serialize(ParameterRow {
            name: key.to_string(),
            value,
        })?;
    }

    for category in MaintenanceCategory::iter() {
        writer.serialize(ParameterRow {
            name: format!("cost_{}", category.code()),
            value: costs.cost_per_square_metre(category).value(),
        })?;
    }
    writer.flush()?;

    Ok(())
}
