//! Classification of road segments into maintenance categories, and aggregation of the length
//! and cost of each category, either locally or against a remote feature service.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod aggregate;
pub mod category;
pub mod classify;
pub mod cli;
pub mod id;
pub mod input;
pub mod log;
pub mod orchestrator;
pub mod output;
pub mod parameters;
pub mod predicate;
pub mod region;
pub mod remote;
pub mod rules;
pub mod segment;
pub mod settings;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the config folder for the program.
///
/// Falls back to the current directory if the platform has no config folder.
pub fn get_rmo_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        return PathBuf::from(".");
    };
    config_dir.push("rmo");

    config_dir
}
