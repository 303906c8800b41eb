//! Code for loading program settings.
use crate::get_rmo_config_dir;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use crate::predicate::{DEFAULT_SURVEY_YEAR, FieldSchema};
use crate::remote::LengthMode;
use crate::remote::feature_service::FeatureServiceClient;
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_FILE_NAME: &str = "settings.toml";

const DEFAULT_SETTINGS_FILE_HEADER: &str = "# This file contains the program settings for rmo
# Uncomment a line to change a setting from its default value.
";

/// Placeholder URL shown in the default settings file
const EXAMPLE_FEATURE_SERVICE_URL: &str =
    "https://example.com/arcgis/rest/services/Roads/FeatureServer/0";

/// Default log level for program
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_survey_year() -> u32 {
    DEFAULT_SURVEY_YEAR
}

fn default_timeout_secs() -> u64 {
    30
}

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    let mut path = get_rmo_config_dir();
    path.push(SETTINGS_FILE_NAME);

    path
}

/// Connection details for a remote feature layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FeatureServiceSettings {
    /// URL of the feature layer
    pub url: String,
    /// Survey year whose measurement columns are queried
    #[serde(default = "default_survey_year")]
    pub survey_year: u32,
    /// How lengths are derived: `fixed` or `measured`
    #[serde(default)]
    pub length_mode: LengthMode,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FeatureServiceSettings {
    /// Settings for the layer at `url` with default options
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            survey_year: DEFAULT_SURVEY_YEAR,
            length_mode: LengthMode::default(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Create a client for the configured layer
    pub fn connect(&self) -> Result<FeatureServiceClient> {
        FeatureServiceClient::new(
            &self.url,
            FieldSchema::for_survey_year(self.survey_year),
            Duration::from_secs(self.timeout_secs),
        )
        .with_context(|| format!("Could not create client for {}", self.url))
    }
}

/// Program settings from config file
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// The default program log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether to overwrite output files by default
    #[serde(default)]
    pub overwrite: bool,
    /// Remote feature layer to query before falling back to local data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_service: Option<FeatureServiceSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            overwrite: false,
            feature_service: None,
        }
    }
}

impl Settings {
    /// Read the contents of the settings file.
    ///
    /// If the file is not present, default values for settings will be used
    ///
    /// # Returns
    ///
    /// The program settings as a `Settings` struct or an error if the file is invalid
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    /// Read from the specified path, returning defaults if the file doesn't exist
    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Ok(Settings::default());
        }

        read_toml(file_path)
    }

    /// The contents of the default settings file, with every setting commented out and
    /// documented
    pub fn default_file_contents() -> Result<String> {
        let settings_raw = toml::to_string(&Settings::default())
            .context("Could not convert settings to TOML")?;

        let mut out = DEFAULT_SETTINGS_FILE_HEADER.to_string();
        for line in settings_raw.lines() {
            let Some(last) = line.find('=') else {
                continue;
            };

            let field = line[..last].trim();
            let docs = Settings::get_field_docs(field)
                .ok()
                .with_context(|| format!("Missing doc comment for field {field}"))?;
            for doc_line in docs.lines() {
                write!(&mut out, "\n# # {}\n", doc_line.trim())?;
            }

            writeln!(&mut out, "# {}", line.trim())?;
        }

        // Not emitted by default, so document by example
        let example = FeatureServiceSettings::new(EXAMPLE_FEATURE_SERVICE_URL);
        let example = toml::to_string(&example).context("Could not convert settings to TOML")?;
        let docs = Settings::get_field_docs("feature_service")
            .ok()
            .context("Missing doc comment for field feature_service")?;
        write!(&mut out, "\n# # {docs}\n# [feature_service]\n")?;
        for line in example.lines() {
            writeln!(&mut out, "# {line}")?;
        }

        Ok(out)
    }
}
