//! The command line interface for the maintenance calculator.
use crate::aggregate::AggregationResult;
use crate::category::MaintenanceCategory;
use crate::input::segment::known_regions;
use crate::input::{read_scenario, read_segments};
use crate::log;
use crate::orchestrator::{CalculationInputs, Calculator};
use crate::output::{create_output_directory, get_output_dir, write_parameters, write_summary};
use crate::parameters::apply_override;
use crate::predicate::{DEFAULT_SURVEY_YEAR, FieldSchema, build_combined_predicate};
use crate::region::parse_region_str;
use crate::remote::{FeatureSource, LengthMode};
use crate::settings::{FeatureServiceSettings, Settings};
use ::log::{info, warn};
use anyhow::{Context, Result, bail, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// Road maintenance needs and costs from pavement condition surveys.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options adjusting the scenario read from the data directory
#[derive(Args, Default, Clone)]
pub struct ScenarioOpts {
    /// Regions to include, as `all` or a `;`-separated list (overrides the scenario file)
    #[arg(long)]
    pub regions: Option<String>,
    /// Override a threshold or cost, e.g. `--set overlay_iri=8` or `--set cost_rr=75`
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,
}

/// Options for the run command
#[derive(Args, Default, Clone)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// URL of a remote feature layer to query (overrides the settings file)
    #[arg(long)]
    pub feature_service: Option<String>,
    /// Survey year of the remote condition fields
    #[arg(long)]
    pub survey_year: Option<u32>,
    /// How remote lengths are derived: `fixed` or `measured`
    #[arg(long, value_parser = LengthMode::from_str)]
    pub length_mode: Option<LengthMode>,
    /// Scenario adjustments
    #[command(flatten)]
    pub scenario: ScenarioOpts,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Calculate maintenance lengths and costs for a dataset.
    Run {
        /// Path to the data directory.
        data_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example datasets.
    Example {
        /// The available subcommands for managing example datasets.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Validate a dataset and scenario.
    Validate {
        /// The path to the data directory.
        data_dir: PathBuf,
    },
    /// Print the query filter for each maintenance category.
    Predicates {
        /// Data directory whose scenario file is used (defaults are used if omitted).
        data_dir: Option<PathBuf>,
        /// Survey year of the remote condition fields
        #[arg(long, default_value_t = DEFAULT_SURVEY_YEAR)]
        survey_year: u32,
        /// Scenario adjustments
        #[command(flatten)]
        scenario: ScenarioOpts,
    },
    /// Manage program settings.
    Settings {
        /// The subcommands for managing the settings file
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { data_dir, opts } => handle_run_command(&data_dir, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { data_dir } => handle_validate_command(&data_dir, None),
            Self::Predicates {
                data_dir,
                survey_year,
                scenario,
            } => handle_predicates_command(data_dir.as_deref(), survey_year, &scenario),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ rmo --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Read the scenario from `data_dir` (if any) and apply the command-line adjustments
fn load_inputs(data_dir: Option<&Path>, opts: &ScenarioOpts) -> Result<CalculationInputs> {
    let mut inputs = match data_dir {
        Some(data_dir) => read_scenario(data_dir)
            .context("Failed to load scenario.")?
            .into_inputs(),
        None => CalculationInputs::default(),
    };

    if let Some(regions) = &opts.regions {
        inputs.region_filter = parse_region_str(regions)?;
    }
    for assignment in &opts.overrides {
        apply_override(&mut inputs.parameters, &mut inputs.costs, assignment)?;
    }

    Ok(inputs)
}

/// The feature service to use, with command-line options taking precedence over settings
fn feature_service_settings(
    settings: &Settings,
    opts: &RunOpts,
) -> Option<FeatureServiceSettings> {
    let mut service = match (&opts.feature_service, &settings.feature_service) {
        (Some(url), _) => FeatureServiceSettings::new(url),
        (None, Some(service)) => service.clone(),
        (None, None) => return None,
    };

    if let Some(survey_year) = opts.survey_year {
        service.survey_year = survey_year;
    }
    if let Some(length_mode) = opts.length_mode {
        service.length_mode = length_mode;
    }

    Some(service)
}

/// Write the per-category results to the log
fn log_summary(result: &AggregationResult) {
    for (category, totals) in result.iter() {
        info!(
            "{category}: {} segments, {:.1} km ({:.1}%), cost {:.0} ({:.1}%)",
            totals.segment_count,
            totals.length.value(),
            result.length_share(category),
            totals.cost.value(),
            result.cost_share(category),
        );
    }
    info!(
        "Total: {:.1} km, cost {:.0}",
        result.total_length().value(),
        result.total_cost().value()
    );
}

/// Handle the `run` command.
pub fn handle_run_command(
    data_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(data_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    log::init(Some(&settings.log_level), Some(output_path))
        .context("Failed to initialise logging.")?;

    let inputs = load_inputs(Some(data_path), &opts.scenario)?;
    let segments = read_segments(data_path).context("Failed to load segments.")?;
    let service = feature_service_settings(&settings, opts);
    ensure!(
        segments.is_some() || service.is_some(),
        "No segment data found in {} and no feature service configured",
        data_path.display()
    );
    info!("Loaded dataset from {}", data_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    if let Some(segments) = &segments {
        info!("{} local segments", segments.len());
        if let Err(err) = inputs.region_filter.validate(&known_regions(segments)) {
            warn!("{err}");
        }
    }

    let (remote, length_mode) = match &service {
        Some(service) => {
            info!("Querying feature service at {}", service.url);
            let client: Arc<dyn FeatureSource> = Arc::new(service.connect()?);
            (Some(client), service.length_mode)
        }
        None => (None, LengthMode::default()),
    };
    let calculator = Calculator::new(remote, segments.map(Arc::from), length_mode);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime.")?;
    let outcome = runtime.block_on(calculator.run_calculations(&inputs));

    info!(
        "Calculated maintenance needs for regions: {} (source: {})",
        inputs.region_filter, outcome.source
    );
    if let Some(err) = &outcome.remote_failure {
        warn!("Results are not from the feature service: {err}");
    }
    log_summary(&outcome.result);

    write_summary(output_path, &outcome.result)?;
    write_parameters(output_path, &inputs.parameters, &inputs.costs)?;
    info!("Calculation complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(data_path: &Path, settings: Option<Settings>) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(&settings.log_level), None).context("Failed to initialise logging.")?;

    let inputs = load_inputs(Some(data_path), &ScenarioOpts::default())?;
    let Some(segments) = read_segments(data_path).context("Failed to load segments.")? else {
        bail!("No segment data found in {}", data_path.display());
    };
    inputs
        .region_filter
        .validate(&known_regions(&segments))
        .context("Invalid region selection in scenario.")?;

    info!("{} segments", segments.len());
    info!("Dataset validation successful!");

    Ok(())
}

/// Handle the `predicates` command.
fn handle_predicates_command(
    data_path: Option<&Path>,
    survey_year: u32,
    opts: &ScenarioOpts,
) -> Result<()> {
    let inputs = load_inputs(data_path, opts)?;
    let schema = FieldSchema::for_survey_year(survey_year);

    for category in MaintenanceCategory::iter() {
        let predicate =
            build_combined_predicate(&inputs.parameters, &inputs.region_filter, Some(category));
        println!("{category}:\n  {}", predicate.to_sql(&schema));
    }

    Ok(())
}
