mod input;
mod logging;
mod model;
mod pipeline;
mod report;
mod stats;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::info;

use crate::input::columns::ColumnMap;
use crate::input::{InputError, LoadOptions, load_cohort};
use crate::model::thresholds::{AnalysisProfile, NdiDefinition};
use crate::pipeline::stage1_outcomes::run_stage1;
use crate::pipeline::stage2_discrimination::{Stage2Params, run_stage2};
use crate::pipeline::stage3_tertiles::{Stage3Params, run_stage3};
use crate::pipeline::stage4_report::{Stage4Input, write_reports};
use crate::report::{ReportError, ToolInfo};
use crate::stats::roc::Direction;

#[derive(Debug, Error)]
enum RunError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Parser)]
#[command(
    name = "ndi-riskeval",
    version,
    about = "Evaluate composite developmental-risk scores against neurodevelopmental impairment"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full analysis and write reports.
    Run(RunArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Auto,
    Higher,
    Lower,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Auto => Direction::Auto,
            DirectionArg::Higher => Direction::HigherIsRisk,
            DirectionArg::Lower => Direction::LowerIsRisk,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Participant table (CSV/TSV, optionally .gz).
    #[arg(long)]
    input: PathBuf,
    /// Output directory.
    #[arg(long)]
    out: PathBuf,
    /// Domain score below which a participant counts as impaired.
    #[arg(long, default_value_t = 85.0)]
    threshold: f64,
    /// Bootstrap replicates; 0 disables confidence intervals.
    #[arg(long, default_value_t = 2000)]
    n_boot: usize,
    #[arg(long, default_value_t = 20240131)]
    seed: u64,
    #[arg(long, default_value_t = 0.95)]
    conf_level: f64,
    #[arg(long, value_enum, default_value_t = DirectionArg::Auto)]
    direction: DirectionArg,
    /// Numeric column to adjust the tertile models for (repeatable).
    #[arg(long = "covariate")]
    covariates: Vec<String>,
    /// Field delimiter; defaults to tab for .tsv and comma otherwise.
    #[arg(long)]
    delimiter: Option<char>,
    /// Column overrides; unset columns keep their default header names.
    #[arg(long)]
    id_col: Option<String>,
    #[arg(long)]
    cognitive_col: Option<String>,
    #[arg(long)]
    language_col: Option<String>,
    #[arg(long)]
    motor_col: Option<String>,
    #[arg(long)]
    supervised_score_col: Option<String>,
    #[arg(long)]
    supervised_tertile_col: Option<String>,
    #[arg(long)]
    unsupervised_score_col: Option<String>,
    #[arg(long)]
    unsupervised_tertile_col: Option<String>,
    /// Skip the SVG charts.
    #[arg(long)]
    no_plots: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone)]
struct RunConfig {
    input: PathBuf,
    out_dir: PathBuf,
    delimiter: Option<u8>,
    columns: ColumnMap,
    profile: AnalysisProfile,
}

fn main() {
    let cli = Cli::parse();
    let Command::Run(args) = cli.command;
    logging::init(args.verbose);
    if let Err(err) = run(&args) {
        tracing::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &RunArgs) -> Result<(), RunError> {
    let config = build_config(args)?;

    let columns = &config.columns;
    let cohort = load_cohort(
        &config.input,
        &LoadOptions {
            columns,
            covariates: &config.profile.covariates,
            delimiter: config.delimiter,
        },
    )?;

    let profile = &config.profile;
    let outcomes = run_stage1(&cohort, &profile.ndi);
    let discrimination = run_stage2(
        &cohort,
        &outcomes,
        &Stage2Params {
            direction: profile.direction,
            n_boot: profile.n_boot,
            conf_level: profile.conf_level,
            seed: profile.seed,
        },
    );
    let tertiles = run_stage3(
        &cohort,
        &outcomes,
        &Stage3Params {
            conf_level: profile.conf_level,
            direction: profile.direction,
        },
    );

    let tool = ToolInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: read_git_hash(Path::new(".")),
    };
    let input = Stage4Input {
        tool: &tool,
        input_path: &cohort.source,
        profile,
        outcomes: &outcomes,
        discrimination: &discrimination,
        tertiles: &tertiles,
    };
    let written = write_reports(&input, &config.out_dir)?;
    info!(n_files = written.len(), out = %config.out_dir.display(), "analysis complete");
    Ok(())
}

fn build_config(args: &RunArgs) -> Result<RunConfig, RunError> {
    let delimiter = match args.delimiter {
        None => None,
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => {
            return Err(RunError::Config(format!(
                "delimiter must be a single ASCII character, got {c:?}"
            )));
        }
    };

    let mut columns = ColumnMap::default_v1();
    let ColumnMap {
        id,
        domains: [cognitive, language, motor],
        scores: [supervised_score, unsupervised_score],
        tertiles: [supervised_tertile, unsupervised_tertile],
    } = &mut columns;
    let overrides = [
        (id, &args.id_col),
        (cognitive, &args.cognitive_col),
        (language, &args.language_col),
        (motor, &args.motor_col),
        (supervised_score, &args.supervised_score_col),
        (unsupervised_score, &args.unsupervised_score_col),
        (supervised_tertile, &args.supervised_tertile_col),
        (unsupervised_tertile, &args.unsupervised_tertile_col),
    ];
    for (slot, value) in overrides {
        if let Some(name) = value {
            *slot = name.clone();
        }
    }

    let mut profile = AnalysisProfile::default_v1();
    profile.ndi = NdiDefinition {
        threshold: args.threshold,
    };
    profile.n_boot = args.n_boot;
    profile.seed = args.seed;
    profile.conf_level = args.conf_level;
    profile.direction = args.direction.into();
    profile.covariates = args.covariates.clone();
    profile.plots = !args.no_plots;
    profile.validate().map_err(RunError::Config)?;

    Ok(RunConfig {
        input: args.input.clone(),
        out_dir: args.out.clone(),
        delimiter,
        columns,
        profile,
    })
}

fn read_git_hash(repo_root: &Path) -> Option<String> {
    let head = repo_root.join(".git/HEAD");
    let content = std::fs::read_to_string(head).ok()?;
    if let Some(ref_line) = content.strip_prefix("ref: ") {
        let ref_path = repo_root.join(".git").join(ref_line.trim());
        return std::fs::read_to_string(ref_path)
            .ok()
            .map(|s| s.trim().to_string());
    }
    Some(content.trim().to_string())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
