//! failsift CLI: read a JSONL test-event stream, cluster the failures,
//! write the report and the failing-name list (and optionally a scatter
//! plot of the reduced space).
//!
//! Record-level problems are warnings at most; only filesystem and
//! argument errors abort the run. Outputs are written to a temporary file
//! and persisted into place, so an I/O failure never leaves a
//! half-written report behind.

use clap::Parser;
use failsift::{
    read_results, render_failing_names, render_report, render_scatter, FeatureUnit, Normalizer,
    TriageConfig, TriageError,
};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "failsift", version, about = "Cluster failing-test output into ranked root-cause groups")]
struct Cli {
    /// JSONL test-event input file
    input: PathBuf,

    /// Markdown report output path
    #[arg(long, default_value = "triage_report.md")]
    report: PathBuf,

    /// Failing-name list output path
    #[arg(long, default_value = "failing_tests.txt")]
    names: PathBuf,

    /// Also write an SVG scatter plot of the reduced space
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Representative output groups shown per cluster
    #[arg(long, default_value_t = 3)]
    reps: usize,

    /// Reduction target dimension (2 or 3)
    #[arg(long, default_value_t = 2)]
    dims: usize,

    /// DBSCAN neighborhood radius in reduced space
    #[arg(long, default_value_t = 3.0)]
    epsilon: f64,

    /// Minimum points for a dense neighborhood (including the point itself)
    #[arg(long, default_value_t = 2)]
    min_samples: usize,

    /// TF-IDF unit: lines or tokens
    #[arg(long, default_value = "lines")]
    unit: FeatureUnit,

    /// Seed for the manifold reducer
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Omit normalized text from the report
    #[arg(long)]
    hide_normalized: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match triage(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn triage(cli: &Cli) -> failsift::Result<()> {
    let config = TriageConfig::default()
        .with_reps_per_cluster(cli.reps)
        .with_reduce_dims(cli.dims)
        .with_epsilon(cli.epsilon)
        .with_min_samples(cli.min_samples)
        .with_unit(cli.unit)
        .with_seed(cli.seed)
        .with_show_normalized(!cli.hide_normalized);
    config.validate()?;

    let text = std::fs::read_to_string(&cli.input)
        .map_err(|e| TriageError::input_io(cli.input.display().to_string(), e))?;

    let normalizer = Normalizer::new();
    let (results, stats) = read_results(text.lines(), &normalizer, &config);
    info!(
        retained = stats.retained,
        skipped = stats.skipped_lines,
        dropped_empty = stats.dropped_empty,
        "ingested {} lines",
        stats.total_lines
    );

    let outcome = failsift::run(results, &config)?;

    write_atomic(&cli.report, &render_report(&outcome, &config))?;
    write_atomic(&cli.names, &render_failing_names(&outcome))?;

    if let Some(plot_path) = &cli.plot {
        match render_scatter(&outcome) {
            Some(svg) => write_atomic(plot_path, &svg)?,
            None => warn!("fewer than three failing tests; skipping plot"),
        }
    }

    info!(
        tests = outcome.results.len(),
        clusters = outcome.clusters.len(),
        unclustered = format!("{:.1}%", outcome.percent_unclustered()),
        "report written to {}",
        cli.report.display()
    );

    Ok(())
}

/// Write to completion or not at all: stage into a temp file in the
/// destination directory, then persist over the target path.
fn write_atomic(path: &Path, contents: &str) -> failsift::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| TriageError::output_io(path.display().to_string(), e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| TriageError::output_io(path.display().to_string(), e))?;
    tmp.persist(path)
        .map_err(|e| TriageError::output_io(path.display().to_string(), e.error))?;

    Ok(())
}
