//! Epicurve - Epidemic Trajectory Analyzer
//!
//! A CLI tool that batch-processes epidemic-simulation trajectory
//! files, extracts threshold-crossing statistics, and renders
//! annotated dual-axis charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad input file, config, I/O failure, etc.)

mod analysis;
mod chart;
mod cli;
mod config;
mod models;
mod parser;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{BatchReport, RunFile, RunSummary};
use parser::ParserOptions;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        match handle_init_config() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("\n❌ Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    init_logging(&args);

    info!("Epicurve v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the batch
    match run_batch(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .epicurve.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".epicurve.toml");

    if path.exists() {
        eprintln!("⚠️  .epicurve.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .epicurve.toml")?;

    println!("✅ Created .epicurve.toml with default settings.");
    println!("   Edit it to customize directories, the sick threshold, and chart styling.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete batch workflow. Returns the exit code.
fn run_batch(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Discover run files
    println!("🔍 Scanning {} for run files...", args.data_root.display());
    let scan_config = scanner::ScanConfig {
        data_dir_prefix: config.scanner.data_dir_prefix.clone(),
        max_files: (config.scanner.max_files > 0).then_some(config.scanner.max_files),
        model_filter: args.model.clone(),
    };
    let run_scanner = scanner::RunScanner::new(args.data_root.clone(), scan_config);
    let runs = run_scanner.scan()?;

    if runs.is_empty() {
        println!("   No run files found.");
        return Ok(0);
    }
    info!("Found {} run files", runs.len());

    // Handle --dry-run: list runs and exit
    if args.dry_run {
        return handle_dry_run(&runs);
    }

    let plots_root = Path::new(&config.general.plots_dir);
    let results_root = Path::new(&config.general.results_dir);
    std::fs::create_dir_all(results_root)
        .with_context(|| format!("Failed to create {}", results_root.display()))?;

    // Step 2: Process runs, grouped by model
    let mut by_model: BTreeMap<String, Vec<RunFile>> = BTreeMap::new();
    for run in runs {
        by_model.entry(run.model_id.clone()).or_default().push(run);
    }

    let total: usize = by_model.values().map(Vec::len).sum();
    println!(
        "🔬 Processing {} runs across {} models...",
        total,
        by_model.len()
    );

    let progress = make_progress_bar(total as u64, args.quiet)?;
    let parser_options = ParserOptions {
        delimiter: config.parser.delimiter,
        sick_threshold: config.parser.sick_threshold,
    };

    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    for (model_id, model_runs) in &by_model {
        let model_plots = plots_root.join(format!("model_{}", model_id));
        std::fs::create_dir_all(&model_plots)
            .with_context(|| format!("Failed to create {}", model_plots.display()))?;

        let mut output = SummaryOutput::create(args.format, results_root, model_id)?;

        for run in model_runs {
            progress.set_message(format!("{}/{}", model_id, run.job));

            let summary = process_run(run, &parser_options, &config.chart, &model_plots)?;
            *outcome_counts
                .entry(summary.stats.outcome.to_string())
                .or_default() += 1;

            output.append(summary)?;
            progress.inc(1);
        }

        output.finish(results_root, model_id)?;
    }
    progress.finish_and_clear();

    // Step 3: Print summary
    let duration = start_time.elapsed().as_secs_f64();
    println!("\n📊 Batch Summary:");
    println!("   Models: {}", by_model.len());
    println!("   Runs processed: {}", total);
    for (outcome, count) in &outcome_counts {
        println!("   - {}: {}", outcome, count);
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Done! Charts in {}, summaries in {}",
        plots_root.display(),
        results_root.display()
    );

    Ok(0)
}

/// Process a single run file: parse, extract, render, summarize.
fn process_run(
    run: &RunFile,
    parser_options: &ParserOptions,
    chart_config: &config::ChartConfig,
    model_plots: &Path,
) -> Result<RunSummary> {
    debug!("Processing {}", run.path.display());

    let set = parser::parse_file(&run.path, parser_options)
        .with_context(|| format!("Failed to parse {}", run.path.display()))?;
    debug!(
        "{}: {} time points, {} trajectories, N = {}",
        run.job,
        set.len(),
        set.agent_count(),
        set.population
    );
    let stats = analysis::extract(&set.t, &set.n_sick, set.population);

    let spec = chart::compose(&set, &stats, &run.job);
    let chart_path = model_plots.join(format!("{}.svg", run.job));
    chart::render_svg(&spec, &set, chart_config, &chart_path)
        .with_context(|| format!("Failed to render {}", chart_path.display()))?;

    Ok(RunSummary {
        job: run.job.clone(),
        stats,
    })
}

/// Per-model summary sink: a CSV table written incrementally, or a
/// JSON report collected in memory and written at model end.
enum SummaryOutput {
    Csv(report::SummaryWriter),
    Json(BatchReport),
}

impl SummaryOutput {
    fn create(format: OutputFormat, results_root: &Path, model_id: &str) -> Result<Self> {
        match format {
            OutputFormat::Csv => {
                let path = results_root.join(format!("{}.csv", model_id));
                Ok(SummaryOutput::Csv(report::SummaryWriter::create(&path)?))
            }
            OutputFormat::Json => Ok(SummaryOutput::Json(BatchReport::new(model_id.to_string()))),
        }
    }

    fn append(&mut self, summary: RunSummary) -> Result<()> {
        match self {
            SummaryOutput::Csv(writer) => writer.append(&summary.stats),
            SummaryOutput::Json(batch) => {
                batch.runs.push(summary);
                Ok(())
            }
        }
    }

    fn finish(self, results_root: &Path, model_id: &str) -> Result<()> {
        match self {
            SummaryOutput::Csv(_) => Ok(()),
            SummaryOutput::Json(batch) => {
                let path = results_root.join(format!("{}.json", model_id));
                report::write_json_report(&batch, &path)
            }
        }
    }
}

/// Handle --dry-run: list discovered runs, process nothing.
fn handle_dry_run(runs: &[RunFile]) -> Result<i32> {
    println!("\n🔍 Dry run: listing discovered run files...\n");

    for run in runs {
        println!(
            "     📄 model {} / {} ({})",
            run.model_id,
            run.job,
            run.path.display()
        );
    }
    println!("\n   Total: {} runs", runs.len());

    println!("\n✅ Dry run complete. Nothing was processed.");
    Ok(0)
}

/// Build the batch progress bar; hidden in quiet mode.
fn make_progress_bar(total: u64, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("   [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .epicurve.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
