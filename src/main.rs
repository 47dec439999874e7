//! StreamStats - terminal dashboard for streaming-catalog titles
//!
//! Loads a titles CSV, computes headline statistics, renders charts
//! and filter results, and exports tables as CSV.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime or configuration error (missing file, missing column, etc.)

mod analysis;
mod cli;
mod config;
mod dataset;
mod interactive;
mod models;
mod report;
mod session;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dataset::{DatasetCache, LoadOptions};
use models::DashboardSummary;
use session::{Session, SessionSettings};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Configuration decides the log level
    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("StreamStats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run_dashboard(args, config) {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .streamstats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the dataset path, date formats, and more.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the dataset, render the dashboard, then handle export and the
/// interactive session.
fn run_dashboard(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Load the dataset once into the cache
    let data_path = PathBuf::from(&config.general.data_path);
    let mut options = LoadOptions::from(&config.dataset);
    options.show_progress = !args.quiet;

    let mut cache = DatasetCache::new(options);
    if !args.quiet {
        eprintln!("📥 Loading dataset: {}", data_path.display());
    }
    let dataset = cache
        .get_or_load(&data_path)
        .with_context(|| format!("Failed to load dataset {}", data_path.display()))?;

    if dataset.is_empty() {
        warn!("Dataset contains no titles; every statistic will be undefined");
    }

    // Step 2: Compute the dashboard
    let mut session = Session::new(dataset, SessionSettings::from(&config));
    let report = session.report(config.general.preview_rows);

    let rendered = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, config.report.chart_width)
        }
        OutputFormat::Text => report::generate_text_report(&report, config.report.chart_width),
    };

    // Step 3: Print or save the dashboard
    match args.output {
        Some(ref output) => {
            std::fs::write(output, &rendered)
                .with_context(|| format!("Failed to write dashboard to {}", output.display()))?;
            if !args.quiet {
                print_summary(session.summary());
                println!("\n✅ Dashboard saved to: {}", output.display());
            }
        }
        None => println!("{}", rendered),
    }

    // Step 4: Export the requested table
    if let (Some(kind), Some(path)) = (args.export, args.effective_export_path()) {
        let rows = report::export_to_path(kind, &session, &path)?;
        if !args.quiet {
            eprintln!("✅ Exported {} rows to {}", rows, path.display());
        }
    }

    info!(
        "Dashboard ready in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    // Step 5: Interactive session
    if args.interactive {
        session.subscribe(Box::new(interactive::ConsoleObserver));

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        interactive::run(&mut session, &mut cache, stdin.lock(), &mut stdout)?;
    }

    Ok(())
}

/// Print the headline figures.
fn print_summary(summary: &DashboardSummary) {
    println!("\n📊 Dashboard Summary:");
    println!("   Titles: {}", summary.total_titles);
    for (label, value) in report::generator::kpi_rows(summary) {
        println!("   {}: {}", label, value);
    }
}

/// Load the configuration, apply CLI overrides and check the result.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config
        .validate()
        .context("Invalid settings after applying command-line arguments")?;
    Ok(config)
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!(
                "⚠️  Ignoring {}: {:#}. Using defaults.",
                CONFIG_FILE_NAME, e
            );
            Ok(Config::default())
        }
    }
}
