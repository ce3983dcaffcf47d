//! esgdash - ESG disclosure dashboards
//!
//! A CLI tool and local web app that aggregates a table of company ESG
//! reports into three dashboards: top indicators per company, industry
//! leaders, and cross-year indicator prevalence heatmaps.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad file, bad config, bad arguments, etc.)
//!   2 - A required selection is missing (prompt printed)

mod analysis;
mod cli;
mod config;
mod dashboard;
mod dataset;
mod models;
mod report;
mod server;
mod taxonomy;

use anyhow::{bail, Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dashboard::{DashboardContext, DashboardOutput, Gate};
use dataset::{AliasTable, Dataset};
use indicatif::{ProgressBar, ProgressStyle};
use models::CategorySelector;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use taxonomy::{Preset, Taxonomy};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
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

    // Load configuration before logging so that `general.verbose` applies
    let mut loaded = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    loaded.config.merge_with_args(&args);

    // Initialize logging
    if let Err(e) = init_logging(&args, &loaded.config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    info!("esgdash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    loaded.source.log();

    match run(args, loaded.config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("esgdash failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .esgdash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to change the dataset, chart sizes, thresholds and taxonomy.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = args.log_level(config.general.verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

/// Load inputs, then list, serve or render. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    // Load inputs
    let aliases = load_aliases(&args, &config)?;
    let taxonomy = Taxonomy::from_config(&config.taxonomy, &aliases, Preset::Full)
        .context("Invalid [taxonomy] section in config")?;
    let core_taxonomy = Taxonomy::from_config(&config.taxonomy, &aliases, Preset::Core)
        .context("Invalid [taxonomy] section in config")?;
    let dataset = load_dataset(Path::new(&config.data.dataset), &taxonomy, !args.quiet)?;
    let ctx = DashboardContext::new(
        dataset,
        &taxonomy,
        &core_taxonomy,
        aliases,
        config.chart.clone(),
    );

    if args.list {
        print_options(&ctx);
        return Ok(0);
    }

    if args.serve {
        server::serve(ctx, &config.server.bind).await?;
        return Ok(0);
    }

    let Some(kind) = args.dashboard else {
        bail!("No dashboard selected; use --dashboard, --serve or --list");
    };

    // The CLI always submits.
    let request = args.request(kind);
    let gate = Gate::submit(&request, true).compute(&ctx);
    let Some(output) = gate.output() else {
        eprintln!("⚠️  {}", gate.prompt().unwrap_or(kind.prompt()));
        return Ok(2);
    };

    println!("📊 Rendering {} dashboard...", kind);
    let metadata = report::export_metadata(kind, ctx.dataset.source());
    let content = match args.format {
        OutputFormat::Svg => report::svg::dashboard_svg(output, &ctx.chart),
        OutputFormat::Html => report::html::standalone_page(output, &ctx.chart, &metadata),
        OutputFormat::Json => report::generate_json_report(output, &metadata)?,
        OutputFormat::Markdown => match output {
            DashboardOutput::Leaders(board) => report::generate_markdown_report(board, &metadata),
            _ => bail!("Markdown output is only available for the leaders dashboard"),
        },
    };

    let path = output_path(&args, &config);
    report::write_report(&content, &path)?;

    print_summary(output);
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Dashboard saved to: {}", path.display());

    Ok(0)
}

/// A loaded configuration and where it came from.
struct LoadedConfig {
    config: Config,
    source: ConfigSource,
}

/// Where the configuration came from. Logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    Fallback(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Fallback(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<LoadedConfig> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok(LoadedConfig {
            config: Config::load(config_path)?,
            source: ConfigSource::Explicit(config_path.clone()),
        });
    }

    // Try default location
    let (config, source) = match Config::load_default() {
        Ok(Some(config)) => (config, ConfigSource::DefaultFile),
        Ok(None) => (Config::default(), ConfigSource::Defaults),
        Err(e) => (Config::default(), ConfigSource::Fallback(e)),
    };
    Ok(LoadedConfig { config, source })
}

/// Load the alias table. A missing default alias file only costs the
/// friendly labels; an explicitly requested one must exist.
fn load_aliases(args: &Args, config: &Config) -> Result<AliasTable> {
    if config.data.aliases.trim().is_empty() {
        debug!("Alias table disabled");
        return Ok(AliasTable::empty());
    }

    let path = Path::new(&config.data.aliases);
    if args.aliases.is_none() && !path.exists() {
        warn!(
            "Alias file {} not found, labelling indicators by column name",
            path.display()
        );
        return Ok(AliasTable::empty());
    }

    let aliases = AliasTable::load(path)
        .with_context(|| format!("Failed to load aliases from {}", path.display()))?;
    if aliases.is_empty() {
        warn!("Alias file {} has no entries", path.display());
    }
    Ok(aliases)
}

/// Load the dataset behind a spinner.
fn load_dataset(path: &Path, taxonomy: &Taxonomy, show_progress: bool) -> Result<Dataset> {
    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Loading {}", path.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = Dataset::load(path, taxonomy)
        .with_context(|| format!("Failed to load dataset from {}", path.display()));

    if let Some(pb) = spinner {
        match &result {
            Ok(dataset) => pb.finish_with_message(format!(
                "📥 Loaded {} reports from {}",
                dataset.len(),
                path.display()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}

/// Resolve the output file: the flag, or the configured path with the
/// format's extension.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    match args.output {
        Some(ref path) => path.clone(),
        None => PathBuf::from(&config.general.output).with_extension(args.format.extension()),
    }
}

/// Handle --list: print the dropdown choices.
fn print_options(ctx: &DashboardContext) {
    let mut companies = ctx.dataset.companies();
    companies.sort();
    let mut industries = ctx.dataset.industries();
    industries.sort();
    let years = ctx.dataset.years();

    println!("\n🏢 Companies ({}):", companies.len());
    for company in &companies {
        println!("     {}", company);
    }

    println!("\n🏭 Industries ({}):", industries.len());
    for industry in &industries {
        println!("     {}", industry);
    }

    println!(
        "\n📅 Years: {}",
        years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    println!("\n🧮 Active indicators:");
    for selector in CategorySelector::ALL.iter().skip(1) {
        println!(
            "     {}: {}",
            selector,
            ctx.taxonomy.indicators(*selector).len()
        );
    }
    println!("     Aliases loaded: {}", ctx.aliases.len());
}

/// Print a short summary of a computed result.
fn print_summary(output: &DashboardOutput) {
    println!("\n📊 Summary:");
    match output {
        DashboardOutput::Frequency(chart) => {
            println!("   {}", chart.title());
            if chart.years().is_empty() {
                println!("   No reports found for {}", chart.company);
            }
            for (i, series) in chart.series.iter().enumerate() {
                println!("   {}. {} (total {})", i + 1, series.label, series.total);
            }
        }
        DashboardOutput::Leaders(board) => {
            println!("   {}", board.title());
            println!(
                "   {} firms with at least {} years of reports",
                board.companies.len(),
                board.min_years_reported
            );
            for (i, c) in board.companies.iter().take(5).enumerate() {
                println!(
                    "   {}. {} - 🟢 E {} | 🔵 S {} | 🟠 G {} | Total {}",
                    i + 1,
                    c.company,
                    c.environmental,
                    c.social,
                    c.governance,
                    c.total
                );
            }
        }
        DashboardOutput::Heatmap(comparison) => {
            println!("   {}", comparison.difference_title());
            println!(
                "   {} industries, {} indicators ({} vs {})",
                comparison.difference.industries.len(),
                comparison.difference.indicators.len(),
                comparison.year1,
                comparison.year2
            );
        }
    }
}
