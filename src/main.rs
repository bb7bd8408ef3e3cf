//! gesture-raster CLI
//!
//! Builds image datasets from IMU gesture recordings.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gesture_raster::{
    config::{ClassSource, Config},
    core::{PipelineDriver, IMAGE_HEIGHT, IMAGE_WIDTH, SAMPLES_PER_MEASUREMENT},
    dataset::{split_dataset, write_snapshot, ExportFormat, SnapshotBuilder},
    loader::load_classes,
    transparency::{create_shared_log_with_persistence, PersistedStats},
    VERSION,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gesture-raster")]
#[command(version = VERSION)]
#[command(about = "Turn IMU gesture recordings into stroke images", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, split and export an image dataset
    Build {
        /// Class recording as NAME=PATH; order defines labels (overrides config)
        #[arg(long = "class", value_name = "NAME=PATH")]
        classes: Vec<String>,

        /// Output directory for the export
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Export format (json or jsonl)
        #[arg(long, default_value = "json")]
        format: String,

        /// Worker threads (0 = all cores; defaults to the config value)
        #[arg(long)]
        workers: Option<usize>,

        /// Fraction of images held out for testing
        #[arg(long)]
        test_ratio: Option<f64>,

        /// Seed for the train/test shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Export integer labels only
        #[arg(long)]
        no_one_hot: bool,

        /// Skip recordings with malformed rows instead of aborting
        #[arg(long)]
        skip_malformed: bool,
    },

    /// Show statistics of the last build
    Stats,

    /// Show configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Build {
            classes,
            output,
            format,
            workers,
            test_ratio,
            seed,
            no_one_hot,
            skip_malformed,
        } => cmd_build(BuildArgs {
            classes,
            output,
            format,
            workers,
            test_ratio,
            seed,
            no_one_hot,
            skip_malformed,
        }),
        Commands::Stats => cmd_stats(),
        Commands::Config { init } => cmd_config(init),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

struct BuildArgs {
    classes: Vec<String>,
    output: Option<PathBuf>,
    format: String,
    workers: Option<usize>,
    test_ratio: Option<f64>,
    seed: Option<u64>,
    no_one_hot: bool,
    skip_malformed: bool,
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let mut config = Config::load().context("loading configuration")?;

    if !args.classes.is_empty() {
        config.classes = args
            .classes
            .iter()
            .map(|c| ClassSource::from_arg(c))
            .collect::<Result<Vec<_>, _>>()?;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(ratio) = args.test_ratio {
        config.test_ratio = ratio;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.no_one_hot {
        config.one_hot = false;
    }
    if args.skip_malformed {
        config.skip_malformed_groups = true;
    }
    if let Some(output) = args.output {
        config.export_path = output;
    }

    let Some(format) = ExportFormat::from_name(&args.format) else {
        bail!("unknown export format {:?} (expected json or jsonl)", args.format);
    };
    if config.classes.is_empty() {
        bail!("no classes given; pass --class NAME=PATH or add classes to the config file");
    }
    if config.one_hot && config.classes.len() > config.num_classes {
        bail!(
            "{} classes do not fit one-hot vectors of width {}",
            config.classes.len(),
            config.num_classes
        );
    }
    if let Err(e) = config.ensure_directories() {
        tracing::warn!("Could not create directories: {e}");
    }

    println!("gesture-raster v{VERSION}");
    println!();
    println!("Classes:");
    for (label, class) in config.classes.iter().enumerate() {
        println!("  {label}: {} ({:?})", class.name, class.path);
    }
    println!(
        "  Measurement: {SAMPLES_PER_MEASUREMENT} samples -> {IMAGE_HEIGHT}x{IMAGE_WIDTH} image"
    );
    println!();

    let groups = load_classes(&config.classes).context("loading class recordings")?;

    let log = create_shared_log_with_persistence(config.stats_path());
    let driver = PipelineDriver::new(config.pipeline_options()).with_log(log.clone());
    let dataset = driver.build_dataset(&groups).context("building dataset")?;

    println!("Built {} images", dataset.len());

    let split = split_dataset(dataset, config.test_ratio, config.seed)
        .context("splitting dataset")?;
    println!(
        "Split: {} train, {} test (ratio {}, seed {})",
        split.train.len(),
        split.test.len(),
        config.test_ratio,
        config.seed
    );

    let mut builder = SnapshotBuilder::new(config.class_names(), config.seed, config.test_ratio);
    if config.one_hot {
        builder = builder.with_one_hot(config.num_classes);
    }
    println!("Run ID: {}", builder.run_id());

    let snapshot = builder.build(&split).context("encoding dataset")?;
    let path = write_snapshot(&snapshot, &config.export_path, format)
        .context("writing dataset export")?;
    println!("Exported dataset to {path:?}");

    if let Err(e) = log.save() {
        tracing::warn!("Could not save run statistics: {e}");
    }

    println!();
    println!("{}", log.summary());
    Ok(())
}

fn cmd_stats() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    let stats_path = config.stats_path();

    if !stats_path.exists() {
        println!("No previous build found.");
        println!("Run 'gesture-raster build' to create a dataset.");
        return Ok(());
    }

    let persisted = PersistedStats::load(&stats_path)
        .with_context(|| format!("reading {stats_path:?}"))?;

    println!("Last build: {}", persisted.last_updated.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    println!("{}", persisted.stats.summary());
    Ok(())
}

fn cmd_config(init: bool) -> anyhow::Result<()> {
    let path = Config::config_path();

    if init {
        if path.exists() {
            println!("Config file already exists: {path:?}");
        } else {
            Config::default().save().context("writing default configuration")?;
            println!("Wrote default configuration to {path:?}");
        }
        println!();
    }

    let config = Config::load().context("loading configuration")?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
