use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vola_auto::config::{load_config, Config, ConfigLoader, ConfigValidator, LoggingConfig};
use vola_auto::dump::rename_dumped_files;
use vola_auto::modules::default_catalog;
use vola_auto::Session;

/// Run Volatility plugins against a memory image and collect the results
#[derive(Debug, Parser)]
#[command(name = "vola-auto", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Memory image to analyse
    #[arg(short = 'f', long)]
    image: Option<PathBuf>,

    /// Folder receiving artifacts and results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image profile, e.g. win10 or win7
    #[arg(long)]
    profile: Option<String>,

    /// Re-run plugins even when their artifacts exist
    #[arg(long)]
    force: bool,

    /// Number of parallel dump workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Extract collected files whose path matches this regex
    #[arg(long, value_name = "REGEX")]
    dump: Option<String>,

    /// Folder for extracted files (defaults to <output>/files)
    #[arg(long, requires = "dump")]
    dump_dir: Option<PathBuf>,

    /// Rename extracted files ending in MATCH to end in NEW instead
    #[arg(long, num_args = 2, value_names = ["MATCH", "NEW"], requires = "dump")]
    rename: Option<Vec<String>>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(image) = &self.image {
            config.image.path = image.clone();
        }
        if let Some(output) = &self.output {
            config.output.folder = output.clone();
        }
        if let Some(profile) = &self.profile {
            config.image.profile = profile.clone();
        }
        if let Some(workers) = self.workers {
            config.execution.workers = workers;
        }
        config.execution.force_rerun |= self.force;
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if logging.file.is_empty() {
        builder.with_writer(std::io::stderr).init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&logging.file)
            .with_context(|| format!("opening log file {}", logging.file))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(path)
            .load()
            .with_context(|| format!("loading {}", path.display()))?,
        None => load_config()?,
    };
    cli.apply(&mut config);

    init_logging(&config.logging)?;
    info!("Starting vola-auto v{}", vola_auto::core::VERSION);

    ConfigValidator::validate_image(&config)?;
    let mut session = Session::new(config)?;

    session
        .run_modules(&default_catalog())
        .context("running modules")?;
    let graph = session.collect_processes();
    match &graph {
        Ok(graph) => {
            info!(processes = graph.processes, linked = graph.linked, "Process graph built");
            session.write_process_report()?;
        }
        Err(err) => warn!(error = %err, "Process graph unavailable"),
    }

    let files = session.collect_files();
    match &files {
        Ok(count) => info!(files = count, "File objects collected"),
        Err(err) => warn!(error = %err, "File objects unavailable"),
    }
    if graph.is_err() && files.is_err() {
        bail!("no artifact could be collected");
    }

    if let Some(pattern) = &cli.dump {
        files.context("collecting files to dump")?;
        let folder = cli
            .dump_dir
            .clone()
            .unwrap_or_else(|| session.config().output.folder.join("files"));
        let requested = session
            .dump_files(pattern, &folder)
            .with_context(|| format!("dumping files matching {}", pattern))?;
        info!(requested, folder = %folder.display(), "Files dumped");

        if let Some([from, to]) = cli.rename.as_deref() {
            let renamed = rename_dumped_files(&folder, from, to)?;
            info!(renamed, "Renamed dumped files");
        }
    }

    Ok(())
}
