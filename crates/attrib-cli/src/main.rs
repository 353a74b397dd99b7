use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use attrib_cli::commands::{activities, clear, log, replay, stats, status, util};
use attrib_cli::{Cli, Commands, Config};
use attrib_core::AttributionEngine;
use attrib_db::{ActionLog, Database};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    let engine_config = config.engine_config();
    let actions = ActionLog::new(config.action_log_path.clone());

    match command {
        Commands::Replay { file, debug } => {
            let db = open_database(&config)?;
            let mut engine = AttributionEngine::load(db, &engine_config);
            replay::run(
                &mut stdout,
                &mut engine,
                &actions,
                &engine_config,
                file.as_deref(),
                *debug,
            )?;
        }
        Commands::Stats { json } => {
            let engine = AttributionEngine::load(open_database(&config)?, &engine_config);
            stats::run(&mut stdout, &engine.statistics(), *json)?;
        }
        Commands::Activities { since } => {
            let since = since.as_deref().map(util::parse_datetime).transpose()?;
            let engine = AttributionEngine::load(open_database(&config)?, &engine_config);
            activities::run(&mut stdout, engine.activities(), since)?;
        }
        Commands::Paragraphs => {
            let engine = AttributionEngine::load(open_database(&config)?, &engine_config);
            activities::run_paragraphs(&mut stdout, engine.paragraphs())?;
        }
        Commands::Log { limit } => {
            log::run(&mut stdout, &actions, *limit)?;
        }
        Commands::Clear => {
            let mut engine = AttributionEngine::load(open_database(&config)?, &engine_config);
            clear::run(&mut stdout, &mut engine)?;
        }
        Commands::Status => {
            let engine = AttributionEngine::load(open_database(&config)?, &engine_config);
            let documents = engine
                .store()
                .documents()
                .context("failed to list stored documents")?;
            status::run(&mut stdout, &config, &engine, &documents)?;
        }
    }

    Ok(())
}
