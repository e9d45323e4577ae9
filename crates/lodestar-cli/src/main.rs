//! Lodestar CLI - Command-line importer for authority records.

use anyhow::Context;
use clap::Parser;
use lodestar_cli::commands;
use lodestar_cli::{Cli, Command, Config, Formatter};
use lodestar_graph::HttpFetcher;
use lodestar_store::SqliteStore;
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LODESTAR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let registry = commands::load_registry(&config, cli.mappings.as_deref())
        .context("loading extraction configs")?;

    match cli.command {
        Command::Mappings(args) => {
            commands::execute_mappings(args, &registry, &formatter)?;
        }
        Command::Show(args) => {
            let store = open_store(&config)?;
            commands::execute_show(args, &store, &formatter)?;
        }
        Command::Import(args) => {
            let store = open_store(&config)?;
            let fetcher = HttpFetcher::new(config.fetcher.clone())?;
            commands::execute_import(args, store, fetcher, registry, &config.importer, &formatter)?;
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    if let Some(parent) = config.database.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    SqliteStore::new(&config.database)
        .with_context(|| format!("opening {}", config.database.display()))
}
