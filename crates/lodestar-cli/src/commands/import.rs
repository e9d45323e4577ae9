//! Import command implementation.

use crate::cli::ImportArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lodestar_domain::EntityKind;
use lodestar_graph::GraphFetcher;
use lodestar_importer::{Importer, ImporterConfig, RelationPolicy};
use lodestar_mapping::ConfigRegistry;
use lodestar_store::SqliteStore;

/// Importer configuration with the command's flags applied.
pub fn importer_config(args: &ImportArgs, base: &ImporterConfig) -> Result<ImporterConfig> {
    let mut config = base.clone();
    if args.strict {
        config.relation_policy = RelationPolicy::Abort;
    }
    if let Some(depth) = args.depth {
        config.max_depth = depth;
    }
    if args.no_lookup {
        config.lookup_vocabulary = false;
    }
    config.validate().map_err(CliError::InvalidInput)?;
    Ok(config)
}

/// Execute the import command.
pub fn execute_import<F: GraphFetcher>(
    args: ImportArgs,
    store: SqliteStore,
    fetcher: F,
    registry: ConfigRegistry,
    base: &ImporterConfig,
    formatter: &Formatter,
) -> Result<()> {
    let config = importer_config(&args, base)?;
    let kind: EntityKind = args.kind.into();

    let mut importer = Importer::new(store, fetcher, registry, config);
    let outcome = importer.import(&args.uri, kind)?;

    println!("{}", formatter.format_outcome(args.uri.trim(), &outcome)?);
    Ok(())
}
