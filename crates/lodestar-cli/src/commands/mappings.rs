//! Mappings command implementation.

use crate::cli::MappingsArgs;
use crate::error::Result;
use crate::output::Formatter;
use lodestar_graph::Source;
use lodestar_mapping::{ConfigRegistry, ExtractionConfig};

/// Execute the mappings command.
pub fn execute_mappings(
    args: MappingsArgs,
    registry: &ConfigRegistry,
    formatter: &Formatter,
) -> Result<()> {
    let configs = select(registry, args.source.map(Into::into));
    println!("{}", formatter.format_mappings(&configs)?);
    Ok(())
}

fn select(registry: &ConfigRegistry, source: Option<Source>) -> Vec<&ExtractionConfig> {
    registry
        .configs()
        .filter(|c| source.map_or(true, |s| c.source == s))
        .collect()
}
