//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use lodestar_domain::EntityKind;
use lodestar_graph::Source;
use std::path::PathBuf;

/// Lodestar - Import authority records from GND, Wikidata and GeoNames.
#[derive(Debug, Parser)]
#[command(name = "lodestar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path
    #[arg(short, long, global = true, env = "LODESTAR_DB")]
    pub database: Option<PathBuf>,

    /// Mapping overrides file
    #[arg(short, long, global = true)]
    pub mappings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a record by URI
    Import(ImportArgs),

    /// Show a stored record by id or URI
    Show(ShowArgs),

    /// List the extraction configs in use
    Mappings(MappingsArgs),
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// URI of the record (GND, Wikidata or GeoNames)
    pub uri: String,

    /// Kind of record to import
    #[arg(short, long, value_enum)]
    pub kind: KindArg,

    /// Fail the import when a relation target fails
    #[arg(long)]
    pub strict: bool,

    /// Relation depth to follow
    #[arg(long)]
    pub depth: Option<usize>,

    /// Skip vocabulary values given only as URIs
    #[arg(long)]
    pub no_lookup: bool,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Record id or any registered URI
    pub target: String,
}

/// Arguments for the mappings command.
#[derive(Debug, Parser)]
pub struct MappingsArgs {
    /// Only configs reading this source
    #[arg(short, long, value_enum)]
    pub source: Option<SourceArg>,
}

/// Record kind argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum KindArg {
    /// A person
    Person,
    /// A place
    Place,
    /// An institution
    Institution,
    /// An event
    Event,
    /// A work
    Work,
    /// A prize
    Prize,
}

/// Source argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SourceArg {
    /// Gemeinsame Normdatei
    Gnd,
    /// Wikidata
    Wikidata,
    /// GeoNames
    Geonames,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Person => EntityKind::Person,
            KindArg::Place => EntityKind::Place,
            KindArg::Institution => EntityKind::Institution,
            KindArg::Event => EntityKind::Event,
            KindArg::Work => EntityKind::Work,
            KindArg::Prize => EntityKind::Prize,
        }
    }
}

impl From<SourceArg> for Source {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Gnd => Source::Gnd,
            SourceArg::Wikidata => Source::Wikidata,
            SourceArg::Geonames => Source::GeoNames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_command() {
        let cli = Cli::parse_from([
            "lodestar",
            "import",
            "https://d-nb.info/gnd/118566512",
            "--kind",
            "person",
            "--strict",
            "--depth",
            "2",
        ]);
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.uri, "https://d-nb.info/gnd/118566512");
                assert_eq!(EntityKind::from(args.kind), EntityKind::Person);
                assert!(args.strict);
                assert_eq!(args.depth, Some(2));
                assert!(!args.no_lookup);
            }
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_import_requires_kind() {
        let result = Cli::try_parse_from(["lodestar", "import", "https://d-nb.info/gnd/118566512"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "lodestar",
            "show",
            "https://d-nb.info/gnd/118566512",
            "--format",
            "json",
            "--database",
            "/tmp/lodestar.db",
        ]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/lodestar.db")));
        assert!(matches!(cli.command, Command::Show(_)));
    }

    #[test]
    fn test_source_conversion() {
        let cli = Cli::parse_from(["lodestar", "mappings", "--source", "geonames"]);
        match cli.command {
            Command::Mappings(args) => {
                assert_eq!(args.source.map(Source::from), Some(Source::GeoNames));
            }
            _ => panic!("Expected Mappings command"),
        }
    }
}
