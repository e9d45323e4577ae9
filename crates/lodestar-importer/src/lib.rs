//! Lodestar Importer
//!
//! Imports records from linked-data authority files (GND, Wikidata,
//! GeoNames) and resolves them against the records already known.
//!
//! # Overview
//!
//! Importing a URI either finds the record it already denotes, or creates
//! one together with its relations, vocabulary values and identifiers. A
//! URI is known if it, or any alias its description declares, is registered
//! in the identifier registry.
//!
//! # Architecture
//!
//! ```text
//! URI → fetch → filter → extract → resolve ─┬─ existing record
//!                                           └─ plan targets → transaction:
//!                                              record, identifiers,
//!                                              relations, vocabulary
//! ```
//!
//! All fetching happens while the import is planned; the write transaction
//! is opened afterwards and identity is resolved again inside it. A
//! uniqueness violation rolls the transaction back and resolution starts
//! over.
//!
//! # Example Usage
//!
//! ```no_run
//! use lodestar_domain::EntityKind;
//! use lodestar_graph::{FetcherConfig, HttpFetcher};
//! use lodestar_importer::{ImportOutcome, Importer, ImporterConfig};
//! use lodestar_mapping::ConfigRegistry;
//! use lodestar_store::SqliteStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("lodestar.db")?;
//! let fetcher = HttpFetcher::new(FetcherConfig::default())?;
//! let registry = ConfigRegistry::builtin()?;
//!
//! let mut importer = Importer::new(store, fetcher, registry, ImporterConfig::default());
//!
//! match importer.import("https://d-nb.info/gnd/118566512", EntityKind::Person)? {
//!     ImportOutcome::Created { record, report } => {
//!         println!("Created {} with {} relations", record.label(), report.relations_created);
//!     }
//!     ImportOutcome::Existing(record) => println!("Already known: {}", record.label()),
//!     ImportOutcome::NotFound => println!("Not a person"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod importer;
mod materializer;
mod plan;
mod resolver;
mod types;

pub use config::{ImporterConfig, RelationPolicy, MAX_DEPTH_LIMIT};
pub use error::{ConflictingIdentifier, ImportError};
pub use importer::Importer;
pub use types::{ImportOutcome, ImportReport, SkippedItem};
