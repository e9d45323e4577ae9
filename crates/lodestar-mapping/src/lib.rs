//! Lodestar Mapping
//!
//! Declarative rules that turn a fetched description into record fields and
//! relation targets.
//!
//! ## Key Concepts
//!
//! - **ExtractionConfig**: filters, attributes and relation rules for one
//!   `(target, source)` pair
//! - **Filter**: a conjunction of `(predicate, object)` constraints selecting
//!   the subject of a description
//! - **Attribute**: ordered alternatives filling one field, each a property
//!   path, a `coalesce(...)` or a `union(...)` of paths
//! - **ConfigRegistry**: the configs in use, built from TOML
//!
//! ## Architecture
//!
//! - Configs are compiled when the registry is built; unknown prefixes and
//!   malformed paths fail there, never during an import
//! - Extraction is pure: a [`Graph`](lodestar_graph::Graph) in, an
//!   [`Extraction`] out, no I/O
//!
//! ## Examples
//!
//! ```
//! use lodestar_domain::EntityKind;
//! use lodestar_graph::{parse_graph, RdfFormat, Source};
//! use lodestar_mapping::{ConfigRegistry, Field};
//!
//! let registry = ConfigRegistry::builtin().unwrap();
//! let config = registry.entity(EntityKind::Place, Source::GeoNames).unwrap();
//!
//! let graph = parse_graph(
//!     br#"
//!     <https://sws.geonames.org/2761369/>
//!         a <http://www.geonames.org/ontology#Feature> ;
//!         <http://www.geonames.org/ontology#name> "Wien" ;
//!         <http://www.w3.org/2003/01/geo/wgs84_pos#lat> "48.20849" ;
//!         <http://www.w3.org/2003/01/geo/wgs84_pos#long> "16.37208" .
//!     "#,
//!     RdfFormat::Turtle,
//! )
//! .unwrap();
//!
//! let extraction = config.apply(&graph).unwrap().unwrap();
//! assert_eq!(extraction.text(Field::Name), Some("Wien"));
//! assert_eq!(extraction.float(Field::Latitude), Some(48.20849));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coerce;
pub mod error;
pub mod extract;
pub mod filter;
pub mod path;
pub mod prefixes;
pub mod registry;
pub mod rule;

// Re-exports for convenience
pub use coerce::{TermValue, Value};
pub use error::{ExtractError, MappingError};
pub use extract::{extract, Extraction, RelationTarget};
pub use filter::select_subject;
pub use path::{PropertyPath, Query, Step};
pub use prefixes::PrefixMap;
pub use registry::ConfigRegistry;
pub use rule::{
    Attribute, Coercion, Constraint, ExtractionConfig, Field, Filter, RelationRule,
    RelationSource, StatementPattern, Target,
};
