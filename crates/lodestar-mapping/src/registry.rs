//! Registry of extraction configs per target and source
//!
//! Configs are data: the built-in set is a TOML document compiled into the
//! crate, and further documents of the same shape replace entries for the
//! `(target, source)` pairs they declare.
//!
//! ```toml
//! [prefixes]
//! ex = "http://example.org/ns#"
//!
//! [[config]]
//! target = "place"
//! source = "geonames"
//! filters = [["a gn:Feature"]]
//!
//! [[config.attribute]]
//! field = "name"
//! from = ["gn:name", "gn:alternateName@de"]
//!
//! [[config.relation]]
//! kind = "worked_at"
//! from = [{ statement = "p:P108", value = "ps:P108", start = "pq:P580", end = "pq:P582" }]
//! ```
//!
//! A filter is a list of constraints `"predicate object"`; the object is an
//! `<iri>`, a CURIE, a `"literal"`, or `*` (or nothing) for "any value".

use crate::error::MappingError;
use crate::path::Query;
use crate::prefixes::PrefixMap;
use crate::rule::{
    Attribute, Coercion, Constraint, ExtractionConfig, Field, Filter, RelationRule,
    RelationSource, StatementPattern, Target,
};
use lodestar_domain::{EntityKind, RelationKind};
use lodestar_graph::{Source, Term};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

const BUILTIN: &str = include_str!("builtin.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default)]
    prefixes: BTreeMap<String, String>,

    #[serde(default)]
    config: Vec<ConfigDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDef {
    target: String,
    source: String,
    filters: Vec<Vec<String>>,

    #[serde(default)]
    attribute: Vec<AttributeDef>,

    #[serde(default)]
    relation: Vec<RelationDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AttributeDef {
    field: String,
    coerce: Option<String>,
    from: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RelationDef {
    kind: String,
    from: Vec<RelationSourceDef>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelationSourceDef {
    Path(String),
    Statement {
        statement: String,
        value: String,
        start: Option<String>,
        end: Option<String>,
    },
}

impl ConfigDef {
    fn compile(&self, prefixes: &PrefixMap) -> Result<ExtractionConfig, MappingError> {
        let target = Target::parse(&self.target).ok_or_else(|| MappingError::UnknownName {
            what: "target",
            name: self.target.clone(),
        })?;
        let source = Source::parse(&self.source).ok_or_else(|| MappingError::UnknownName {
            what: "source",
            name: self.source.clone(),
        })?;

        let filters = self
            .filters
            .iter()
            .map(|constraints| -> Result<Filter, MappingError> {
                Ok(Filter {
                    constraints: constraints
                        .iter()
                        .map(|c| parse_constraint(c, prefixes))
                        .collect::<Result<_, MappingError>>()?,
                })
            })
            .collect::<Result<_, MappingError>>()?;

        let attributes = self
            .attribute
            .iter()
            .map(|a| a.compile(prefixes))
            .collect::<Result<_, _>>()?;
        let relations = self
            .relation
            .iter()
            .map(|r| r.compile(prefixes))
            .collect::<Result<_, _>>()?;

        let config = ExtractionConfig {
            target,
            source,
            filters,
            attributes,
            relations,
        };
        config.validate()?;
        Ok(config)
    }
}

impl AttributeDef {
    fn compile(&self, prefixes: &PrefixMap) -> Result<Attribute, MappingError> {
        let field = Field::parse(&self.field).ok_or_else(|| MappingError::UnknownName {
            what: "field",
            name: self.field.clone(),
        })?;
        let coercion = match &self.coerce {
            Some(name) => Coercion::parse(name).ok_or_else(|| MappingError::UnknownName {
                what: "coercion",
                name: name.clone(),
            })?,
            None => field.default_coercion(),
        };
        let alternatives = self
            .from
            .iter()
            .map(|q| Query::parse(q, prefixes))
            .collect::<Result<_, _>>()?;
        Ok(Attribute {
            field,
            coercion,
            alternatives,
        })
    }
}

impl RelationDef {
    fn compile(&self, prefixes: &PrefixMap) -> Result<RelationRule, MappingError> {
        let kind = RelationKind::parse(&self.kind).ok_or_else(|| MappingError::UnknownName {
            what: "relation",
            name: self.kind.clone(),
        })?;
        let sources = self
            .from
            .iter()
            .map(|source| -> Result<RelationSource, MappingError> {
                match source {
                    RelationSourceDef::Path(text) => Ok(RelationSource::Path(Query::parse(text, prefixes)?)),
                    RelationSourceDef::Statement {
                        statement,
                        value,
                        start,
                        end,
                    } => Ok(RelationSource::Statement(StatementPattern {
                        statement: prefixes.expand(statement)?,
                        value: prefixes.expand(value)?,
                        start: start.as_deref().map(|q| Query::parse(q, prefixes)).transpose()?,
                        end: end.as_deref().map(|q| Query::parse(q, prefixes)).transpose()?,
                        text: format!("{}/{}", statement.trim(), value.trim()),
                    })),
                }
            })
            .collect::<Result<_, MappingError>>()?;
        Ok(RelationRule { kind, sources })
    }
}

/// Parse `"predicate object"`, `"predicate *"` or `"predicate"`
fn parse_constraint(text: &str, prefixes: &PrefixMap) -> Result<Constraint, MappingError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MappingError::InvalidConstraint(text.to_string()));
    }
    let (predicate, object) = match text.split_once(char::is_whitespace) {
        Some((predicate, object)) => (predicate, object.trim()),
        None => (text, ""),
    };

    let object = if object.is_empty() || object == "*" {
        None
    } else if let Some(literal) = object
        .strip_prefix('"')
        .and_then(|o| o.strip_suffix('"'))
    {
        Some(Term::literal(literal))
    } else if object.contains(char::is_whitespace) {
        return Err(MappingError::InvalidConstraint(text.to_string()));
    } else {
        Some(Term::iri(prefixes.expand(object)?))
    };

    Ok(Constraint {
        predicate: prefixes.expand(predicate)?,
        object,
    })
}

/// Extraction configs keyed by `(target, source)`
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    prefixes: PrefixMap,
    configs: BTreeMap<(Target, Source), ExtractionConfig>,
}

impl ConfigRegistry {
    /// A registry with the built-in prefixes and no configs
    pub fn empty() -> Self {
        Self {
            prefixes: PrefixMap::builtin(),
            configs: BTreeMap::new(),
        }
    }

    /// The built-in configs for GND, Wikidata and GeoNames
    pub fn builtin() -> Result<Self, MappingError> {
        Self::from_toml(BUILTIN)
    }

    /// Build a registry from a TOML document alone
    ///
    /// # Examples
    ///
    /// ```
    /// use lodestar_domain::EntityKind;
    /// use lodestar_graph::Source;
    /// use lodestar_mapping::{ConfigRegistry, Target};
    ///
    /// let registry = ConfigRegistry::from_toml(r#"
    ///     [[config]]
    ///     target = "place"
    ///     source = "geonames"
    ///     filters = [["a gn:Feature"]]
    ///
    ///     [[config.attribute]]
    ///     field = "name"
    ///     from = ["gn:name"]
    /// "#).unwrap();
    ///
    /// assert!(registry.get(Target::Entity(EntityKind::Place), Source::GeoNames).is_some());
    /// assert!(registry.get(Target::Entity(EntityKind::Place), Source::Gnd).is_none());
    /// ```
    pub fn from_toml(text: &str) -> Result<Self, MappingError> {
        let mut registry = Self::empty();
        registry.load_overrides(text)?;
        Ok(registry)
    }

    /// Merge a TOML document, replacing configs for the pairs it declares
    ///
    /// Prefixes it declares are kept for later documents. Nothing is changed
    /// if any config in the document is invalid. Returns the number of
    /// configs loaded.
    pub fn load_overrides(&mut self, text: &str) -> Result<usize, MappingError> {
        let file: RegistryFile = toml::from_str(text)?;

        let mut prefixes = self.prefixes.clone();
        for (prefix, namespace) in &file.prefixes {
            prefixes.insert(prefix.as_str(), namespace.as_str());
        }

        let compiled = file
            .config
            .iter()
            .map(|def| def.compile(&prefixes))
            .collect::<Result<Vec<_>, _>>()?;

        let count = compiled.len();
        for config in compiled {
            debug!("Loaded config for {} from {}", config.target, config.source);
            self.configs.insert((config.target, config.source), config);
        }
        self.prefixes = prefixes;

        info!("Loaded {} extraction configs", count);
        Ok(count)
    }

    /// Config for a target and source
    pub fn get(&self, target: Target, source: Source) -> Option<&ExtractionConfig> {
        self.configs.get(&(target, source))
    }

    /// Config producing records of `kind` from `source`
    pub fn entity(&self, kind: EntityKind, source: Source) -> Option<&ExtractionConfig> {
        self.get(Target::Entity(kind), source)
    }

    /// Add or replace a config after validating it
    pub fn insert(&mut self, config: ExtractionConfig) -> Result<Option<ExtractionConfig>, MappingError> {
        config.validate()?;
        Ok(self.configs.insert((config.target, config.source), config))
    }

    /// All configs, ordered by target then source
    pub fn configs(&self) -> impl Iterator<Item = &ExtractionConfig> {
        self.configs.values()
    }

    /// Prefixes known to the registry
    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    /// Number of configs
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether the registry holds no configs
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::empty()
    }
}
