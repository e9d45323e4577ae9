//! Planning: every fetch an import needs, before any write
//!
//! A [`Plan`] is the complete description of what an import will write: the
//! subject's record data and identifiers, its vocabulary values with labels
//! already looked up, and each relation target either resolved to an
//! existing record or planned recursively. Building it touches the store
//! only for reads.

use crate::config::{ImporterConfig, RelationPolicy};
use crate::error::{ImportError, StepError};
use crate::materializer::build_data;
use crate::resolver::{candidates, resolve, Resolution};
use crate::types::SkippedItem;
use lodestar_domain::traits::RecordReader;
use lodestar_domain::{normalize_label, EntityData, EntityId, EntityKind, Vocabulary};
use lodestar_graph::{FetchError, Graph, GraphFetcher, SourceUri};
use lodestar_mapping::{ConfigRegistry, ExtractError, Extraction, Field, RelationTarget, Target};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A vocabulary value with a known label
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlannedTerm {
    pub vocabulary: Vocabulary,
    pub label: String,
    pub uri: Option<String>,
}

/// Object of a planned relation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlannedObject {
    Existing(EntityId),
    New(Box<Plan>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlannedRelation {
    pub target: RelationTarget,
    pub object: PlannedObject,
}

/// Everything one new record needs written
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Plan {
    pub uri: SourceUri,
    pub kind: EntityKind,
    pub candidates: Vec<String>,
    pub data: EntityData,
    pub vocabulary: Vec<PlannedTerm>,
    pub relations: Vec<PlannedRelation>,
}

/// Result of planning one URI
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Planned {
    Existing(EntityId),
    New(Plan),
    NotFound,
}

pub(crate) struct Planner<'a, R, F> {
    reader: &'a R,
    fetcher: &'a F,
    registry: &'a ConfigRegistry,
    config: &'a ImporterConfig,
    graphs: HashMap<String, Graph>,
    skipped: Vec<SkippedItem>,
}

impl<'a, R, F> Planner<'a, R, F>
where
    R: RecordReader,
    F: GraphFetcher,
{
    pub(crate) fn new(
        reader: &'a R,
        fetcher: &'a F,
        registry: &'a ConfigRegistry,
        config: &'a ImporterConfig,
    ) -> Self {
        Self {
            reader,
            fetcher,
            registry,
            config,
            graphs: HashMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Items skipped while planning
    pub(crate) fn into_skipped(self) -> Vec<SkippedItem> {
        self.skipped
    }

    /// Plan the import of `uri` as a record of `kind`
    ///
    /// Relations are followed while `depth` is below the configured maximum.
    pub(crate) fn plan(
        &mut self,
        uri: &SourceUri,
        kind: EntityKind,
        depth: usize,
    ) -> Result<Planned, StepError<R::Error>> {
        let canonical = uri.canonical.as_str();

        if let Resolution::Existing(id) =
            resolve(self.reader, kind, canonical, &[uri.canonical.clone()])?
        {
            return Ok(Planned::Existing(id));
        }

        debug!("{}: FETCHING {}", canonical, uri.document);
        let graph = self.fetch(uri).map_err(|source| ImportError::Fetch {
            uri: canonical.to_string(),
            source,
        })?;

        let registry = self.registry;
        let config = registry.entity(kind, uri.source).ok_or(ImportError::NoConfig {
            kind,
            origin: uri.source,
        })?;

        debug!("{}: FILTERING {} triples", canonical, graph.len());
        let extraction = match config.apply(&graph) {
            Ok(Some(extraction)) => extraction,
            Ok(None) => {
                debug!("{}: no {} description", canonical, kind.as_str());
                return Ok(Planned::NotFound);
            }
            Err(ExtractError::Ambiguous { subjects }) => {
                return Err(ImportError::Ambiguous {
                    uri: canonical.to_string(),
                    subjects,
                }
                .into())
            }
        };
        debug!("{}: EXTRACTING from {}", canonical, extraction.subject);

        let candidates = candidates(canonical, &extraction);
        debug!("{}: RESOLVING {} candidate URIs", canonical, candidates.len());
        if let Resolution::Existing(id) = resolve(self.reader, kind, canonical, &candidates)? {
            return Ok(Planned::Existing(id));
        }

        let vocabulary = self.vocabulary(canonical, &extraction);
        let data = build_data(kind, &extraction, &vocabulary);

        let relations = if depth < self.config.max_depth {
            self.relations(canonical, &extraction, depth)?
        } else {
            if !extraction.relations.is_empty() {
                debug!(
                    "{}: not following {} relations at depth {}",
                    canonical,
                    extraction.relations.len(),
                    depth
                );
            }
            Vec::new()
        };

        Ok(Planned::New(Plan {
            uri: uri.clone(),
            kind,
            candidates,
            data,
            vocabulary,
            relations,
        }))
    }

    fn fetch(&mut self, uri: &SourceUri) -> Result<Graph, FetchError> {
        if let Some(graph) = self.graphs.get(&uri.canonical) {
            return Ok(graph.clone());
        }
        let graph = self.fetcher.fetch(uri)?;
        self.graphs.insert(uri.canonical.clone(), graph.clone());
        Ok(graph)
    }

    fn relations(
        &mut self,
        subject: &str,
        extraction: &Extraction,
        depth: usize,
    ) -> Result<Vec<PlannedRelation>, StepError<R::Error>> {
        let mut planned = Vec::new();
        for target in &extraction.relations {
            let kind = target.kind.object_kind();
            let outcome = match SourceUri::recognize(&target.uri) {
                Some(uri) => self.plan(&uri, kind, depth + 1),
                None => Err(ImportError::UnsupportedUri(target.uri.clone()).into()),
            };

            let failure = match outcome {
                Ok(Planned::Existing(id)) => {
                    planned.push(PlannedRelation {
                        target: target.clone(),
                        object: PlannedObject::Existing(id),
                    });
                    continue;
                }
                Ok(Planned::New(plan)) => {
                    planned.push(PlannedRelation {
                        target: target.clone(),
                        object: PlannedObject::New(Box::new(plan)),
                    });
                    continue;
                }
                Ok(Planned::NotFound) => ImportError::NoDescription(target.uri.clone()),
                Err(StepError::Import(e)) if !e.is_hard() => e,
                Err(e) => return Err(e),
            };

            match self.config.relation_policy {
                RelationPolicy::Skip => {
                    warn!("{}: skipping '{}' to {}: {}", subject, target.kind, target.uri, failure);
                    self.skipped.push(SkippedItem::Relation {
                        subject: subject.to_string(),
                        kind: target.kind,
                        target: target.uri.clone(),
                        reason: failure.to_string(),
                    });
                }
                RelationPolicy::Abort => {
                    return Err(ImportError::RelationTarget {
                        kind: target.kind,
                        target: target.uri.clone(),
                        source: Box::new(failure),
                    }
                    .into())
                }
            }
        }
        Ok(planned)
    }

    fn vocabulary(&mut self, subject: &str, extraction: &Extraction) -> Vec<PlannedTerm> {
        let mut terms: Vec<PlannedTerm> = Vec::new();
        for (field, vocabulary) in [
            (Field::Profession, Vocabulary::Profession),
            (Field::Title, Vocabulary::Title),
        ] {
            for value in extraction.terms(field) {
                let term = match (&value.label, &value.uri) {
                    (Some(label), uri) => PlannedTerm {
                        vocabulary,
                        label: label.clone(),
                        uri: uri.clone(),
                    },
                    (None, Some(uri)) => match self.lookup(vocabulary, uri) {
                        Ok(term) => term,
                        Err(reason) => {
                            warn!("{}: skipping {} {}: {}", subject, vocabulary, uri, reason);
                            self.skipped.push(SkippedItem::Vocabulary {
                                subject: subject.to_string(),
                                vocabulary,
                                value: uri.clone(),
                                reason,
                            });
                            continue;
                        }
                    },
                    (None, None) => continue,
                };

                let normalized = normalize_label(&term.label);
                let duplicate = terms
                    .iter()
                    .any(|t| t.vocabulary == vocabulary && normalize_label(&t.label) == normalized);
                if !duplicate && !normalized.is_empty() {
                    terms.push(term);
                }
            }
        }
        terms
    }

    /// Label of a vocabulary term given only as a URI
    fn lookup(&mut self, vocabulary: Vocabulary, uri: &str) -> Result<PlannedTerm, String> {
        if !self.config.lookup_vocabulary {
            return Err("vocabulary lookup disabled".to_string());
        }
        let source_uri =
            SourceUri::recognize(uri).ok_or_else(|| format!("unsupported URI {}", uri))?;

        let registry = self.registry;
        let config = registry
            .get(Target::Term(vocabulary), source_uri.source)
            .ok_or_else(|| format!("no {} config for {}", vocabulary, source_uri.source))?;

        let graph = self.fetch(&source_uri).map_err(|e| e.to_string())?;
        let extraction = config
            .apply(&graph)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("no {} description", vocabulary))?;
        let label = extraction
            .text(Field::Name)
            .ok_or_else(|| "no label".to_string())?;

        debug!("{}: {} label '{}'", source_uri.canonical, vocabulary, label);
        Ok(PlannedTerm {
            vocabulary,
            label: label.to_string(),
            uri: Some(source_uri.canonical.clone()),
        })
    }
}
