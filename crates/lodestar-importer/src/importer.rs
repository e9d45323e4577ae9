//! Core Importer implementation

use crate::config::ImporterConfig;
use crate::error::{ImportError, StepError};
use crate::materializer::{write_plan, WriteReport};
use crate::plan::{Plan, Planned, Planner};
use crate::types::{ImportOutcome, ImportReport};
use lodestar_domain::traits::{ConstraintViolation, ImportTransaction, RecordStore};
use lodestar_domain::{EntityId, EntityKind, EntityRecord};
use lodestar_graph::{GraphFetcher, SourceUri};
use lodestar_mapping::ConfigRegistry;
use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Imports authority records into a record store
///
/// One call to [`Importer::import`] fetches the description of a URI and of
/// its relation targets, then writes the new records, relations, vocabulary
/// links and identifiers in a single transaction.
pub struct Importer<S, F>
where
    S: RecordStore,
    F: GraphFetcher,
{
    store: S,
    fetcher: F,
    registry: ConfigRegistry,
    config: ImporterConfig,
}

enum Persisted {
    Existing(EntityId),
    Created(EntityId, WriteReport, u32),
}

impl<S, F> Importer<S, F>
where
    S: RecordStore,
    S::Error: ConstraintViolation + Display,
    F: GraphFetcher,
{
    /// Create a new Importer
    pub fn new(store: S, fetcher: F, registry: ConfigRegistry, config: ImporterConfig) -> Self {
        Self {
            store,
            fetcher,
            registry,
            config,
        }
    }

    /// The record store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The record store, mutably
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The graph fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The extraction configs in use
    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    /// The importer configuration
    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// Resolve `uri` to a record of `kind`, importing it if it is unknown
    ///
    /// Returns `Ok(None)` if the description holds nothing the `kind` config
    /// applies to.
    pub fn resolve_or_import(
        &mut self,
        uri: &str,
        kind: EntityKind,
    ) -> Result<Option<EntityRecord>, ImportError> {
        Ok(self.import(uri, kind)?.into_record())
    }

    /// Import `uri` as a record of `kind`
    ///
    /// Nothing is written unless the outcome is [`ImportOutcome::Created`].
    pub fn import(&mut self, uri: &str, kind: EntityKind) -> Result<ImportOutcome, ImportError> {
        let source_uri = SourceUri::recognize(uri)
            .ok_or_else(|| ImportError::UnsupportedUri(uri.trim().to_string()))?;
        info!("Importing {} as {}", source_uri.canonical, kind.as_str());

        let (planned, skipped) = {
            let mut planner = Planner::new(&self.store, &self.fetcher, &self.registry, &self.config);
            let planned = planner.plan(&source_uri, kind, 0);
            (planned, planner.into_skipped())
        };

        let plan = match planned.map_err(StepError::into_import)? {
            Planned::Existing(id) => {
                info!("{} already imported as {}", source_uri.canonical, id);
                return Ok(ImportOutcome::Existing(self.load(id)?));
            }
            Planned::NotFound => {
                info!("No {} description at {}", kind.as_str(), source_uri.canonical);
                return Ok(ImportOutcome::NotFound);
            }
            Planned::New(plan) => plan,
        };

        match self.persist(&plan)? {
            Persisted::Existing(id) => {
                info!("{} was imported concurrently as {}", source_uri.canonical, id);
                Ok(ImportOutcome::Existing(self.load(id)?))
            }
            Persisted::Created(id, written, attempts) => {
                let record = self.load(id)?;
                let report = ImportReport {
                    records_created: written.records_created,
                    relations_created: written.relations_created,
                    identifiers_registered: written.identifiers_registered,
                    skipped,
                    attempts,
                };
                info!(
                    "Imported {} as {} '{}' ({} records, {} relations, {} skipped)",
                    source_uri.canonical,
                    kind.as_str(),
                    record.label(),
                    report.records_created.len(),
                    report.relations_created,
                    report.skipped.len()
                );
                Ok(ImportOutcome::Created { record, report })
            }
        }
    }

    /// Write a plan in one transaction, retrying on uniqueness violations
    fn persist(&mut self, plan: &Plan) -> Result<Persisted, ImportError> {
        let attempts = self.config.persist_attempts;
        for attempt in 1..=attempts {
            let mut tx = self.store.begin().map_err(persistence)?;
            let mut written = WriteReport::default();

            match write_plan(&mut tx, plan, now(), &mut written) {
                Ok((id, true)) => match tx.commit() {
                    Ok(()) => return Ok(Persisted::Created(id, written, attempt)),
                    Err(e) if e.is_constraint_violation() => {
                        warn!("Commit of {} conflicted (attempt {}): {}", plan.uri.canonical, attempt, e);
                    }
                    Err(e) => return Err(persistence(e)),
                },
                // Dropping the transaction rolls back
                Ok((id, false)) => return Ok(Persisted::Existing(id)),
                Err(StepError::Store(e)) if e.is_constraint_violation() => {
                    warn!(
                        "Write of {} conflicted (attempt {}), resolving again: {}",
                        plan.uri.canonical, attempt, e
                    );
                }
                Err(e) => return Err(e.into_import()),
            }
            debug!("{}: rolled back attempt {}", plan.uri.canonical, attempt);
        }

        Err(ImportError::Persistence(format!(
            "gave up on {} after {} attempts",
            plan.uri.canonical, attempts
        )))
    }

    fn load(&self, id: EntityId) -> Result<EntityRecord, ImportError> {
        self.store
            .get_entity(id)
            .map_err(persistence)?
            .ok_or_else(|| ImportError::Persistence(format!("record {} vanished", id)))
    }
}

fn persistence<E: Display>(e: E) -> ImportError {
    ImportError::Persistence(e.to_string())
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
