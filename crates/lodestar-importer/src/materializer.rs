//! Record construction and the transactional writes of a plan

use crate::error::{ConflictingIdentifier, ImportError, StepError};
use crate::plan::{Plan, PlannedObject, PlannedTerm};
use crate::resolver::{resolve, Resolution};
use lodestar_domain::traits::ImportTransaction;
use lodestar_domain::{
    EntityData, EntityId, EntityKind, EntityRecord, Event, ExternalIdentifier, Institution,
    Person, Place, Prize, RelationEdge, Vocabulary, Work,
};
use lodestar_mapping::{Extraction, Field};
use tracing::debug;

/// Record attributes from an extraction
///
/// Vocabulary labels come from the planned terms, sorted like the store
/// returns them.
pub(crate) fn build_data(kind: EntityKind, extraction: &Extraction, terms: &[PlannedTerm]) -> EntityData {
    let text = |field| extraction.text(field).map(str::to_string);
    let date = |field| extraction.date(field).cloned();

    match kind {
        EntityKind::Person => EntityData::Person(Person {
            forename: text(Field::Forename),
            surname: text(Field::Surname),
            start: date(Field::Start),
            end: date(Field::End),
            gender: extraction.gender(),
            professions: labels(terms, Vocabulary::Profession),
            titles: labels(terms, Vocabulary::Title),
        }),
        EntityKind::Place => EntityData::Place(Place {
            label: text(Field::Name),
            latitude: extraction.float(Field::Latitude),
            longitude: extraction.float(Field::Longitude),
            kind: text(Field::FeatureClass),
        }),
        EntityKind::Institution => EntityData::Institution(Institution {
            name: text(Field::Name),
            start: date(Field::Start),
            end: date(Field::End),
        }),
        EntityKind::Event => EntityData::Event(Event {
            name: text(Field::Name),
            start: date(Field::Start),
            end: date(Field::End),
        }),
        EntityKind::Work => EntityData::Work(Work {
            name: text(Field::Name),
            start: date(Field::Start),
        }),
        EntityKind::Prize => EntityData::Prize(Prize {
            name: text(Field::Name),
            start: date(Field::Start),
        }),
    }
}

fn labels(terms: &[PlannedTerm], vocabulary: Vocabulary) -> Vec<String> {
    let mut labels: Vec<String> = terms
        .iter()
        .filter(|t| t.vocabulary == vocabulary)
        .map(|t| t.label.trim().to_string())
        .collect();
    labels.sort();
    labels
}

/// Counters of one transaction attempt
#[derive(Debug, Default)]
pub(crate) struct WriteReport {
    pub records_created: Vec<EntityId>,
    pub relations_created: usize,
    pub identifiers_registered: usize,
}

/// Write a plan, re-resolving its identity against the transaction first
///
/// Returns the record id and whether it was created by this call.
pub(crate) fn write_plan<T: ImportTransaction>(
    tx: &mut T,
    plan: &Plan,
    created_at: u64,
    report: &mut WriteReport,
) -> Result<(EntityId, bool), StepError<T::Error>> {
    let uri = plan.uri.canonical.as_str();
    if let Resolution::Existing(id) = resolve(&*tx, plan.kind, uri, &plan.candidates)? {
        return Ok((id, false));
    }

    debug!("{}: MATERIALIZING {}", uri, plan.kind.as_str());
    let record = EntityRecord::new(plan.data.clone(), created_at);
    tx.insert_entity(&record).map_err(StepError::Store)?;
    report.records_created.push(record.id);

    for term in &plan.vocabulary {
        tx.attach_vocabulary(record.id, term.vocabulary, &term.label, term.uri.as_deref())
            .map_err(StepError::Store)?;
    }

    // Identifiers go in before relations so a target that links back to
    // this record resolves to it.
    debug!("{}: PERSISTING_IDENTIFIERS {}", uri, plan.candidates.len());
    for candidate in &plan.candidates {
        match tx.owner_of(candidate).map_err(StepError::Store)? {
            None => {
                tx.register_identifier(&ExternalIdentifier::new(candidate.as_str(), record.id))
                    .map_err(StepError::Store)?;
                report.identifiers_registered += 1;
            }
            Some(owner) if owner == record.id => {}
            Some(owner) => {
                return Err(ImportError::IdentityConflict {
                    uri: uri.to_string(),
                    identifiers: vec![ConflictingIdentifier {
                        uri: candidate.clone(),
                        owner,
                        owner_kind: tx.get_entity(owner).map_err(StepError::Store)?.map(|r| r.kind()),
                    }],
                }
                .into())
            }
        }
    }

    debug!("{}: LINKING_RELATIONS {}", uri, plan.relations.len());
    for relation in &plan.relations {
        let object = match &relation.object {
            PlannedObject::Existing(id) => *id,
            PlannedObject::New(target) => write_plan(tx, target, created_at, report)?.0,
        };
        let target = &relation.target;
        let edge = RelationEdge::new(record.id, object, target.kind)
            .with_interval(target.start.clone(), target.end.clone())
            .with_notes(target.notes.as_str());
        if tx.get_or_create_relation(&edge).map_err(StepError::Store)? {
            report.relations_created += 1;
        }
    }

    Ok((record.id, true))
}
