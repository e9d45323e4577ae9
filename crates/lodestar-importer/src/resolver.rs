//! Identity resolution against the identifier registry

use crate::error::{ConflictingIdentifier, ImportError, StepError};
use lodestar_domain::traits::RecordReader;
use lodestar_domain::{EntityId, EntityKind};
use lodestar_graph::canonicalize;
use lodestar_mapping::{Extraction, Field};
use tracing::debug;

/// Identity of a description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// No candidate is registered
    New,
    /// Every registered candidate belongs to this record
    Existing(EntityId),
}

/// Candidate URIs of a description: the canonical URI, then its aliases
///
/// Aliases are canonicalised when a source claims them and deduplicated.
pub(crate) fn candidates(canonical: &str, extraction: &Extraction) -> Vec<String> {
    let mut uris = vec![canonical.to_string()];
    for alias in extraction.uris(Field::SameAs) {
        let alias = canonicalize(alias);
        if !alias.is_empty() && !uris.contains(&alias) {
            uris.push(alias);
        }
    }
    uris
}

/// Resolve candidates to at most one record of `kind`
///
/// Two distinct owners, or one owner of another kind, is an
/// [`ImportError::IdentityConflict`].
pub(crate) fn resolve<R: RecordReader>(
    reader: &R,
    kind: EntityKind,
    uri: &str,
    candidates: &[String],
) -> Result<Resolution, StepError<R::Error>> {
    let mut registered: Vec<(String, EntityId)> = Vec::new();
    for candidate in candidates {
        if let Some(owner) = reader.owner_of(candidate).map_err(StepError::Store)? {
            registered.push((candidate.clone(), owner));
        }
    }

    let mut owners: Vec<EntityId> = registered.iter().map(|(_, owner)| *owner).collect();
    owners.sort();
    owners.dedup();

    let owner = match owners.as_slice() {
        [] => {
            debug!("{}: no candidate of {} registered", uri, candidates.len());
            return Ok(Resolution::New);
        }
        [owner] => *owner,
        _ => return Err(conflict(reader, uri, registered)?.into()),
    };

    let record = reader.get_entity(owner).map_err(StepError::Store)?;
    match record {
        Some(record) if record.kind() == kind => {
            debug!("{}: resolved to existing {} {}", uri, kind.as_str(), owner);
            Ok(Resolution::Existing(owner))
        }
        Some(_) => Err(conflict(reader, uri, registered)?.into()),
        None => Err(ImportError::Persistence(format!(
            "identifier of {} points at missing record {}",
            uri, owner
        ))
        .into()),
    }
}

fn conflict<R: RecordReader>(
    reader: &R,
    uri: &str,
    registered: Vec<(String, EntityId)>,
) -> Result<ImportError, StepError<R::Error>> {
    let mut identifiers = Vec::with_capacity(registered.len());
    for (candidate, owner) in registered {
        let owner_kind = reader
            .get_entity(owner)
            .map_err(StepError::Store)?
            .map(|r| r.kind());
        identifiers.push(ConflictingIdentifier {
            uri: candidate,
            owner,
            owner_kind,
        });
    }
    Ok(ImportError::IdentityConflict {
        uri: uri.to_string(),
        identifiers,
    })
}
