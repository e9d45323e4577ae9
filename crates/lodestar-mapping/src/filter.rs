//! Selection of the subject a description is about

use crate::error::ExtractError;
use crate::rule::Filter;
use lodestar_graph::{Graph, Term};
use tracing::debug;

/// Select the single IRI subject satisfying at least one filter
///
/// Returns `Ok(None)` if no subject qualifies and
/// [`ExtractError::Ambiguous`] if more than one does.
pub fn select_subject(graph: &Graph, filters: &[Filter]) -> Result<Option<String>, ExtractError> {
    let matching: Vec<String> = graph
        .iri_subjects()
        .into_iter()
        .filter(|iri| {
            let subject = Term::iri(*iri);
            filters.iter().any(|f| f.matches(graph, &subject))
        })
        .map(str::to_string)
        .collect();

    debug!("{} of {} subjects match the filters", matching.len(), graph.iri_subjects().len());

    match matching.len() {
        0 => Ok(None),
        1 => Ok(matching.into_iter().next()),
        _ => Err(ExtractError::Ambiguous { subjects: matching }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Constraint;

    const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    const PERSON: &str = "https://d-nb.info/standards/elementset/gnd#DifferentiatedPerson";
    const EVENT: &str = "https://d-nb.info/standards/elementset/gnd#ConferenceOrEvent";

    fn type_filter(class: &str) -> Filter {
        Filter {
            constraints: vec![Constraint {
                predicate: TYPE.to_string(),
                object: Some(Term::iri(class)),
            }],
        }
    }

    #[test]
    fn test_single_match() {
        let mut graph = Graph::new();
        graph.insert(Term::iri("https://d-nb.info/gnd/118566512"), TYPE, Term::iri(PERSON));
        graph.insert(Term::iri("https://d-nb.info/gnd/4066009-6"), TYPE, Term::iri(EVENT));

        let subject = select_subject(&graph, &[type_filter(PERSON)]).unwrap();
        assert_eq!(subject.as_deref(), Some("https://d-nb.info/gnd/118566512"));
    }

    #[test]
    fn test_any_filter_qualifies() {
        let mut graph = Graph::new();
        graph.insert(Term::iri("https://d-nb.info/gnd/4066009-6"), TYPE, Term::iri(EVENT));
        let subject = select_subject(&graph, &[type_filter(PERSON), type_filter(EVENT)]).unwrap();
        assert_eq!(subject.as_deref(), Some("https://d-nb.info/gnd/4066009-6"));
    }

    #[test]
    fn test_no_match_is_none() {
        let mut graph = Graph::new();
        graph.insert(Term::iri("https://d-nb.info/gnd/4066009-6"), TYPE, Term::iri(EVENT));
        assert_eq!(select_subject(&graph, &[type_filter(PERSON)]).unwrap(), None);
    }

    #[test]
    fn test_ambiguous_names_subjects() {
        let mut graph = Graph::new();
        graph.insert(Term::iri("https://d-nb.info/gnd/1"), TYPE, Term::iri(PERSON));
        graph.insert(Term::iri("https://d-nb.info/gnd/2"), TYPE, Term::iri(PERSON));
        match select_subject(&graph, &[type_filter(PERSON)]) {
            Err(ExtractError::Ambiguous { subjects }) => {
                assert_eq!(subjects, vec!["https://d-nb.info/gnd/1", "https://d-nb.info/gnd/2"]);
            }
            other => panic!("Expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_subjects_are_not_candidates() {
        let mut graph = Graph::new();
        graph.insert(Term::BlankNode("b0".to_string()), TYPE, Term::iri(PERSON));
        assert_eq!(select_subject(&graph, &[type_filter(PERSON)]).unwrap(), None);
    }
}
