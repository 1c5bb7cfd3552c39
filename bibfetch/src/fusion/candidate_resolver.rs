//! Candidate Resolver
//!
//! Reduces several candidate matches returned by one source for the same
//! query into a single partial record.
//!
//! # Resolution Strategy
//! First-applicable-wins, per field, independently. Candidates are taken in
//! the order the source returned them; the first candidate with a present
//! value for a field fixes that field, later candidates only fill fields
//! that are still absent. This is a left fold in which the accumulator's
//! values take precedence over the next candidate's values, as opposed to an
//! overwrite merge where the last candidate would win.

use super::first_present;
use crate::types::{Field, Record};
use tracing::debug;

/// Resolve candidate records from one source into one record
///
/// - no candidates: a record carrying only `query_code`
/// - one candidate: that candidate, unchanged
/// - otherwise: a new record with each field taken from the first candidate
///   that has it
pub fn resolve_candidates(query_code: &str, mut candidates: Vec<Record>) -> Record {
    if candidates.len() == 1 {
        return candidates.swap_remove(0);
    }

    let mut resolved = Record::new(query_code);
    for field in Field::ALL {
        if let Some((index, candidate)) = first_present(field, candidates.iter().enumerate()) {
            resolved.copy_field(field, candidate);
            debug!(field = %field, candidate = index, "Field fixed by candidate");
        }
    }

    debug!(
        query_code = %query_code,
        candidate_count = candidates.len(),
        present_fields = resolved.present_count(),
        "Candidates resolved"
    );

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: Option<&str>) -> Record {
        Record {
            title: title.map(str::to_string),
            ..Record::new("q")
        }
    }

    #[test]
    fn test_empty_candidates_yield_query_code_only() {
        let record = resolve_candidates("9780441013593", vec![]);
        assert_eq!(record, Record::new("9780441013593"));
    }

    #[test]
    fn test_single_candidate_is_identity() {
        let candidate = Record {
            title: Some(String::new()),
            page_count: Some(300),
            ..Record::new("source-code")
        };
        let record = resolve_candidates("q", vec![candidate.clone()]);
        assert_eq!(record, candidate);
    }

    #[test]
    fn test_first_candidate_wins() {
        let record = resolve_candidates("q", vec![titled(Some("X")), titled(Some("Y"))]);
        assert_eq!(record.title.as_deref(), Some("X"));
    }

    #[test]
    fn test_absent_value_does_not_fix_field() {
        let record = resolve_candidates("q", vec![titled(None), titled(Some("Y"))]);
        assert_eq!(record.title.as_deref(), Some("Y"));

        let record = resolve_candidates("q", vec![titled(Some("")), titled(Some("Y"))]);
        assert_eq!(record.title.as_deref(), Some("Y"));
    }

    #[test]
    fn test_fields_resolved_independently() {
        let first = Record {
            title: Some("First Title".to_string()),
            ..Record::new("q")
        };
        let second = Record {
            title: Some("Second Title".to_string()),
            authors: Some(vec!["Second Author".to_string()]),
            ..Record::new("q")
        };
        let third = Record {
            authors: Some(vec!["Third Author".to_string()]),
            description: Some("Third description".to_string()),
            ..Record::new("q")
        };

        let record = resolve_candidates("q", vec![first, second, third]);

        assert_eq!(record.title.as_deref(), Some("First Title"));
        assert_eq!(record.authors, Some(vec!["Second Author".to_string()]));
        assert_eq!(record.description.as_deref(), Some("Third description"));
        assert_eq!(record.present_count(), 3);
    }

    #[test]
    fn test_resolved_record_carries_query_code() {
        let a = Record {
            title: Some("A".to_string()),
            ..Record::new("from-a")
        };
        let b = Record::new("from-b");
        let record = resolve_candidates("query", vec![a, b]);
        assert_eq!(record.query_code, "query");
    }
}
