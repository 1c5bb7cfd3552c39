//! Fusion layer
//!
//! Two reductions over partial records, both "first present value wins":
//! - **candidate_resolver** - several matches from one source, in the order
//!   the source returned them
//! - **merge_engine** - one record per source, ordered per field by a
//!   priority table
//!
//! Both are built on [`first_present`].

pub mod candidate_resolver;
pub mod merge_engine;

pub use candidate_resolver::resolve_candidates;
pub use merge_engine::{MergeEngine, PriorityTable};

use crate::types::{Field, Record};

/// Find the first record that carries a non-absent value for `field`
///
/// Each candidate is paired with a key (candidate index, source identity)
/// that is returned alongside the winning record for provenance logging.
pub fn first_present<'a, K, I>(field: Field, candidates: I) -> Option<(K, &'a Record)>
where
    I: IntoIterator<Item = (K, &'a Record)>,
{
    candidates.into_iter().find(|(_, record)| record.has(field))
}
