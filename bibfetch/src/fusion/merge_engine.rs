//! Merge Engine
//!
//! Combines the per-source records of one resolution into the final record.
//!
//! # Fusion Strategy
//! Fixed per-field priority. For each field the [`PriorityTable`] lists
//! source identities in order of preference; the value comes from the first
//! listed source that produced a record with that field present. Sources are
//! ranked per field rather than globally because reliability differs by
//! field (cover images, descriptions and identifiers each have a different
//! best source).
//!
//! The query code is never taken from a source.

use super::first_present;
use crate::types::{Field, Record, SourceId, SourceResults};
use bibfetch_common::{Error, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Per-field ordered list of source identities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    order: BTreeMap<Field, Vec<SourceId>>,
}

impl PriorityTable {
    /// Table with no sources for any field (every merge yields an empty record)
    pub fn empty() -> Self {
        Self {
            order: BTreeMap::new(),
        }
    }

    /// Source order for a field
    pub fn sources_for(&self, field: Field) -> &[SourceId] {
        self.order.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the source order for a field
    pub fn set(&mut self, field: Field, sources: Vec<SourceId>) {
        self.order.insert(field, sources);
    }

    /// Builder form of [`PriorityTable::set`]
    pub fn with_order(mut self, field: Field, sources: Vec<SourceId>) -> Self {
        self.set(field, sources);
        self
    }

    /// Apply configured overrides (field name → source names)
    ///
    /// Fields not named keep their current order.
    ///
    /// # Errors
    /// `Error::Config` for an unknown field or source name.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        for (field_name, source_names) in overrides {
            let field: Field = field_name
                .parse()
                .map_err(|e| Error::Config(format!("priority table: {}", e)))?;

            let sources = source_names
                .iter()
                .map(|name| name.parse::<SourceId>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::Config(format!("priority table for {}: {}", field, e)))?;

            debug!(field = %field, ?sources, "Priority override applied");
            self.set(field, sources);
        }
        Ok(self)
    }
}

impl Default for PriorityTable {
    /// Built-in policy
    ///
    /// Google Books wins identifiers, titles, authors, dates and page counts;
    /// Open Library wins genres, language, covers, descriptions and
    /// publishers. The scraped sources fill in after both APIs.
    fn default() -> Self {
        use crate::types::SourceId::{Amazon, GoogleBooks, IsbnDb, OpenLibrary};

        let bibliographic = vec![GoogleBooks, OpenLibrary, IsbnDb, Amazon];
        let descriptive = vec![OpenLibrary, GoogleBooks, Amazon];
        let covers = vec![OpenLibrary, GoogleBooks, IsbnDb, Amazon];

        let mut table = Self::empty();
        for field in [
            Field::Isbn10,
            Field::Isbn13,
            Field::Title,
            Field::Authors,
            Field::PublishedDate,
            Field::PageCount,
        ] {
            table.set(field, bibliographic.clone());
        }
        table.set(Field::Genres, vec![OpenLibrary, GoogleBooks]);
        for field in [Field::Language, Field::Description, Field::Publishers] {
            table.set(field, descriptive.clone());
        }
        for field in [Field::ThumbnailUrl, Field::ThumbnailUrlSmall] {
            table.set(field, covers.clone());
        }
        table
    }
}

/// Merge Engine
///
/// # Example
/// ```rust,ignore
/// use bibfetch::fusion::{MergeEngine, PriorityTable};
///
/// let engine = MergeEngine::new(PriorityTable::default());
/// let record = engine.merge("9780441013593", &results);
/// assert_eq!(record.query_code, "9780441013593");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    table: PriorityTable,
}

impl MergeEngine {
    pub fn new(table: PriorityTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PriorityTable {
        &self.table
    }

    /// Merge per-source results into one record for `query_code`
    ///
    /// Never fails. Sources missing from `results` count as absent.
    pub fn merge(&self, query_code: &str, results: &SourceResults) -> Record {
        let mut merged = Record::new(query_code);

        for field in Field::ALL {
            let ranked = self.table.sources_for(field).iter().filter_map(|id| {
                results
                    .get(id)
                    .and_then(Option::as_ref)
                    .map(|record| (*id, record))
            });

            match first_present(field, ranked) {
                Some((source, record)) => {
                    merged.copy_field(field, record);
                    debug!(field = %field, source = %source, "Selected value for field");
                }
                None => debug!(field = %field, "No source supplied field"),
            }
        }

        debug!(
            query_code = %query_code,
            present_sources = results.values().filter(|r| r.is_some()).count(),
            present_fields = merged.present_count(),
            "Merge complete"
        );

        merged
    }
}
