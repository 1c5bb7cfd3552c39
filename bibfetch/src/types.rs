//! Core Types and Trait Definitions for bibfetch
//!
//! Defines the normalized bibliographic record and the seams of the
//! resolution pipeline:
//! - **Sources:** `SourceAdapter` (one per external source)
//! - **Fusion:** candidate resolution and per-field priority merge
//!
//! # Absence
//! A field is *absent* when it is `None`, an empty string, an empty list or
//! a zero page count. Merge logic never distinguishes between these.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Record
// ============================================================================

/// Normalized bibliographic record
///
/// Every field except `query_code` is independently optional. Records are
/// treated as immutable values: fusion builds new records and never mutates
/// its inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// The code this record was resolved for
    #[serde(default)]
    pub query_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn10: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    /// Free-form publication date as reported by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url_small: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishers: Option<Vec<String>>,
}

/// Values that have an "empty" state equivalent to no value at all
pub trait Absent {
    fn is_absent(&self) -> bool;
}

impl Absent for String {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Absent for Vec<T> {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Absent for u32 {
    fn is_absent(&self) -> bool {
        *self == 0
    }
}

fn present<T: Absent>(value: &Option<T>) -> bool {
    value.as_ref().is_some_and(|v| !v.is_absent())
}

impl Record {
    /// Create a record carrying only the query code
    pub fn new(query_code: impl Into<String>) -> Self {
        Self {
            query_code: query_code.into(),
            ..Default::default()
        }
    }

    /// Whether `field` holds a non-absent value
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Isbn10 => present(&self.isbn10),
            Field::Isbn13 => present(&self.isbn13),
            Field::Title => present(&self.title),
            Field::Authors => present(&self.authors),
            Field::PublishedDate => present(&self.published_date),
            Field::Genres => present(&self.genres),
            Field::Language => present(&self.language),
            Field::PageCount => present(&self.page_count),
            Field::ThumbnailUrl => present(&self.thumbnail_url),
            Field::ThumbnailUrlSmall => present(&self.thumbnail_url_small),
            Field::Description => present(&self.description),
            Field::Publishers => present(&self.publishers),
        }
    }

    /// Copy a single field's value from another record
    pub fn copy_field(&mut self, field: Field, from: &Record) {
        match field {
            Field::Isbn10 => self.isbn10 = from.isbn10.clone(),
            Field::Isbn13 => self.isbn13 = from.isbn13.clone(),
            Field::Title => self.title = from.title.clone(),
            Field::Authors => self.authors = from.authors.clone(),
            Field::PublishedDate => self.published_date = from.published_date.clone(),
            Field::Genres => self.genres = from.genres.clone(),
            Field::Language => self.language = from.language.clone(),
            Field::PageCount => self.page_count = from.page_count,
            Field::ThumbnailUrl => self.thumbnail_url = from.thumbnail_url.clone(),
            Field::ThumbnailUrlSmall => {
                self.thumbnail_url_small = from.thumbnail_url_small.clone()
            }
            Field::Description => self.description = from.description.clone(),
            Field::Publishers => self.publishers = from.publishers.clone(),
        }
    }

    /// Number of fields holding a non-absent value
    pub fn present_count(&self) -> usize {
        Field::ALL.iter().filter(|f| self.has(**f)).count()
    }

    /// True when no field other than the query code carries data
    pub fn is_blank(&self) -> bool {
        self.present_count() == 0
    }
}

// ============================================================================
// Field
// ============================================================================

/// Mergeable record fields (everything except the query code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Isbn10,
    Isbn13,
    Title,
    Authors,
    PublishedDate,
    Genres,
    Language,
    PageCount,
    ThumbnailUrl,
    ThumbnailUrlSmall,
    Description,
    Publishers,
}

impl Field {
    /// All mergeable fields in declaration order
    pub const ALL: [Field; 12] = [
        Field::Isbn10,
        Field::Isbn13,
        Field::Title,
        Field::Authors,
        Field::PublishedDate,
        Field::Genres,
        Field::Language,
        Field::PageCount,
        Field::ThumbnailUrl,
        Field::ThumbnailUrlSmall,
        Field::Description,
        Field::Publishers,
    ];

    /// Field name as it appears in serialized records
    pub fn name(&self) -> &'static str {
        match self {
            Field::Isbn10 => "isbn10",
            Field::Isbn13 => "isbn13",
            Field::Title => "title",
            Field::Authors => "authors",
            Field::PublishedDate => "publishedDate",
            Field::Genres => "genres",
            Field::Language => "language",
            Field::PageCount => "pageCount",
            Field::ThumbnailUrl => "thumbnailUrl",
            Field::ThumbnailUrlSmall => "thumbnailUrlSmall",
            Field::Description => "description",
            Field::Publishers => "publishers",
        }
    }

    fn snake_name(&self) -> &'static str {
        match self {
            Field::PublishedDate => "published_date",
            Field::PageCount => "page_count",
            Field::ThumbnailUrl => "thumbnail_url",
            Field::ThumbnailUrlSmall => "thumbnail_url_small",
            other => other.name(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown field name
#[derive(Debug, Error)]
#[error("Unknown field: {0}")]
pub struct UnknownFieldError(pub String);

impl FromStr for Field {
    type Err = UnknownFieldError;

    /// Accepts both the serialized (`thumbnailUrl`) and snake_case
    /// (`thumbnail_url`) spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s || f.snake_name() == s)
            .ok_or_else(|| UnknownFieldError(s.to_string()))
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Identity of an external data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceId {
    /// Google Books volumes API
    #[serde(rename = "google_books")]
    GoogleBooks,
    /// Open Library editions API
    #[serde(rename = "open_library")]
    OpenLibrary,
    /// isbndb.com book page (scraped)
    #[serde(rename = "isbndb")]
    IsbnDb,
    /// amazon.com search and product pages (scraped)
    #[serde(rename = "amazon")]
    Amazon,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::GoogleBooks,
        SourceId::OpenLibrary,
        SourceId::IsbnDb,
        SourceId::Amazon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceId::GoogleBooks => "google_books",
            SourceId::OpenLibrary => "open_library",
            SourceId::IsbnDb => "isbndb",
            SourceId::Amazon => "amazon",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown source name
#[derive(Debug, Error)]
#[error("Unknown source: {0} (expected one of google_books, open_library, isbndb, amazon)")]
pub struct UnknownSourceError(pub String);

impl FromStr for SourceId {
    type Err = UnknownSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        SourceId::ALL
            .iter()
            .copied()
            .find(|id| id.name() == normalized)
            .ok_or_else(|| UnknownSourceError(s.trim().to_string()))
    }
}

/// Per-source outcome of one resolution: `Some` when the source produced a
/// record, `None` when it was not queried or failed
pub type SourceResults = HashMap<SourceId, Option<Record>>;

/// Per-call fetch configuration handed to every source adapter
///
/// The orchestrator passes this through untouched; adapters apply it to each
/// request they issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Deadline for each individual request
    pub timeout: Option<Duration>,
    /// User-Agent header override
    pub user_agent: Option<String>,
}

/// Source adapter trait
///
/// One implementation per external source. Implementations reduce multiple
/// candidate matches to a single record themselves (see
/// [`crate::fusion::resolve_candidates`]).
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source identity used as the key in [`SourceResults`]
    fn id(&self) -> SourceId;

    /// Fetch a partial record for `code`
    ///
    /// # Errors
    /// Returns `SourceError` on transport failure, when the source has no
    /// match, or when the payload cannot be interpreted.
    async fn fetch(&self, code: &str, options: &FetchOptions) -> Result<Record, SourceError>;
}

/// Source adapter error
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Network error or non-success status
    #[error("Transport error: {0}")]
    Transport(String),

    /// Source has no record for the code
    #[error("Not found: {0}")]
    NotFound(String),

    /// Source responded but the payload had an unexpected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Error classification at the orchestrator boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceUnavailable,
    SourceNotFound,
    SourceMalformed,
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::Transport(_) => ErrorKind::SourceUnavailable,
            SourceError::NotFound(_) => ErrorKind::SourceNotFound,
            SourceError::Parse(_) => ErrorKind::SourceMalformed,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::Parse(e.to_string())
        } else {
            SourceError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Parse(e.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
