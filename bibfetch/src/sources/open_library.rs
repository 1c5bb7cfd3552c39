//! Open Library Source
//!
//! Fetches the edition record by ISBN, then resolves the references it
//! contains (authors, works, languages) with follow-up requests issued
//! concurrently. A failed follow-up only drops the data it would have
//! supplied; only the edition request itself can fail the source.
//!
//! Work subjects are noisy (places, characters, awards, shelving tags), so
//! they go through the [`GenreClassifier`] instead of being used verbatim.
//!
//! # API Reference
//! - Edition: https://openlibrary.org/isbn/{isbn}.json
//! - References: https://openlibrary.org{key}.json
//! - Covers: https://covers.openlibrary.org/b/id/{id}-{L|S}.jpg

use super::genre_classifier::GenreClassifier;
use super::http;
use crate::isbn::strip_separators;
use crate::types::{FetchOptions, Record, SourceAdapter, SourceError, SourceId};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Open Library API base URL
const OPENLIBRARY_BASE_URL: &str = "https://openlibrary.org";

/// Open Library covers base URL
const OPENLIBRARY_COVER_URL: &str = "https://covers.openlibrary.org/b/id";

/// Retrieves Open Library documents by URL
#[async_trait]
trait DocumentFetcher: Send + Sync {
    async fn get_text(&self, url: &str, options: &FetchOptions) -> Result<String, SourceError>;
}

struct HttpFetcher {
    http_client: Client,
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn get_text(&self, url: &str, options: &FetchOptions) -> Result<String, SourceError> {
        http::get_text(&self.http_client, url, options).await
    }
}

/// Open Library Source
pub struct OpenLibrarySource {
    fetcher: Box<dyn DocumentFetcher>,
    classifier: GenreClassifier,
}

impl OpenLibrarySource {
    pub fn new(http_client: Client) -> Self {
        Self::with_fetcher(Box::new(HttpFetcher { http_client }))
    }

    fn with_fetcher(fetcher: Box<dyn DocumentFetcher>) -> Self {
        Self {
            fetcher,
            classifier: GenreClassifier::new(),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<T, SourceError> {
        let body = self.fetcher.get_text(url, options).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch a referenced document, logging and dropping failures
    async fn fetch_reference<T: DeserializeOwned>(
        &self,
        reference: &Reference,
        options: &FetchOptions,
    ) -> Option<T> {
        let url = format!("{}{}.json", OPENLIBRARY_BASE_URL, reference.key);
        match self.fetch_json(&url, options).await {
            Ok(document) => Some(document),
            Err(e) => {
                debug!(key = %reference.key, error = %e, "Open Library reference lookup failed");
                None
            }
        }
    }

    async fn fetch_authors(&self, authors: &[Reference], options: &FetchOptions) -> Option<Vec<String>> {
        let names: Vec<String> = join_all(
            authors
                .iter()
                .map(|reference| self.fetch_reference::<Author>(reference, options)),
        )
        .await
        .into_iter()
        .flatten()
        .filter_map(author_name)
        .collect();

        (!names.is_empty()).then_some(names)
    }

    async fn fetch_genres(&self, works: &[Reference], options: &FetchOptions) -> Option<Vec<String>> {
        let subject_lists: Vec<Vec<String>> = join_all(
            works
                .iter()
                .map(|reference| self.fetch_reference::<Work>(reference, options)),
        )
        .await
        .into_iter()
        .flatten()
        .map(|work| work.subjects)
        .collect();

        let subjects = merge_subjects(subject_lists);
        let genres = self.classifier.classify(&subjects);
        debug!(
            subject_count = subjects.len(),
            genre_count = genres.len(),
            "Open Library subjects classified"
        );

        (!genres.is_empty()).then_some(genres)
    }

    async fn fetch_language(&self, languages: &[Reference], options: &FetchOptions) -> Option<String> {
        let first = languages.first()?;
        let language: Language = self.fetch_reference(first, options).await?;
        language_name(language)
    }
}

#[async_trait]
impl SourceAdapter for OpenLibrarySource {
    fn id(&self) -> SourceId {
        SourceId::OpenLibrary
    }

    async fn fetch(&self, code: &str, options: &FetchOptions) -> Result<Record, SourceError> {
        let url = format!("{}/isbn/{}.json", OPENLIBRARY_BASE_URL, strip_separators(code));
        let edition: Edition = self.fetch_json(&url, options).await?;

        let (authors, genres, language) = tokio::join!(
            self.fetch_authors(&edition.authors, options),
            self.fetch_genres(&edition.works, options),
            self.fetch_language(&edition.languages, options),
        );

        Ok(Record {
            authors,
            genres,
            language,
            ..edition_record(code, edition)
        })
    }
}

/// Fields taken directly from the edition document
fn edition_record(code: &str, edition: Edition) -> Record {
    let cover = edition.covers.iter().copied().find(|id| *id > 0);

    Record {
        query_code: code.to_string(),
        isbn10: first_non_empty(edition.isbn_10),
        isbn13: first_non_empty(edition.isbn_13),
        title: edition.title,
        published_date: edition.publish_date,
        thumbnail_url: cover.map(|id| format!("{}/{}-L.jpg", OPENLIBRARY_COVER_URL, id)),
        thumbnail_url_small: cover.map(|id| format!("{}/{}-S.jpg", OPENLIBRARY_COVER_URL, id)),
        description: edition.description.map(TextValue::into_string),
        publishers: (!edition.publishers.is_empty()).then_some(edition.publishers),
        ..Default::default()
    }
}

fn first_non_empty(values: Vec<String>) -> Option<String> {
    values.into_iter().find(|v| !v.is_empty())
}

/// Author display name: personal name when given, else name
fn author_name(author: Author) -> Option<String> {
    author
        .personal_name
        .filter(|n| !n.is_empty())
        .or(author.name)
        .filter(|n| !n.is_empty())
}

/// Language name in the language itself when available
///
/// For each ISO 639-1 code of the language, use the translation of the
/// name into that code; fall back to the (English) name.
fn language_name(language: Language) -> Option<String> {
    language
        .identifiers
        .iso_639_1
        .iter()
        .find_map(|code| {
            language
                .name_translated
                .get(code)
                .and_then(|names| names.first())
                .filter(|n| !n.is_empty())
                .cloned()
        })
        .or(language.name)
}

/// Union of subjects across works, first occurrence order, no duplicates
fn merge_subjects(subject_lists: Vec<Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    subject_lists
        .into_iter()
        .flatten()
        .filter(|subject| seen.insert(subject.clone()))
        .collect()
}

// ============================================================================
// Open Library API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct Reference {
    key: String,
}

#[derive(Debug, Deserialize)]
struct Edition {
    title: Option<String>,
    #[serde(default)]
    publishers: Vec<String>,
    publish_date: Option<String>,
    #[serde(default)]
    authors: Vec<Reference>,
    #[serde(default)]
    works: Vec<Reference>,
    #[serde(default)]
    languages: Vec<Reference>,
    description: Option<TextValue>,
    #[serde(default)]
    isbn_10: Vec<String>,
    #[serde(default)]
    isbn_13: Vec<String>,
    #[serde(default)]
    covers: Vec<i64>,
}

/// Open Library text fields are either plain strings or typed objects
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextValue {
    Plain(String),
    Typed { value: String },
}

impl TextValue {
    fn into_string(self) -> String {
        match self {
            TextValue::Plain(s) => s,
            TextValue::Typed { value } => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Author {
    personal_name: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default)]
    subjects: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Language {
    name: Option<String>,
    #[serde(default)]
    identifiers: LanguageIdentifiers,
    #[serde(default)]
    name_translated: HashMap<String, Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LanguageIdentifiers {
    #[serde(default)]
    iso_639_1: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
