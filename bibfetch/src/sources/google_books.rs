//! Google Books Source
//!
//! Queries the Google Books volumes API by ISBN. A search may return several
//! volumes for one ISBN; each becomes a candidate and the candidates are
//! reduced with the Candidate Resolver (first volume wins per field).
//!
//! # API Reference
//! - Endpoint: https://www.googleapis.com/books/v1/volumes?q=isbn:{isbn}
//! - No API key required for public volume searches

use super::genre_classifier::DEFAULT_GENRE_CAP;
use super::http;
use crate::fusion::resolve_candidates;
use crate::isbn::strip_separators;
use crate::types::{FetchOptions, Record, SourceAdapter, SourceError, SourceId};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Google Books volumes API URL
const GOOGLE_BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Google Books Source
pub struct GoogleBooksSource {
    http_client: Client,
}

impl GoogleBooksSource {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl SourceAdapter for GoogleBooksSource {
    fn id(&self) -> SourceId {
        SourceId::GoogleBooks
    }

    async fn fetch(&self, code: &str, options: &FetchOptions) -> Result<Record, SourceError> {
        let url = format!("{}?q=isbn:{}", GOOGLE_BOOKS_API_URL, strip_separators(code));
        let body = http::get_text(&self.http_client, &url, options).await?;
        parse_response(code, &body)
    }
}

/// Interpret a volumes search response
///
/// # Errors
/// - `NotFound` when the search has no items
/// - `Parse` when the body is not a volumes response
pub fn parse_response(code: &str, body: &str) -> Result<Record, SourceError> {
    let response: VolumeResponse = serde_json::from_str(body)?;

    if response.total_items == 0 || response.items.is_empty() {
        return Err(SourceError::NotFound(format!("Google Books has no volume for {}", code)));
    }

    debug!(
        code = %code,
        total_items = response.total_items,
        "Google Books volumes received"
    );

    let candidates = response
        .items
        .into_iter()
        .map(|volume| volume_to_record(code, volume))
        .collect();

    Ok(resolve_candidates(code, candidates))
}

fn volume_to_record(code: &str, volume: Volume) -> Record {
    let info = volume.volume_info;
    let identifier = |kind: &str| {
        info.industry_identifiers
            .iter()
            .find(|i| i.kind == kind)
            .map(|i| i.identifier.clone())
    };
    let (thumbnail_url, thumbnail_url_small) = match info.image_links {
        Some(links) => (links.thumbnail, links.small_thumbnail),
        None => (None, None),
    };
    let description = info
        .description
        .filter(|d| !d.is_empty())
        .or_else(|| volume.search_info.and_then(|s| s.text_snippet));

    Record {
        query_code: code.to_string(),
        isbn10: identifier("ISBN_10"),
        isbn13: identifier("ISBN_13"),
        title: info.title,
        authors: info.authors,
        published_date: info.published_date,
        genres: info
            .categories
            .map(|categories| categories.into_iter().take(DEFAULT_GENRE_CAP).collect()),
        language: info.language,
        page_count: info.page_count,
        thumbnail_url,
        thumbnail_url_small,
        description,
        publishers: info.publisher.map(|p| vec![p]),
    }
}

// ============================================================================
// Google Books API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeResponse {
    #[serde(default)]
    total_items: u32,
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    #[serde(default)]
    volume_info: VolumeInfo,
    search_info: Option<SearchInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    #[serde(default)]
    industry_identifiers: Vec<IndustryIdentifier>,
    page_count: Option<u32>,
    categories: Option<Vec<String>>,
    image_links: Option<ImageLinks>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    small_thumbnail: Option<String>,
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchInfo {
    text_snippet: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
