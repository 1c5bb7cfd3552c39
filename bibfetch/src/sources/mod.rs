//! Source Adapters and the Orchestrator
//!
//! # Adapters
//! 1. **google_books** - Google Books volumes API (JSON)
//! 2. **open_library** - Open Library editions API (JSON, follow-up lookups)
//! 3. **isbndb** - isbndb.com book page (scraped HTML)
//! 4. **amazon** - amazon.com search + product page (scraped HTML)
//!
//! # Parallel Execution
//! The orchestrator runs every selected adapter in its own task and waits
//! for all of them. A failed adapter (error, panic or cancelled task) yields
//! `None` for its source and never affects its siblings.

pub mod amazon;
pub mod genre_classifier;
pub mod google_books;
mod html;
pub mod http;
pub mod isbndb;
pub mod open_library;

use crate::types::{FetchOptions, Record, SourceAdapter, SourceId, SourceResults};
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub use amazon::AmazonSource;
pub use genre_classifier::GenreClassifier;
pub use google_books::GoogleBooksSource;
pub use http::build_http_client;
pub use isbndb::IsbnDbSource;
pub use open_library::OpenLibrarySource;

/// Concurrent source executor
///
/// # Example
/// ```rust,ignore
/// let client = build_http_client(None)?;
/// let orchestrator = SourceOrchestrator::new(build_adapters(
///     &[SourceId::GoogleBooks, SourceId::OpenLibrary],
///     &client,
/// ));
/// let results = orchestrator.fetch_all("9780441013593", &FetchOptions::default()).await;
/// ```
pub struct SourceOrchestrator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl SourceOrchestrator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Query all adapters concurrently
    ///
    /// Never fails. The result has an entry for every [`SourceId`]; sources
    /// that were not selected or that failed map to `None`.
    pub async fn fetch_all(&self, code: &str, options: &FetchOptions) -> SourceResults {
        let (ids, handles): (Vec<SourceId>, Vec<_>) = self
            .adapters
            .iter()
            .map(|adapter| {
                let id = adapter.id();
                let adapter = Arc::clone(adapter);
                let code = code.to_string();
                let options = options.clone();
                let handle = tokio::spawn(async move { adapter.fetch(&code, &options).await });
                (id, handle)
            })
            .unzip();

        // Dropping this future (caller timeout) aborts the adapters still running
        let mut tasks = AbortOnDrop(handles);
        let outcomes = join_all(tasks.0.iter_mut()).await;

        let mut results: SourceResults = SourceId::ALL.iter().map(|id| (*id, None)).collect();
        for (source, outcome) in ids.into_iter().zip(outcomes) {
            let record = match outcome {
                Ok(Ok(record)) => {
                    debug!(
                        source = %source,
                        code = %code,
                        fields = record.present_count(),
                        "Source fetch successful"
                    );
                    Some(record)
                }
                Ok(Err(e)) => {
                    warn!(
                        source = %source,
                        code = %code,
                        kind = ?e.kind(),
                        error = %e,
                        "Source fetch failed (isolated)"
                    );
                    None
                }
                Err(e) => {
                    warn!(
                        source = %source,
                        code = %code,
                        error = %e,
                        "Source task aborted (isolated)"
                    );
                    None
                }
            };
            keep_first_present(&mut results, source, record);
        }

        results
    }

    /// Number of configured adapters
    pub fn count(&self) -> usize {
        self.adapters.len()
    }
}

/// Spawned adapter tasks, aborted when the owning `fetch_all` is dropped
struct AbortOnDrop<T>(Vec<JoinHandle<T>>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Store a result unless an earlier adapter with the same id already
/// produced a record
fn keep_first_present(results: &mut SourceResults, source: SourceId, record: Option<Record>) {
    let slot = results.entry(source).or_insert(None);
    if slot.is_none() {
        *slot = record;
    }
}

/// Construct the built-in adapters for a source selection, in selection order
pub fn build_adapters(ids: &[SourceId], client: &Client) -> Vec<Arc<dyn SourceAdapter>> {
    ids.iter()
        .map(|id| -> Arc<dyn SourceAdapter> {
            match id {
                SourceId::GoogleBooks => Arc::new(GoogleBooksSource::new(client.clone())),
                SourceId::OpenLibrary => Arc::new(OpenLibrarySource::new(client.clone())),
                SourceId::IsbnDb => Arc::new(IsbnDbSource::new(client.clone())),
                SourceId::Amazon => Arc::new(AmazonSource::new(client.clone())),
            }
        })
        .collect()
}

// ============================================================================
// Mock Source for Testing
// ============================================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::types::SourceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    pub enum Behavior {
        Succeed(Record),
        Fail(SourceError),
        Panic,
    }

    /// Mock source for testing
    pub struct MockSource {
        pub id: SourceId,
        pub behavior: Behavior,
        pub delay: Option<Duration>,
        /// Incremented each time a fetch runs to completion
        pub completions: Arc<AtomicUsize>,
    }

    impl MockSource {
        pub fn new(id: SourceId, record: Record) -> Self {
            Self {
                id,
                behavior: Behavior::Succeed(record),
                delay: None,
                completions: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing(id: SourceId, error: SourceError) -> Self {
            Self {
                id,
                behavior: Behavior::Fail(error),
                delay: None,
                completions: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn panicking(id: SourceId) -> Self {
            Self {
                id,
                behavior: Behavior::Panic,
                delay: None,
                completions: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl SourceAdapter for MockSource {
        fn id(&self) -> SourceId {
            self.id
        }

        async fn fetch(&self, code: &str, _options: &FetchOptions) -> Result<Record, SourceError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.completions.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Succeed(record) => Ok(Record {
                    query_code: code.to_string(),
                    ..record.clone()
                }),
                Behavior::Fail(error) => Err(error.clone()),
                Behavior::Panic => panic!("mock source panicked"),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
