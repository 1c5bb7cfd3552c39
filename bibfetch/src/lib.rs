//! bibfetch library interface
//!
//! Resolves a book code (ISBN-10 or ISBN-13) into one bibliographic record by
//! querying several catalog sources concurrently and merging their partial
//! records field by field.
//!
//! # Pipeline
//! 1. **Orchestrator** ([`sources::SourceOrchestrator`]) - runs the selected
//!    source adapters and collects one optional record per source
//! 2. **Source adapters** ([`sources`]) - fetch, normalize and reduce their own
//!    candidate matches ([`fusion::resolve_candidates`])
//! 3. **Merge engine** ([`fusion::MergeEngine`]) - picks each field from the
//!    highest-priority source that supplied it
//!
//! No step propagates a source failure: resolution always yields a record
//! whose `query_code` is the requested code.

pub mod config;
pub mod fusion;
pub mod isbn;
pub mod sources;
pub mod types;

pub use config::{resolve_settings, CliOverrides, ResolveSettings};
pub use fusion::{MergeEngine, PriorityTable};
pub use sources::{build_adapters, build_http_client, SourceOrchestrator};
pub use types::{
    ErrorKind, FetchOptions, Field, Record, SourceAdapter, SourceError, SourceId, SourceResults,
};

use std::sync::Arc;
use tracing::info;

/// Orchestrator, merge policy and fetch options bundled for repeated use
pub struct Resolver {
    orchestrator: SourceOrchestrator,
    engine: MergeEngine,
    options: FetchOptions,
}

impl Resolver {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        priority: PriorityTable,
        options: FetchOptions,
    ) -> Self {
        Self {
            orchestrator: SourceOrchestrator::new(adapters),
            engine: MergeEngine::new(priority),
            options,
        }
    }

    /// Build a resolver with the built-in adapters for the configured sources
    ///
    /// # Errors
    /// Fails only when the HTTP client cannot be built (e.g. an invalid
    /// User-Agent).
    pub fn from_settings(settings: &ResolveSettings) -> bibfetch_common::Result<Self> {
        let client = build_http_client(settings.fetch.user_agent.as_deref())?;
        let adapters = build_adapters(&settings.sources, &client);
        info!(
            sources = ?settings.sources,
            timeout = ?settings.fetch.timeout,
            "Resolver configured"
        );
        Ok(Self::new(adapters, settings.priority.clone(), settings.fetch.clone()))
    }

    /// Resolve `code` into a merged record
    pub async fn resolve(&self, code: &str) -> Record {
        self.resolve_with_sources(code).await.0
    }

    /// Resolve `code`, also returning the per-source records the merge used
    pub async fn resolve_with_sources(&self, code: &str) -> (Record, SourceResults) {
        let results = self.orchestrator.fetch_all(code, &self.options).await;
        let merged = self.engine.merge(code, &results);
        (merged, results)
    }
}

/// Resolve `code` with the given adapters and the default priority table
///
/// Never fails; with no adapters (or only failing ones) the result carries
/// nothing but the query code.
pub async fn resolve(code: &str, adapters: &[Arc<dyn SourceAdapter>], options: &FetchOptions) -> Record {
    let results = SourceOrchestrator::new(adapters.to_vec())
        .fetch_all(code, options)
        .await;
    merge_results(code, &results)
}

/// Merge already collected per-source results with the default priority table
pub fn merge_results(code: &str, results: &SourceResults) -> Record {
    MergeEngine::default().merge(code, results)
}
