//! Runtime settings resolution for bibfetch
//!
//! Provides multi-tier resolution with CLI → ENV → TOML → default priority.
//! A setting supplied by more than one tier is logged as a warning, since it
//! usually means a stale export or config entry is being shadowed.

use crate::fusion::PriorityTable;
use crate::types::{FetchOptions, SourceId};
use bibfetch_common::config::TomlConfig;
use bibfetch_common::{Error, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable with a comma separated source selection
pub const SOURCES_ENV_VAR: &str = "BIBFETCH_SOURCES";

/// Environment variable with the per-request timeout in seconds
pub const TIMEOUT_ENV_VAR: &str = "BIBFETCH_TIMEOUT_SECS";

/// Sources queried when nothing is configured
pub const DEFAULT_SOURCES: [SourceId; 2] = [SourceId::GoogleBooks, SourceId::OpenLibrary];

/// Per-request timeout when nothing is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub sources: Option<Vec<SourceId>>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for a [`crate::Resolver`]
#[derive(Debug, Clone)]
pub struct ResolveSettings {
    /// Selected sources, duplicates removed, in selection order
    pub sources: Vec<SourceId>,
    pub fetch: FetchOptions,
    pub priority: PriorityTable,
}

/// Resolve every runtime setting
pub fn resolve_settings(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<ResolveSettings> {
    let sources = resolve_sources(cli.sources.as_deref(), toml_config)?;
    let timeout = resolve_timeout(cli.timeout_secs, toml_config)?;
    let priority = PriorityTable::default().with_overrides(&toml_config.priority)?;

    Ok(ResolveSettings {
        sources,
        fetch: FetchOptions {
            timeout,
            user_agent: toml_config.fetch.user_agent.clone(),
        },
        priority,
    })
}

/// Resolve the source selection
///
/// **Priority:** CLI → `BIBFETCH_SOURCES` → TOML `sources` → google_books, open_library
pub fn resolve_sources(cli: Option<&[SourceId]>, toml_config: &TomlConfig) -> Result<Vec<SourceId>> {
    let env_value = non_blank_env(SOURCES_ENV_VAR);
    warn_if_shadowed(
        "sources",
        &[
            ("command line", cli.is_some()),
            ("environment", env_value.is_some()),
            ("TOML", toml_config.sources.is_some()),
        ],
    );

    if let Some(sources) = cli {
        return Ok(dedup(sources.iter().copied()));
    }

    if let Some(value) = env_value {
        let sources = parse_source_list(&value)
            .map_err(|e| Error::Config(format!("{}: {}", SOURCES_ENV_VAR, e)))?;
        info!("Sources loaded from environment variable");
        return Ok(sources);
    }

    if let Some(names) = &toml_config.sources {
        let sources = names
            .iter()
            .map(|name| parse_source(name))
            .collect::<Result<Vec<_>>>()?;
        info!("Sources loaded from TOML config");
        return Ok(dedup(sources));
    }

    Ok(DEFAULT_SOURCES.to_vec())
}

/// Resolve the per-request timeout; 0 disables it
///
/// **Priority:** CLI → `BIBFETCH_TIMEOUT_SECS` → TOML `fetch.timeout_secs` → 15s
pub fn resolve_timeout(cli: Option<u64>, toml_config: &TomlConfig) -> Result<Option<Duration>> {
    let env_value = non_blank_env(TIMEOUT_ENV_VAR);
    warn_if_shadowed(
        "timeout",
        &[
            ("command line", cli.is_some()),
            ("environment", env_value.is_some()),
            ("TOML", toml_config.fetch.timeout_secs.is_some()),
        ],
    );

    let secs = match (cli, env_value) {
        (Some(secs), _) => secs,
        (None, Some(value)) => value.trim().parse::<u64>().map_err(|e| {
            Error::Config(format!("{}={:?} is not a number of seconds: {}", TIMEOUT_ENV_VAR, value, e))
        })?,
        (None, None) => toml_config.fetch.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    };

    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// Parse a comma separated source list, e.g. "google_books, amazon"
///
/// Empty items are skipped and duplicates removed.
pub fn parse_source_list(list: &str) -> Result<Vec<SourceId>> {
    let sources = list
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .map(parse_source)
        .collect::<Result<Vec<_>>>()?;
    Ok(dedup(sources))
}

fn parse_source(name: &str) -> Result<SourceId> {
    name.parse::<SourceId>()
        .map_err(|e| Error::Config(e.to_string()))
}

fn dedup(sources: impl IntoIterator<Item = SourceId>) -> Vec<SourceId> {
    let mut unique = Vec::new();
    for source in sources {
        if !unique.contains(&source) {
            unique.push(source);
        }
    }
    unique
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn warn_if_shadowed(setting: &str, tiers: &[(&str, bool)]) {
    let present: Vec<&str> = tiers
        .iter()
        .filter(|(_, is_set)| *is_set)
        .map(|(tier, _)| *tier)
        .collect();

    if present.len() > 1 {
        warn!(
            "{} configured in multiple places: {}. Using {} (highest priority).",
            setting,
            present.join(", "),
            present[0]
        );
    }
}
