use anyhow::Result;
use std::fmt;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::deck::EMPTY_PLACEHOLDER;

/// Shown when the fact source cannot be read at all.
pub const LOAD_FAILED_PLACEHOLDER: &str = "Could not load facts.txt";

/// Where the newline-delimited fact list comes from.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactSource {
    File(PathBuf),
    Url(String),
}

#[cfg(not(target_arch = "wasm32"))]
impl FactSource {
    /// Interpret a CLI or config value: `http(s)://` prefixes are URLs, anything else a path.
    pub fn parse(value: &str) -> Self {
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    fn read(&self) -> Result<String> {
        use anyhow::Context;
        match self {
            Self::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            Self::Url(url) => ureq::get(url)
                .call()
                .with_context(|| format!("Failed to fetch {url}"))?
                .body_mut()
                .read_to_string()
                .with_context(|| format!("Failed to read response body from {url}")),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl fmt::Display for FactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Split raw text into facts: one per line, trimmed, blank lines dropped.
pub fn parse_facts(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load facts, never failing: an empty source or a read error yields a single placeholder.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_or_placeholder(source: &FactSource) -> Vec<String> {
    facts_or_placeholder(source, source.read())
}

/// Turn a read result into the facts to show, substituting a placeholder
/// for an empty list or a failed read.
pub fn facts_or_placeholder(source: impl fmt::Display, raw: Result<String>) -> Vec<String> {
    match raw {
        Ok(raw) => {
            let facts = parse_facts(&raw);
            if facts.is_empty() {
                tracing::warn!(%source, "fact source is empty");
                vec![EMPTY_PLACEHOLDER.to_string()]
            } else {
                tracing::info!(%source, count = facts.len(), "loaded facts");
                facts
            }
        }
        Err(e) => {
            tracing::warn!(%source, "failed to load facts: {e:#}");
            vec![LOAD_FAILED_PLACEHOLDER.to_string()]
        }
    }
}
