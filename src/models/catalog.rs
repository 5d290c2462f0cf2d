//! Catalog of gazette issues scraped from the source site's dropdown.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw `<option>` pulled out of the issue selector, before ordering is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOption {
    pub label: String,
    pub token: String,
}

impl CatalogOption {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// One selectable issue as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Human-readable text shown in the selector (often Arabic).
    pub label: String,
    /// Opaque selector value used to request the issue.
    pub token: String,
    /// Position on the source page. The site does not sort by token.
    pub sort_order: i32,
    pub refreshed_at: DateTime<Utc>,
}

impl CatalogEntry {
    /// Assign encounter order to scraped options.
    ///
    /// Placeholder options with a blank value are dropped, and a token seen
    /// twice keeps its first position only, so sort orders stay dense.
    pub fn from_options(options: Vec<CatalogOption>, refreshed_at: DateTime<Utc>) -> Vec<Self> {
        let mut seen = HashSet::new();
        options
            .into_iter()
            .filter_map(|opt| {
                let token = opt.token.trim().to_string();
                if token.is_empty() || !seen.insert(token.clone()) {
                    return None;
                }
                Some((opt.label.trim().to_string(), token))
            })
            .enumerate()
            .map(|(idx, (label, token))| CatalogEntry {
                label,
                token,
                sort_order: idx as i32,
                refreshed_at,
            })
            .collect()
    }
}
