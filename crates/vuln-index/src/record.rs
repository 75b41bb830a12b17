//! Vulnerability record data model and ingestion.

pub mod ingest;

use serde::{Deserialize, Serialize};

/// One normalized vulnerability finding.
///
/// Every field is a plain string. Missing optional fields are empty strings,
/// and date fields keep their source text; parsing happens when sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Advisory identifier, e.g. `CVE-2024-3094`.
    pub identifier: String,
    pub description: String,
    /// Affected package or container image.
    pub package: String,
    pub repository: String,
    pub severity: String,
    pub status: String,
    pub discovered_at: String,
    pub fixed_at: String,
}

impl Record {
    /// Builds the text the inverted index tokenizes: identifier, package,
    /// repository and description, joined by spaces and lowercased.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(
            self.identifier.len()
                + self.package.len()
                + self.repository.len()
                + self.description.len()
                + 3,
        );
        for (i, part) in [
            &self.identifier,
            &self.package,
            &self.repository,
            &self.description,
        ]
        .into_iter()
        .enumerate()
        {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(part);
        }
        text.to_lowercase()
    }
}
