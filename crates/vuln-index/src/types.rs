//! Public query and result types.
//!
//! Hosts build a [`SearchQuery`], hand it to the engine and read back a
//! [`QueryResult`]. Names in queries are plain strings so that a UI can pass
//! them through unchanged; the engine resolves them and ignores what it does
//! not recognize.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// A filterable categorical dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Severity,
    Package,
    Repository,
    Status,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Severity,
        Dimension::Package,
        Dimension::Repository,
        Dimension::Status,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Severity => "severity",
            Self::Package => "package",
            Self::Repository => "repository",
            Self::Status => "status",
        }
    }

    /// Resolves a dimension name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dimension| dimension.as_str() == name)
    }

    /// Returns the record value this dimension indexes.
    pub fn value_of(self, record: &Record) -> &str {
        match self {
            Self::Severity => &record.severity,
            Self::Package => &record.package,
            Self::Repository => &record.repository,
            Self::Status => &record.status,
        }
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sortable record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Identifier,
    Severity,
    DiscoveredAt,
    FixedAt,
    Status,
    Package,
    Repository,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::Identifier,
        SortField::Severity,
        SortField::DiscoveredAt,
        SortField::FixedAt,
        SortField::Status,
        SortField::Package,
        SortField::Repository,
    ];

    /// Fields that get a precomputed order unless configured otherwise.
    pub const PRECOMPUTED_DEFAULT: [SortField; 5] = [
        SortField::Identifier,
        SortField::Severity,
        SortField::DiscoveredAt,
        SortField::FixedAt,
        SortField::Status,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Severity => "severity",
            Self::DiscoveredAt => "discovered_at",
            Self::FixedAt => "fixed_at",
            Self::Status => "status",
            Self::Package => "package",
            Self::Repository => "repository",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const BOTH: [SortDirection; 2] = [SortDirection::Asc, SortDirection::Desc];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A `(field, direction)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction.as_str())
    }
}

/// Dimension name to required value. Entries with empty values are inactive.
pub type FilterMap = BTreeMap<String, String>;

/// Page size used when a query does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// One query: search term, filters, sort and page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub term: String,
    pub filters: FilterMap,
    pub sort_key: Option<String>,
    pub sort_direction: SortDirection,
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            term: String::new(),
            filters: FilterMap::new(),
            sort_key: None,
            sort_direction: SortDirection::Asc,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, dimension: Dimension, value: impl Into<String>) -> Self {
        self.filters
            .insert(dimension.as_str().to_string(), value.into());
        self
    }

    pub fn sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_key = Some(field.as_str().to_string());
        self.sort_direction = direction;
        self
    }

    pub fn page(mut self, page_index: usize, page_size: usize) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }
}

/// Per-query statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Wall-clock time spent answering the query.
    pub elapsed_micros: u64,
    /// Number of records held by the engine.
    pub dataset_size: usize,
    /// Number of records matching search and filters.
    pub matched: usize,
    /// Approximate index footprint in bytes. An estimate derived from index
    /// cardinalities, not allocator accounting.
    pub estimated_memory_bytes: usize,
}

/// The answer to one [`SearchQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Records on the requested page, in sort order.
    pub page: Vec<Record>,
    /// Matching records before pagination.
    pub total_matching: usize,
    pub stats: QueryStats,
}

/// Distinct observed values per dimension, for populating filter controls.
pub type DistinctValues = BTreeMap<Dimension, Vec<String>>;

/// Build status information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildStatus {
    /// Current state of the build.
    pub state: String,
    /// Records handed to the engine.
    pub records: usize,
    /// Records indexed so far.
    pub indexed_records: usize,
    /// Unix timestamp (ms) when the build task was scheduled.
    pub scheduled_at: Option<u64>,
    /// Unix timestamp (ms) when the build started running.
    pub started_at: Option<u64>,
    /// Unix timestamp (ms) when the build finished.
    pub finished_at: Option<u64>,
    /// Build duration in ms, once finished.
    pub build_ms: Option<u64>,
    /// Last error message if state is "error".
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_names_roundtrip() {
        for dimension in Dimension::ALL {
            assert_eq!(Dimension::parse(dimension.as_str()), Some(dimension));
        }
        assert_eq!(Dimension::parse("Severity"), None);
        assert_eq!(Dimension::parse("cvss"), None);
    }

    #[test]
    fn sort_field_names_roundtrip() {
        for field in SortField::ALL {
            assert_eq!(SortField::parse(field.as_str()), Some(field));
        }
        assert_eq!(SortField::parse("score"), None);
    }

    #[test]
    fn query_deserializes_with_defaults() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"term":"openssl","filters":{"severity":"high"}}"#)
                .expect("query json");
        assert_eq!(query.term, "openssl");
        assert_eq!(query.filters.get("severity").map(String::as_str), Some("high"));
        assert_eq!(query.sort_key, None);
        assert_eq!(query.sort_direction, SortDirection::Asc);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn builder_records_names() {
        let query = SearchQuery::new("cve")
            .filter(Dimension::Status, "open")
            .sort(SortField::FixedAt, SortDirection::Desc)
            .page(2, 25);
        assert_eq!(query.filters.get("status").map(String::as_str), Some("open"));
        assert_eq!(query.sort_key.as_deref(), Some("fixed_at"));
        assert_eq!(query.sort_direction, SortDirection::Desc);
        assert_eq!((query.page_index, query.page_size), (2, 25));
    }
}
