//! QueryEngine - main API for querying a record collection.

use std::sync::Arc;
use std::time::Instant;

use super::candidates::{apply_filters, term_candidates, Candidates};
use crate::config::EngineConfig;
use crate::error::{ConstructionError, Result};
use crate::ids::RecordId;
use crate::indexer::IndexData;
use crate::record::ingest::records_from_json;
use crate::record::Record;
use crate::scheduler::{BuildHandle, IdleSignal};
use crate::sort::sort_ids;
use crate::types::{
    BuildStatus, DistinctValues, QueryResult, QueryStats, SearchQuery, SortField, SortKey,
};

/// Indexed, read-only query engine over one fixed record array.
///
/// Construction returns as soon as the index build is scheduled. Queries
/// issued before the build finishes wait for it; afterwards the engine is
/// immutable and every query is a plain read.
#[derive(Debug)]
pub struct QueryEngine {
    records: Arc<[Record]>,
    build: BuildHandle,
}

impl QueryEngine {
    /// Schedules the index build for `records` on the current tokio runtime.
    pub fn new(
        records: impl Into<Arc<[Record]>>,
        config: &EngineConfig,
    ) -> std::result::Result<Self, ConstructionError> {
        let records = records.into();
        if records.len() >= RecordId::MAX_RECORDS {
            return Err(ConstructionError::TooManyRecords(records.len()));
        }
        let build = BuildHandle::schedule(records.clone(), config)?;
        Ok(Self { records, build })
    }

    /// Parses a JSON array of records and schedules the build.
    pub fn from_json(
        source: &str,
        config: &EngineConfig,
    ) -> std::result::Result<Self, ConstructionError> {
        Self::new(records_from_json(source)?, config)
    }

    /// The backing record array, in ingestion order.
    pub fn records(&self) -> &Arc<[Record]> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn status(&self) -> BuildStatus {
        self.build.status()
    }

    pub fn is_ready(&self) -> bool {
        self.build.try_ready().is_some()
    }

    /// Signal used by idle-triggered builds.
    pub fn idle_signal(&self) -> IdleSignal {
        self.build.idle_signal()
    }

    /// Waits until the index is built.
    pub async fn ready(&self) -> Result<()> {
        self.build.wait_ready().await.map(|_| ())
    }

    /// The finished index, once built.
    pub fn index(&self) -> Option<Arc<IndexData>> {
        self.build.try_ready()
    }

    /// Answers one query, waiting for the build if it has not finished.
    pub async fn search(&self, query: &SearchQuery) -> Result<QueryResult> {
        let data = self.build.wait_ready().await?;
        Ok(execute_query(&data, query))
    }

    /// Answers one query without waiting. `None` until the build finishes.
    pub fn try_search(&self, query: &SearchQuery) -> Option<QueryResult> {
        self.build
            .try_ready()
            .map(|data| execute_query(&data, query))
    }

    /// Distinct observed values per dimension, waiting for the build.
    pub async fn distinct_values(&self) -> Result<DistinctValues> {
        let data = self.build.wait_ready().await?;
        Ok(data.distinct_values())
    }

    pub fn try_distinct_values(&self) -> Option<DistinctValues> {
        self.build.try_ready().map(|data| data.distinct_values())
    }
}

/// Runs `query` against built index data.
///
/// Candidates come from the term and filters; ordering walks the
/// precomputed sequence for the sort key when one exists, and sorts only the
/// candidates otherwise. Out-of-range pages are empty.
pub fn execute_query(data: &IndexData, query: &SearchQuery) -> QueryResult {
    let started = Instant::now();
    let total = data.len();

    let candidates = term_candidates(data.inverted(), &query.term);
    let candidates = apply_filters(data, candidates, &query.filters);
    let matched = candidates.len(total);

    let start = query.page_index.saturating_mul(query.page_size);
    let end = start.saturating_add(query.page_size).min(matched);
    let page_ids = if start >= end {
        Vec::new()
    } else {
        match resolve_sort_key(query) {
            Some(key) => sorted_page(data, &candidates, key, start, end),
            None => unsorted_page(&candidates, start, end),
        }
    };

    let page = page_ids
        .into_iter()
        .filter_map(|id| data.record(id).cloned())
        .collect();

    let elapsed_micros = started.elapsed().as_micros() as u64;
    log::debug!(
        "vuln index query term={:?} filters={} sort={:?} matched={} elapsed_us={}",
        query.term,
        query.filters.len(),
        query.sort_key,
        matched,
        elapsed_micros,
    );

    QueryResult {
        page,
        total_matching: matched,
        stats: QueryStats {
            elapsed_micros,
            dataset_size: total,
            matched,
            estimated_memory_bytes: data.estimated_bytes(),
        },
    }
}

/// Resolves the query's sort key. Unknown names leave results unsorted.
fn resolve_sort_key(query: &SearchQuery) -> Option<SortKey> {
    let name = query.sort_key.as_deref().map(str::trim)?;
    if name.is_empty() {
        return None;
    }
    match SortField::parse(name) {
        Some(field) => Some(SortKey::new(field, query.sort_direction)),
        None => {
            log::debug!("ignoring unknown sort key={name}");
            None
        }
    }
}

/// Ingestion-order page.
fn unsorted_page(candidates: &Candidates, start: usize, end: usize) -> Vec<RecordId> {
    match candidates {
        Candidates::All => (start..end).map(RecordId::new).collect(),
        Candidates::Set(set) => set
            .iter()
            .skip(start)
            .take(end - start)
            .map(RecordId::from_u32)
            .collect(),
    }
}

/// Sorted page: walks the precomputed order keeping candidates, or sorts the
/// candidates on demand when the key was not precomputed.
fn sorted_page(
    data: &IndexData,
    candidates: &Candidates,
    key: SortKey,
    start: usize,
    end: usize,
) -> Vec<RecordId> {
    if let Some(sequence) = data.sorted().get(key) {
        return match candidates {
            Candidates::All => sequence[start..end].to_vec(),
            // The match count is already known from the bitmap, so the walk
            // stops once the page is filled.
            Candidates::Set(_) => sequence
                .iter()
                .copied()
                .filter(|id| candidates.contains(*id))
                .skip(start)
                .take(end - start)
                .collect(),
        };
    }

    log::debug!("sorting {} candidates on demand for key={key}", candidates.len(data.len()));
    let mut ids = candidates.ids(data.len());
    sort_ids(data.records(), &mut ids, key);
    ids.truncate(end);
    ids.drain(..start);
    ids
}
