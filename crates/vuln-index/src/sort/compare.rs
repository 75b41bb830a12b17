//! Comparison rules for sortable fields.
//!
//! ## Rules
//!
//! - **Severity**: ranked `critical=4, high=3, medium=2, low=1`, anything
//!   else `0`. Rank names match case-insensitively.
//! - **Dates**: parsed to epoch milliseconds. Missing or unparsable dates
//!   sort as epoch `0`, never excluded.
//! - **Text** (identifier, status, package, repository): Unicode collation
//!   with the CLDR root order. Punctuation is not ignored.
//!
//! Ties are always broken by ingestion order, in both directions.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use feruca::{Collator, Locale, Tailoring};

use crate::ids::RecordId;
use crate::record::Record;
use crate::types::{SortDirection, SortField, SortKey};

/// Offset-carrying layouts not covered by RFC 3339.
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];
/// Naive datetime layouts. Read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the rank of a severity label.
pub fn severity_rank(severity: &str) -> u8 {
    const RANKS: [(&str, u8); 4] = [("critical", 4), ("high", 3), ("medium", 2), ("low", 1)];
    let severity = severity.trim();
    RANKS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(severity))
        .map_or(0, |(_, rank)| *rank)
}

/// Parses a date field to epoch milliseconds, `0` when missing or unparsable.
pub fn parse_timestamp(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return datetime.timestamp_millis();
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(datetime) = DateTime::parse_from_str(trimmed, format) {
            return datetime.timestamp_millis();
        }
    }

    // A trailing `Z` is UTC, the same as no offset.
    let naive = trimmed.strip_suffix(['Z', 'z']).unwrap_or(trimmed);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(naive, format) {
            return datetime.and_utc().timestamp_millis();
        }
    }

    NaiveDate::parse_from_str(naive, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(0, |datetime| datetime.and_utc().timestamp_millis())
}

/// Locale-aware text ordering over the CLDR root collation.
///
/// Lowercase sorts before uppercase, accented letters sort next to their
/// base letter and punctuation sorts before digits. Strings that collate
/// equal fall back to byte order, so the result is a total order.
///
/// The collator keeps per-instance caches; build one per sort, not per
/// comparison.
pub struct TextCollator {
    collator: Collator,
}

impl TextCollator {
    pub fn new() -> Self {
        Self {
            collator: Collator::new(Tailoring::Cldr(Locale::Root), false, true),
        }
    }

    #[inline]
    pub fn compare(&mut self, a: &str, b: &str) -> Ordering {
        self.collator.collate(a, b)
    }
}

impl Default for TextCollator {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares two records on `field`, ascending, without the ingestion-order
/// tie-break. Reference ordering for checking sorted output.
#[cfg(test)]
pub(crate) fn compare_records(
    collator: &mut TextCollator,
    field: SortField,
    a: &Record,
    b: &Record,
) -> Ordering {
    match field {
        SortField::Identifier => collator.compare(&a.identifier, &b.identifier),
        SortField::Status => collator.compare(&a.status, &b.status),
        SortField::Package => collator.compare(&a.package, &b.package),
        SortField::Repository => collator.compare(&a.repository, &b.repository),
        SortField::Severity => severity_rank(&a.severity).cmp(&severity_rank(&b.severity)),
        SortField::DiscoveredAt => {
            parse_timestamp(&a.discovered_at).cmp(&parse_timestamp(&b.discovered_at))
        }
        SortField::FixedAt => parse_timestamp(&a.fixed_at).cmp(&parse_timestamp(&b.fixed_at)),
    }
}

/// Sorts `ids` by `key`, breaking ties by ingestion order.
pub fn sort_ids(records: &[Record], ids: &mut [RecordId], key: SortKey) {
    sort_ids_with(&mut TextCollator::new(), records, ids, key);
}

/// [`sort_ids`] with a caller-owned collator, for sorting many keys in one
/// pass.
///
/// Keys are extracted once per id before sorting, so dates are parsed
/// `ids.len()` times rather than once per comparison.
pub fn sort_ids_with(
    collator: &mut TextCollator,
    records: &[Record],
    ids: &mut [RecordId],
    key: SortKey,
) {
    let record = move |id: RecordId| &records[id.get()];
    match key.field {
        SortField::Identifier => sort_decorated(
            ids,
            |id| record(id).identifier.as_str(),
            key.direction,
            |a, b| collator.compare(a, b),
        ),
        SortField::Status => sort_decorated(
            ids,
            |id| record(id).status.as_str(),
            key.direction,
            |a, b| collator.compare(a, b),
        ),
        SortField::Package => sort_decorated(
            ids,
            |id| record(id).package.as_str(),
            key.direction,
            |a, b| collator.compare(a, b),
        ),
        SortField::Repository => sort_decorated(
            ids,
            |id| record(id).repository.as_str(),
            key.direction,
            |a, b| collator.compare(a, b),
        ),
        SortField::Severity => sort_decorated(
            ids,
            |id| severity_rank(&record(id).severity),
            key.direction,
            u8::cmp,
        ),
        SortField::DiscoveredAt => sort_decorated(
            ids,
            |id| parse_timestamp(&record(id).discovered_at),
            key.direction,
            i64::cmp,
        ),
        SortField::FixedAt => sort_decorated(
            ids,
            |id| parse_timestamp(&record(id).fixed_at),
            key.direction,
            i64::cmp,
        ),
    }
}

fn sort_decorated<K, F, C>(ids: &mut [RecordId], key_fn: F, direction: SortDirection, mut cmp: C)
where
    F: Fn(RecordId) -> K,
    C: FnMut(&K, &K) -> Ordering,
{
    let mut decorated: Vec<(K, RecordId)> = ids.iter().map(|&id| (key_fn(id), id)).collect();
    decorated.sort_unstable_by(|(a, a_id), (b, b_id)| {
        let ordering = match direction {
            SortDirection::Asc => cmp(a, b),
            SortDirection::Desc => cmp(b, a),
        };
        ordering.then_with(|| a_id.cmp(b_id))
    });
    for (slot, (_, id)) in ids.iter_mut().zip(decorated) {
        *slot = id;
    }
}
