//! Catalog querying: free-text search, in-park/departed partitioning,
//! birth-date ordering and pagination.

use std::cmp::Ordering;

use shared::RedPanda;

use super::derived;

/// One partition of the catalog, paginated, with its own totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionPage {
    pub items: Vec<RedPanda>,
    pub total: usize,
    pub total_pages: u32,
}

/// Result of a catalog query: the in-park and departed partitions, each
/// filtered from the same set, sorted and paginated independently.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQueryResult {
    pub in_park: PartitionPage,
    pub past: PartitionPage,
}

/// Filter by `q`, split into in-park and departed, sort each partition by
/// birth date descending (unknown birth dates last), and paginate each side
/// independently.
pub fn query_catalog(
    all: &[RedPanda],
    q: Option<&str>,
    page: i64,
    size: i64,
    default_size: i64,
) -> CatalogQueryResult {
    let filtered = search(all, q);
    let (in_park, past): (Vec<_>, Vec<_>) = filtered.into_iter().partition(RedPanda::is_in_park);
    CatalogQueryResult {
        in_park: paginate_partition(sort_by_birth_desc(in_park), page, size, default_size),
        past: paginate_partition(sort_by_birth_desc(past), page, size, default_size),
    }
}

/// Case-insensitive substring filter over name, father, mother, feature and
/// origin zoo. A blank or absent query retains every record.
pub fn search(all: &[RedPanda], q: Option<&str>) -> Vec<RedPanda> {
    let q = q.map(str::trim).unwrap_or("");
    if q.is_empty() {
        return all.to_vec();
    }
    let q = q.to_lowercase();
    all.iter()
        .filter(|p| {
            contains_ci(&p.name, &q)
                || contains_ci(&p.father, &q)
                || contains_ci(&p.mother, &q)
                || contains_ci(&p.feature, &q)
                || contains_ci(&p.origin_zoo, &q)
        })
        .cloned()
        .collect()
}

/// First exact-name match over the unfiltered collection. Name uniqueness
/// is assumed, not enforced.
pub fn find_by_name<'a>(all: &'a [RedPanda], name: &str) -> Option<&'a RedPanda> {
    all.iter().find(|p| p.name == name)
}

fn contains_ci(field: &str, q_lower: &str) -> bool {
    field.to_lowercase().contains(q_lower)
}

/// Sort by birth date descending. Dates are compared parsed, not as raw
/// strings, so an unpadded `2020/1/5` still lands in the right place;
/// blank or unparseable dates sort after every known date.
fn sort_by_birth_desc(mut pandas: Vec<RedPanda>) -> Vec<RedPanda> {
    pandas.sort_by(|a, b| {
        match (derived::parse_date(&a.birth_date), derived::parse_date(&b.birth_date)) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    pandas
}

fn paginate_partition(items: Vec<RedPanda>, page: i64, size: i64, default_size: i64) -> PartitionPage {
    let total = items.len();
    PartitionPage {
        total,
        total_pages: total_pages(total, size, default_size),
        items: paginate(&items, page, size, default_size),
    }
}

/// Zero-based page slice. A negative page clamps to 0, a non-positive size
/// falls back to the default, and a page past the end comes back empty.
pub fn paginate<T: Clone>(items: &[T], page: i64, size: i64, default_size: i64) -> Vec<T> {
    let size = effective_size(size, default_size);
    let page = page.max(0) as usize;
    let from = page.saturating_mul(size).min(items.len());
    let to = (from + size).min(items.len());
    items[from..to].to_vec()
}

/// `ceil(total / size)`; zero items means zero pages.
pub fn total_pages(total: usize, size: i64, default_size: i64) -> u32 {
    let size = effective_size(size, default_size);
    total.div_ceil(size) as u32
}

fn effective_size(size: i64, default_size: i64) -> usize {
    let size = if size <= 0 { default_size } else { size };
    size.max(1) as usize
}
