//! Query parameters, sorting and pagination utilities

use crate::core::compare::{field_date, field_number};
use crate::core::condition::{Condition, valid_conditions};
use crate::core::error::ValidationError;
use crate::core::field::FieldValue;
use crate::core::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Query parameters for listing, searching and filtering
///
/// # Example
/// ```text
/// GET /contacts?page=2&limit=10
/// GET /contacts?q=acme
/// GET /deals?filter=[{"field":"value","operator":"greater","value":"1000"}]&sort=value:desc
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: Option<usize>,

    /// Free-text search over the entity's indexed fields
    pub q: Option<String>,

    /// Conditions as a JSON array of `{field, operator, value}`
    pub filter: Option<String>,

    /// Sort field and direction
    ///
    /// # Format
    /// - `field:asc` or `field` (ascending)
    /// - `field:desc` (descending)
    pub sort: Option<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: None,
            q: None,
            filter: None,
            sort: None,
        }
    }
}

/// Page size when none is requested
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page size a client may request
pub const MAX_LIMIT: usize = 100;

impl QueryParams {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Get limit, falling back to `default` and clamped to `[1, max]`
    pub fn limit(&self, default: usize, max: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, max.max(1))
    }

    /// Parse the `filter` parameter, dropping invalid conditions
    pub fn conditions(&self) -> Result<Vec<Condition>, ValidationError> {
        let Some(raw) = self.filter.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(Vec::new());
        };
        let conditions: Vec<Condition> =
            serde_json::from_str(raw).map_err(|e| ValidationError::InvalidJson {
                message: format!("filter: {}", e),
            })?;
        Ok(valid_conditions(&conditions))
    }

    /// Parse the `sort` parameter
    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort.as_deref().and_then(SortSpec::parse)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A parsed `field[:asc|desc]` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn parse(expr: &str) -> Option<Self> {
        let (field, direction) = match expr.split_once(':') {
            Some((field, dir)) if dir.eq_ignore_ascii_case("desc") => (field, SortDirection::Desc),
            Some((field, _)) => (field, SortDirection::Asc),
            None => (expr, SortDirection::Asc),
        };
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }

    /// Sort records in place; the sort is stable and missing values sort last
    pub fn apply<R: Record>(&self, records: &mut [R]) {
        records.sort_by(|a, b| {
            let left = a.field(&self.field).filter(|v| !v.is_null());
            let right = b.field(&self.field).filter(|v| !v.is_null());
            match (left, right) {
                (Some(l), Some(r)) => {
                    let ordering = compare_values(&l, &r);
                    match self.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    }
}

/// Order two field values: numerically, then by date, then by lower-cased text
fn compare_values(left: &FieldValue, right: &FieldValue) -> Ordering {
    let numeric = |v: &FieldValue| matches!(v, FieldValue::Integer(_) | FieldValue::Float(_));
    if numeric(left) && numeric(right) {
        if let (Some(l), Some(r)) = (field_number(left), field_number(right)) {
            return l.partial_cmp(&r).unwrap_or(Ordering::Equal);
        }
    }
    let dated = |v: &FieldValue| matches!(v, FieldValue::DateTime(_));
    if dated(left) || dated(right) {
        if let (Some(l), Some(r)) = (field_date(left), field_date(right)) {
            return l.cmp(&r);
        }
    }
    left.to_text()
        .to_lowercase()
        .cmp(&right.to_text().to_lowercase())
}

/// Paginated response structure
///
/// This structure wraps paginated data with metadata about pagination state.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// The paginated data
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    /// Cut one page out of `items`
    pub fn paginate(items: Vec<T>, page: usize, limit: usize) -> Self {
        let meta = PaginationMeta::new(page, limit, items.len());
        let start = meta.offset();
        let data = items.into_iter().skip(start).take(meta.limit).collect();
        Self {
            data,
            pagination: meta,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    pub has_next: bool,

    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = page.saturating_sub(1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }

    /// Number of items before this page, saturating for huge page numbers
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}
