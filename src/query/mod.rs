//! Query Engine
//!
//! Applies search and region predicates over the derived operator
//! summaries, sorts them deterministically and paginates the result into a
//! page + metadata envelope. Lookup operations normalize the CNPJ before
//! delegating to the aggregator.

use serde::Serialize;

use crate::aggregate::{self, OperatorSummary, QuarterExpense};
use crate::store::{normalize_cnpj, Snapshot};

/// Upper bound on page size, mirrored by the boundary-layer validation.
pub const MAX_PAGE_SIZE: usize = 100;

/// Pagination metadata for a listing. `total` counts the filtered sequence
/// before slicing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageMeta {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub page_count: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One page of operator summaries plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub items: Vec<OperatorSummary>,
    pub meta: PageMeta,
}

/// List operators: group, filter, sort, paginate.
///
/// Filters:
/// * `search` — case-insensitive substring match on the corporate name, OR
///   raw substring match on the CNPJ digits.
/// * `region` — case-insensitive exact match on the UF code.
///
/// Order: `total_expenses` descending, CNPJ ascending on ties. A page past
/// the end yields empty `items`, never an error. Inputs arrive
/// pre-validated from the boundary layer, but out-of-range values are
/// clamped here anyway (`page >= 1`, `1 <= limit <= MAX_PAGE_SIZE`) so a
/// misuse cannot panic the slice arithmetic.
pub fn list_operators(
    snapshot: &Snapshot,
    page: usize,
    limit: usize,
    search: Option<&str>,
    region: Option<&str>,
) -> PageResult {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);

    let mut operators = aggregate::summarize_all(snapshot);

    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let term_lower = term.to_lowercase();
        operators.retain(|op| {
            op.corporate_name.to_lowercase().contains(&term_lower) || op.cnpj.contains(term)
        });
    }

    if let Some(uf) = region.map(str::trim).filter(|u| !u.is_empty()) {
        operators.retain(|op| {
            op.region
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(uf))
        });
    }

    operators.sort_by(|a, b| {
        b.total_expenses
            .partial_cmp(&a.total_expenses)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cnpj.cmp(&b.cnpj))
    });

    let total = operators.len();
    let page_count = page_count(total, limit);
    let start = (page - 1).saturating_mul(limit);

    let items: Vec<OperatorSummary> = operators.into_iter().skip(start).take(limit).collect();

    PageResult {
        items,
        meta: PageMeta {
            total,
            page,
            limit,
            page_count,
            has_next: page < page_count,
            has_prev: page > 1,
        },
    }
}

/// Find one operator by CNPJ in any accepted format.
pub fn find_operator(snapshot: &Snapshot, cnpj: &str) -> Option<OperatorSummary> {
    aggregate::summarize_operator(snapshot, &normalize_cnpj(cnpj))
}

/// Expense history for one operator by CNPJ in any accepted format.
pub fn history_for(snapshot: &Snapshot, cnpj: &str) -> Vec<QuarterExpense> {
    aggregate::history_of(snapshot, &normalize_cnpj(cnpj))
}

/// `ceil(total / limit)`, but at least 1 so page 1 always exists.
fn page_count(total: usize, limit: usize) -> usize {
    total.div_ceil(limit).max(1)
}
