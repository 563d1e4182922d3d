//! Aggregator
//!
//! Pure functions deriving per-operator summaries, expense histories and the
//! global statistics snapshot from the current [`Snapshot`]. Nothing here
//! holds state or performs I/O; callers pass the snapshot they want a
//! consistent view of.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::store::Snapshot;

/// Derived view of one operator: identity fields from the first record seen
/// for its CNPJ (snapshot order), totals summed across all of its records.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OperatorSummary {
    pub cnpj: String,
    pub corporate_name: String,
    pub ans_registry_id: Option<String>,
    pub modality: Option<String>,
    pub region: Option<String>,
    pub total_expenses: f64,
    pub quarter_count: usize,
}

/// One history entry for an operator.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuarterExpense {
    pub quarter: String,
    pub year: i32,
    pub expense_amount: f64,
}

/// Expense breakdown for one region (UF).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegionStat {
    pub region: String,
    pub total: f64,
    pub operator_count: usize,
    pub percent_of_total: f64,
}

/// Full-dataset statistics. Expensive to compute; cached by the service
/// layer under a fixed key.
#[derive(Debug, Clone, Serialize, Default)]
pub struct StatisticsSnapshot {
    /// Sum of all expense amounts.
    pub total_expenses: f64,
    /// Mean expense amount across records (not across operators).
    pub average_expense: f64,
    /// Number of distinct CNPJs in the snapshot.
    pub operator_count: usize,
    /// At most five operators ranked by total expenses descending,
    /// CNPJ ascending on ties.
    pub top5: Vec<OperatorSummary>,
    /// Per-region totals, descending, rows without a region excluded.
    pub region_distribution: Vec<RegionStat>,
}

/// Group the snapshot into one [`OperatorSummary`] per distinct CNPJ,
/// preserving first-seen order.
pub fn summarize_all(snapshot: &Snapshot) -> Vec<OperatorSummary> {
    let mut by_cnpj: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<OperatorSummary> = Vec::new();

    for record in &snapshot.records {
        match by_cnpj.get(record.cnpj.as_str()) {
            Some(&idx) => {
                let summary = &mut summaries[idx];
                summary.total_expenses += record.expense_amount;
                summary.quarter_count += 1;
            }
            None => {
                by_cnpj.insert(record.cnpj.as_str(), summaries.len());
                summaries.push(OperatorSummary {
                    cnpj: record.cnpj.clone(),
                    corporate_name: record.corporate_name.clone(),
                    ans_registry_id: record.ans_registry_id.clone(),
                    modality: record.modality.clone(),
                    region: record.region.clone(),
                    total_expenses: record.expense_amount,
                    quarter_count: 1,
                });
            }
        }
    }

    summaries
}

/// Summarize a single operator. `cnpj` must already be normalized.
/// Returns `None` when no record matches.
pub fn summarize_operator(snapshot: &Snapshot, cnpj: &str) -> Option<OperatorSummary> {
    let mut summary: Option<OperatorSummary> = None;

    for record in snapshot.records.iter().filter(|r| r.cnpj == cnpj) {
        match summary.as_mut() {
            Some(s) => {
                s.total_expenses += record.expense_amount;
                s.quarter_count += 1;
            }
            None => {
                summary = Some(OperatorSummary {
                    cnpj: record.cnpj.clone(),
                    corporate_name: record.corporate_name.clone(),
                    ans_registry_id: record.ans_registry_id.clone(),
                    modality: record.modality.clone(),
                    region: record.region.clone(),
                    total_expenses: record.expense_amount,
                    quarter_count: 1,
                });
            }
        }
    }

    summary
}

/// All history entries for an operator, ascending by `(year, quarter)`.
///
/// The quarter label is compared lexically, matching the upstream pipeline's
/// ordering of labels like `"1T2023"`. `cnpj` must already be normalized.
pub fn history_of(snapshot: &Snapshot, cnpj: &str) -> Vec<QuarterExpense> {
    let mut history: Vec<QuarterExpense> = snapshot
        .records
        .iter()
        .filter(|r| r.cnpj == cnpj)
        .map(|r| QuarterExpense {
            quarter: r.quarter.clone(),
            year: r.year,
            expense_amount: r.expense_amount,
        })
        .collect();

    history.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.quarter.cmp(&b.quarter)));
    history
}

/// Compute the full-dataset statistics in one pass over the records plus a
/// pass over the derived summaries. An empty snapshot yields all-zero
/// numbers and empty lists.
pub fn compute_statistics(snapshot: &Snapshot) -> StatisticsSnapshot {
    if snapshot.is_empty() {
        return StatisticsSnapshot::default();
    }

    let total_expenses: f64 = snapshot.records.iter().map(|r| r.expense_amount).sum();
    let average_expense = total_expenses / snapshot.len() as f64;

    let mut summaries = summarize_all(snapshot);
    let operator_count = summaries.len();

    summaries.sort_by(|a, b| {
        descending(a.total_expenses, b.total_expenses).then_with(|| a.cnpj.cmp(&b.cnpj))
    });
    summaries.truncate(5);

    StatisticsSnapshot {
        total_expenses,
        average_expense,
        operator_count,
        top5: summaries,
        region_distribution: region_distribution(snapshot, total_expenses),
    }
}

/// Per-region totals and operator counts, records without a region excluded.
fn region_distribution(snapshot: &Snapshot, total_expenses: f64) -> Vec<RegionStat> {
    let mut by_region: BTreeMap<&str, (f64, HashSet<&str>)> = BTreeMap::new();

    for record in &snapshot.records {
        let Some(region) = record.region.as_deref().filter(|r| !r.is_empty()) else {
            continue;
        };
        let entry = by_region.entry(region).or_default();
        entry.0 += record.expense_amount;
        entry.1.insert(record.cnpj.as_str());
    }

    let mut distribution: Vec<RegionStat> = by_region
        .into_iter()
        .map(|(region, (total, cnpjs))| RegionStat {
            region: region.to_string(),
            total,
            operator_count: cnpjs.len(),
            percent_of_total: if total_expenses > 0.0 {
                round2(total / total_expenses * 100.0)
            } else {
                0.0
            },
        })
        .collect();

    // BTreeMap already gave region-ascending order, so this sort only needs
    // to be stable to keep that as the tie-break.
    distribution.sort_by(|a, b| descending(a.total, b.total));
    distribution
}

/// Descending order for expense totals. NaN never occurs in loaded data
/// (coercion failures default to zero), so equal ordering is a safe fallback.
fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
