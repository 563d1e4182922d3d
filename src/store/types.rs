//! Core record types for the expense dataset.

/// One expense row: a single operator in a single fiscal quarter.
///
/// Rows are populated once at load time with explicit nullable fields, so
/// downstream aggregation never does per-query type coercion. Duplicate
/// `(cnpj, quarter, year)` combinations are tolerated in the source data;
/// aggregation sums them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    /// Operator tax ID, normalized to digits only (no punctuation).
    pub cnpj: String,
    /// Corporate (legal) name of the operator.
    pub corporate_name: String,
    /// ANS registry number, when present in the source.
    pub ans_registry_id: Option<String>,
    /// Quarter label, e.g. `"1T2023"`. Compared lexically, not as a date.
    pub quarter: String,
    /// Fiscal year.
    pub year: i32,
    /// Two-letter state code (UF), when present.
    pub region: Option<String>,
    /// Operator modality category, when present.
    pub modality: Option<String>,
    /// Expense amount for the quarter. Not validated at load time; a value
    /// that fails coercion is stored as `0.0`.
    pub expense_amount: f64,
}

/// The in-memory, immutable-until-reload set of expense records.
///
/// Record order is the source load order. First-seen derivations (corporate
/// name, registry id, region for an operator) depend on that order being
/// stable, so the snapshot never reorders rows.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub records: Vec<ExpenseRecord>,
}

impl Snapshot {
    /// Snapshot with no records. Absent source files degrade to this.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Strip everything but digits from a CNPJ, so formatted
/// (`12.345.678/0001-99`) and bare (`12345678000199`) inputs compare equal.
pub fn normalize_cnpj(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
