//! CSV loading for the expense dataset.
//!
//! Reads the semicolon-separated consolidated expense file produced by the
//! upstream transformation pipeline and maps each row to an
//! [`ExpenseRecord`]. Header names are normalized once here so the rest of
//! the crate works against a fixed field contract.

use std::path::Path;

use tracing::{debug, warn};

use super::types::{normalize_cnpj, ExpenseRecord, Snapshot};
use super::StoreError;

/// Normalize a header name: lowercase, whitespace and underscores removed.
///
/// `"Razao Social"`, `"razao_social"` and `"RazaoSocial"` all map to
/// `"razaosocial"`.
fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Column indices resolved from the normalized header row.
struct ColumnMap {
    cnpj: usize,
    corporate_name: usize,
    quarter: usize,
    year: usize,
    amount: usize,
    registry: Option<usize>,
    modality: Option<usize>,
    region: Option<usize>,
}

impl ColumnMap {
    /// Resolve the fixed field contract against a header row.
    ///
    /// The five core columns are required; registry, modality and region are
    /// optional and simply yield `None` fields when absent.
    fn detect(headers: &csv::StringRecord) -> Result<Self, StoreError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| normalize_header(h) == name)
        };
        let require = |name: &'static str| find(name).ok_or(StoreError::MissingColumn(name));

        Ok(Self {
            cnpj: require("cnpj")?,
            corporate_name: require("razaosocial")?,
            quarter: require("trimestre")?,
            year: require("ano")?,
            amount: require("valordespesas")?,
            registry: find("registroans"),
            modality: find("modalidade"),
            region: find("uf"),
        })
    }
}

/// Load the snapshot from `path`.
///
/// An absent file is not an error: it degrades to an empty snapshot and
/// every downstream query returns empty results. Structural failures (an
/// unreadable file, a CSV-level record error, a missing required column)
/// surface as [`StoreError`]. Rows whose individual values fail coercion
/// are kept with untyped-safe defaults (`None` text fields, `0` numerics).
pub fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    if !path.exists() {
        warn!("expense source not found at {}, serving empty dataset", path.display());
        return Ok(Snapshot::empty());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::detect(&headers)?;

    let mut records = Vec::new();
    let mut rows_defaulted = 0usize;

    for result in reader.records() {
        let row = result?;
        let (record, defaulted) = map_row(&row, &columns);
        if defaulted {
            rows_defaulted += 1;
        }
        records.push(record);
    }

    debug!(
        rows = records.len(),
        rows_defaulted,
        "loaded expense snapshot from {}",
        path.display()
    );

    Ok(Snapshot { records })
}

/// Map one CSV row to a record. Returns the record plus whether any numeric
/// field fell back to its default.
fn map_row(row: &csv::StringRecord, columns: &ColumnMap) -> (ExpenseRecord, bool) {
    let text = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();
    let optional = |idx: Option<usize>| {
        idx.map(|i| text(i)).filter(|s| !s.is_empty())
    };

    let (year, year_ok) = match text(columns.year).parse::<i32>() {
        Ok(y) => (y, true),
        Err(_) => (0, false),
    };
    let (amount, amount_ok) = parse_amount(&text(columns.amount));

    let record = ExpenseRecord {
        cnpj: normalize_cnpj(&text(columns.cnpj)),
        corporate_name: text(columns.corporate_name),
        ans_registry_id: optional(columns.registry),
        quarter: text(columns.quarter),
        year,
        region: optional(columns.region),
        modality: optional(columns.modality),
        expense_amount: amount,
    };

    (record, !year_ok || !amount_ok)
}

/// Parse an expense amount, accepting both `1234.56` and the Brazilian
/// comma decimal `1234,56`. Empty or unparseable values default to `0.0`.
fn parse_amount(raw: &str) -> (f64, bool) {
    if raw.is_empty() {
        return (0.0, false);
    }
    if let Ok(v) = raw.parse::<f64>() {
        return (v, true);
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(v) => (v, true),
        Err(_) => (0.0, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    const HEADER: &str = "CNPJ;RazaoSocial;RegistroANS;Modalidade;UF;Trimestre;Ano;ValorDespesas\n";

    #[test]
    fn test_load_basic_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "despesas.csv",
            &format!(
                "{HEADER}11111111000100;Operadora Alfa;12345;Cooperativa;SP;1T2023;2023;100.50\n\
                 22222222000100;Operadora Beta;67890;Medicina de Grupo;RJ;1T2023;2023;200.00\n"
            ),
        );

        let snap = load_snapshot(&path).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.records[0].cnpj, "11111111000100");
        assert_eq!(snap.records[0].corporate_name, "Operadora Alfa");
        assert_eq!(snap.records[0].ans_registry_id.as_deref(), Some("12345"));
        assert_eq!(snap.records[0].region.as_deref(), Some("SP"));
        assert_eq!(snap.records[0].year, 2023);
        assert!((snap.records[0].expense_amount - 100.50).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let snap = load_snapshot(&dir.path().join("absent.csv")).unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn test_header_normalization_variants() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "despesas.csv",
            "cnpj;Razao Social;registro_ans;modalidade;uf;trimestre;ano;Valor Despesas\n\
             11111111000100;Alfa;1;Coop;SP;1T2023;2023;10\n",
        );

        let snap = load_snapshot(&path).unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.records[0].corporate_name, "Alfa");
        assert!((snap.records[0].expense_amount - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_required_column_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "despesas.csv",
            "RazaoSocial;Trimestre;Ano;ValorDespesas\nAlfa;1T2023;2023;10\n",
        );

        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn("cnpj")));
    }

    #[test]
    fn test_cnpj_normalized_at_load() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "despesas.csv",
            &format!("{HEADER}11.111.111/0001-00;Alfa;;;SP;1T2023;2023;10\n"),
        );

        let snap = load_snapshot(&path).unwrap();
        assert_eq!(snap.records[0].cnpj, "11111111000100");
    }

    #[test]
    fn test_malformed_values_default_instead_of_dropping_row() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "despesas.csv",
            &format!(
                "{HEADER}11111111000100;Alfa;;;;1T2023;not-a-year;not-a-number\n\
                 22222222000100;Beta;;;RJ;1T2023;2023;50\n"
            ),
        );

        let snap = load_snapshot(&path).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.records[0].year, 0);
        assert_eq!(snap.records[0].expense_amount, 0.0);
        assert!(snap.records[0].region.is_none());
        assert_eq!(snap.records[1].year, 2023);
    }

    #[test]
    fn test_comma_decimal_amounts() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "despesas.csv",
            &format!("{HEADER}11111111000100;Alfa;;;SP;1T2023;2023;1234,56\n"),
        );

        let snap = load_snapshot(&path).unwrap();
        assert!((snap.records[0].expense_amount - 1234.56).abs() < 1e-9);
    }

    #[test]
    fn test_empty_optional_fields_are_none() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "despesas.csv",
            &format!("{HEADER}11111111000100;Alfa;;;;1T2023;2023;10\n"),
        );

        let snap = load_snapshot(&path).unwrap();
        let rec = &snap.records[0];
        assert!(rec.ans_registry_id.is_none());
        assert!(rec.modality.is_none());
        assert!(rec.region.is_none());
    }
}
