//! Data Transfer Objects
//!
//! Request and response types for the API endpoints. The response field
//! names are the public wire contract inherited from the original dataset
//! publication (Portuguese identifiers like `razao_social`), kept stable so
//! existing consumers keep working; the internal domain types stay English.

use serde::{Deserialize, Serialize};

use crate::aggregate::{OperatorSummary, QuarterExpense, RegionStat, StatisticsSnapshot};
use crate::query::{PageMeta, PageResult};

// ============================================
// OPERATOR DTOs
// ============================================

/// Query-string parameters for the operator listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListOperatorsParams {
    /// Page number, 1-based.
    #[serde(default)]
    pub page: Option<usize>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Search term: corporate name or CNPJ fragment.
    #[serde(default)]
    pub q: Option<String>,
    /// Two-letter UF filter.
    #[serde(default)]
    pub uf: Option<String>,
}

/// One operator in a listing.
#[derive(Debug, Serialize)]
pub struct OperatorDto {
    pub cnpj: String,
    pub razao_social: String,
    pub registro_ans: Option<String>,
    pub modalidade: Option<String>,
    pub uf: Option<String>,
    pub total_despesas: f64,
}

impl From<&OperatorSummary> for OperatorDto {
    fn from(op: &OperatorSummary) -> Self {
        Self {
            cnpj: op.cnpj.clone(),
            razao_social: op.corporate_name.clone(),
            registro_ans: op.ans_registry_id.clone(),
            modalidade: op.modality.clone(),
            uf: op.region.clone(),
            total_despesas: op.total_expenses,
        }
    }
}

/// Full operator detail.
#[derive(Debug, Serialize)]
pub struct OperatorDetailDto {
    pub cnpj: String,
    pub razao_social: String,
    pub registro_ans: Option<String>,
    pub modalidade: Option<String>,
    pub uf: Option<String>,
    pub total_despesas: f64,
    pub quantidade_trimestres: usize,
}

impl From<OperatorSummary> for OperatorDetailDto {
    fn from(op: OperatorSummary) -> Self {
        Self {
            cnpj: op.cnpj,
            razao_social: op.corporate_name,
            registro_ans: op.ans_registry_id,
            modalidade: op.modality,
            uf: op.region,
            total_despesas: op.total_expenses,
            quantidade_trimestres: op.quarter_count,
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize)]
pub struct PaginationMetaDto {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<&PageMeta> for PaginationMetaDto {
    fn from(meta: &PageMeta) -> Self {
        Self {
            total: meta.total,
            page: meta.page,
            limit: meta.limit,
            pages: meta.page_count,
            has_next: meta.has_next,
            has_prev: meta.has_prev,
        }
    }
}

/// Paginated operator listing.
#[derive(Debug, Serialize)]
pub struct OperatorPageDto {
    pub data: Vec<OperatorDto>,
    pub meta: PaginationMetaDto,
}

impl From<&PageResult> for OperatorPageDto {
    fn from(page: &PageResult) -> Self {
        Self {
            data: page.items.iter().map(OperatorDto::from).collect(),
            meta: PaginationMetaDto::from(&page.meta),
        }
    }
}

/// One quarter in an operator's expense history.
#[derive(Debug, Serialize)]
pub struct ExpenseHistoryDto {
    pub trimestre: String,
    pub ano: i32,
    pub valor_despesas: f64,
}

impl From<QuarterExpense> for ExpenseHistoryDto {
    fn from(entry: QuarterExpense) -> Self {
        Self {
            trimestre: entry.quarter,
            ano: entry.year,
            valor_despesas: entry.expense_amount,
        }
    }
}

// ============================================
// STATISTICS DTOs
// ============================================

/// One operator in the top-5 ranking.
#[derive(Debug, Serialize)]
pub struct TopOperatorDto {
    pub cnpj: String,
    pub razao_social: String,
    pub total_despesas: f64,
    pub uf: Option<String>,
}

/// Per-UF expense distribution entry.
#[derive(Debug, Serialize)]
pub struct RegionDistributionDto {
    pub uf: String,
    pub total: f64,
    pub quantidade_operadoras: usize,
    pub percentual: f64,
}

impl From<&RegionStat> for RegionDistributionDto {
    fn from(stat: &RegionStat) -> Self {
        Self {
            uf: stat.region.clone(),
            total: stat.total,
            quantidade_operadoras: stat.operator_count,
            percentual: stat.percent_of_total,
        }
    }
}

/// Global statistics response.
#[derive(Debug, Serialize)]
pub struct StatisticsDto {
    pub total_despesas: f64,
    pub media_despesas: f64,
    pub total_operadoras: usize,
    pub top_5_operadoras: Vec<TopOperatorDto>,
    pub distribuicao_por_uf: Vec<RegionDistributionDto>,
}

impl From<&StatisticsSnapshot> for StatisticsDto {
    fn from(stats: &StatisticsSnapshot) -> Self {
        Self {
            total_despesas: stats.total_expenses,
            media_despesas: stats.average_expense,
            total_operadoras: stats.operator_count,
            top_5_operadoras: stats
                .top5
                .iter()
                .map(|op| TopOperatorDto {
                    cnpj: op.cnpj.clone(),
                    razao_social: op.corporate_name.clone(),
                    total_despesas: op.total_expenses,
                    uf: op.region.clone(),
                })
                .collect(),
            distribuicao_por_uf: stats
                .region_distribution
                .iter()
                .map(RegionDistributionDto::from)
                .collect(),
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub dataset: String,
    pub uptime_seconds: u64,
    pub version: String,
}
