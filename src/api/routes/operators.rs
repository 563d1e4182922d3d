//! Operator Routes
//!
//! - GET /api/operadoras - List operators, paginated and filterable
//! - GET /api/operadoras/:cnpj - Operator detail
//! - GET /api/operadoras/:cnpj/despesas - Operator expense history

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    ExpenseHistoryDto, ListOperatorsParams, OperatorDetailDto, OperatorPageDto,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/operadoras
///
/// Lists operators sorted by total expenses, with optional search (`q`)
/// and UF filter (`uf`). Rejects out-of-bounds pagination parameters
/// before they reach the core.
pub async fn list_operators(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListOperatorsParams>,
) -> ApiResult<Json<OperatorPageDto>> {
    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(state.config.default_page_size);

    if page < 1 {
        return Err(ApiError::Validation("page must be >= 1".to_string()));
    }
    if limit < 1 || limit > state.config.max_page_size {
        return Err(ApiError::Validation(format!(
            "limit must be between 1 and {}",
            state.config.max_page_size
        )));
    }
    if let Some(uf) = params.uf.as_deref() {
        if uf.len() != 2 {
            return Err(ApiError::Validation(
                "uf must be a 2-letter state code".to_string(),
            ));
        }
    }

    let result = state
        .service
        .list_operators(page, limit, params.q.as_deref(), params.uf.as_deref())?;

    Ok(Json(OperatorPageDto::from(&result)))
}

/// GET /api/operadoras/:cnpj
///
/// Operator detail by CNPJ, formatted or bare. 404 when unknown.
pub async fn get_operator(
    State(state): State<Arc<AppState>>,
    Path(cnpj): Path<String>,
) -> ApiResult<Json<OperatorDetailDto>> {
    let operator = state
        .service
        .get_operator(&cnpj)?
        .ok_or_else(|| ApiError::NotFound(format!("operator with CNPJ {} not found", cnpj)))?;

    Ok(Json(OperatorDetailDto::from(operator)))
}

/// GET /api/operadoras/:cnpj/despesas
///
/// Quarterly expense history, oldest first. Existence is confirmed first so
/// an unknown operator is a 404 rather than an empty list.
pub async fn get_operator_history(
    State(state): State<Arc<AppState>>,
    Path(cnpj): Path<String>,
) -> ApiResult<Json<Vec<ExpenseHistoryDto>>> {
    if state.service.get_operator(&cnpj)?.is_none() {
        return Err(ApiError::NotFound(format!(
            "operator with CNPJ {} not found",
            cnpj
        )));
    }

    let history = state.service.get_operator_history(&cnpj)?;
    Ok(Json(history.into_iter().map(ExpenseHistoryDto::from).collect()))
}
