//! Statistics Routes
//!
//! - GET /api/estatisticas - Global dataset statistics
//!
//! The response is served from the TTL cache and may lag a dataset reload
//! by up to the configured TTL.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::StatisticsDto;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/estatisticas
///
/// Total and mean expenses, distinct operator count, top-5 ranking and
/// per-UF distribution. Always succeeds; an empty dataset yields zeros and
/// empty lists.
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StatisticsDto>> {
    let stats = state.service.get_statistics()?;
    Ok(Json(StatisticsDto::from(stats.as_ref())))
}
