use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::instrument;

use crate::{
    error::AppError,
    types::{
        HealthResponse, LimitParams, LockResponse, MetricsSnapshot, TermStatsResponse,
        WalletStatsResponse,
    },
    ApiResponse, ApiResult, AppState,
};
use common::indexer::STALE_AFTER;

const DEFAULT_LIMIT: u64 = 100;

/// 200 while the checkpoint is moving, 503 once it has not advanced for
/// [`STALE_AFTER`] (or never existed). Load balancers key off the status.
#[instrument(skip_all)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>), AppError> {
    let checkpoint = state.db_client.get_checkpoint(state.chain_id).await?;
    let metrics = state
        .db_client
        .latest_metrics(state.chain_id)
        .await?
        .map(MetricsSnapshot::from);

    let (status_code, status, last_indexed_block, last_indexed_at) = match checkpoint {
        Some(cp) => {
            let age = Utc::now() - cp.last_indexed_at;
            if age.num_seconds() > STALE_AFTER.as_secs() as i64 {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "stalled",
                    Some(cp.last_indexed_block),
                    Some(cp.last_indexed_at),
                )
            } else {
                (
                    StatusCode::OK,
                    "ok",
                    Some(cp.last_indexed_block),
                    Some(cp.last_indexed_at),
                )
            }
        }
        None => (StatusCode::SERVICE_UNAVAILABLE, "stalled", None, None),
    };

    let body = HealthResponse {
        status: status.to_string(),
        chain_id: state.chain_id,
        chain_name: state.chain_name.clone(),
        last_indexed_block,
        last_indexed_at,
        metrics,
    };
    Ok((status_code, Json(body)))
}

#[instrument(skip(state))]
pub async fn get_active_locks(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<LockResponse>> {
    let locks = state
        .db_client
        .active_locks(state.chain_id, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(ApiResponse {
        success: true,
        items: locks.into_iter().map(LockResponse::from).collect(),
    })
}

#[instrument(skip(state))]
pub async fn get_early_burn_locks(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<LockResponse>> {
    let locks = state
        .db_client
        .early_burn_locks(state.chain_id, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(ApiResponse {
        success: true,
        items: locks.into_iter().map(LockResponse::from).collect(),
    })
}

#[instrument(skip(state), fields(address = %address))]
pub async fn get_wallet_stats(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<WalletStatsResponse> {
    // Stored wallets are lower-case hex; accept checksummed input.
    let address = address.to_lowercase();
    let stats = state
        .db_client
        .wallet_stats(&address, state.chain_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No stats for wallet {}", address)))?;
    Ok(ApiResponse {
        success: true,
        items: WalletStatsResponse::from(stats),
    })
}

#[instrument(skip(state))]
pub async fn get_term_stats(State(state): State<AppState>) -> ApiResult<Vec<TermStatsResponse>> {
    let stats = state.db_client.term_stats(state.chain_id).await?;
    Ok(ApiResponse {
        success: true,
        items: stats.into_iter().map(TermStatsResponse::from).collect(),
    })
}

#[instrument(skip(state))]
pub async fn get_top_burners(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<WalletStatsResponse>> {
    let wallets = state
        .db_client
        .top_burners(state.chain_id, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(ApiResponse {
        success: true,
        items: wallets.into_iter().map(WalletStatsResponse::from).collect(),
    })
}
