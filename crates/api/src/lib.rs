mod controller;
pub mod error;
pub mod types;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::config::ApiConfig;
use database::client::DbClient;
use error::AppError;
use serde::Serialize;
use std::net::SocketAddrV4;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    pub db_client: Arc<DbClient>,
    pub chain_id: i64,
    pub chain_name: String,
}

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub items: T,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(self)).into_response()
    }
}

type ApiResult<T> = Result<ApiResponse<T>, AppError>;

fn make_server(state: AppState) -> Router {
    Router::new()
        .route("/health", get(controller::health_check))
        .route("/locks/active", get(controller::get_active_locks))
        .route("/locks/early-burns", get(controller::get_early_burn_locks))
        .route("/stats/wallets/{address}", get(controller::get_wallet_stats))
        .route("/stats/terms", get(controller::get_term_stats))
        .route("/burners/top", get(controller::get_top_burners))
        .with_state(state)
}

pub async fn start_api(db_conn: sea_orm::DatabaseConnection, config: ApiConfig) -> eyre::Result<()> {
    let state = AppState {
        db_client: Arc::new(DbClient::new(db_conn)),
        chain_id: config.chain_id,
        chain_name: config.chain_name.clone(),
    };
    let server = make_server(state);
    let addr = SocketAddrV4::new(std::net::Ipv4Addr::new(0, 0, 0, 0), config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API Server running on {}", addr);
    axum::serve(listener, server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;
    Ok(())
}
