//! HTTP server for the payout signer.
//!
//! Exposes the signing endpoint at `POST /api/permits`, also mounted at
//! `POST /` for existing clients, plus a `GET /health` probe.

use axum::{
	extract::{rejection::JsonRejection, DefaultBodyLimit, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use payout_config::ApiConfig;
use payout_core::PermitService;
use payout_types::{APIError, SignRequest, SignResponse};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub service: Arc<PermitService>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
	status: &'static str,
	owner: String,
	chain_id: u64,
}

/// Builds the router.
pub fn router(service: Arc<PermitService>, max_request_size: usize) -> Router {
	Router::new()
		.route("/", post(handle_sign))
		.route("/health", get(handle_health))
		.nest("/api", Router::new().route("/permits", post(handle_sign)))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive())
				.layer(DefaultBodyLimit::max(max_request_size)),
		)
		.with_state(AppState { service })
}

/// Serves the API until ctrl-c.
pub async fn start_server(
	api_config: ApiConfig,
	service: Arc<PermitService>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(service, api_config.max_request_size);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Payout signer API listening on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				tracing::warn!("Failed to listen for shutdown signal: {}", e);
			}
		})
		.await?;

	Ok(())
}

/// Handles POST /api/permits and POST / requests.
async fn handle_sign(
	State(state): State<AppState>,
	payload: Result<Json<SignRequest>, JsonRejection>,
) -> Result<Json<SignResponse>, APIError> {
	let Json(request) = payload.map_err(|rejection| {
		tracing::debug!("Rejected request body: {}", rejection);
		if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
			return APIError::PayloadTooLarge {
				error_type: "PAYLOAD_TOO_LARGE".to_string(),
				message: rejection.body_text(),
			};
		}
		APIError::BadRequest {
			error_type: "INVALID_REQUEST".to_string(),
			message: rejection.body_text(),
		}
	})?;

	match crate::apis::permit::process_sign_request(request, &state.service).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Sign request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /health requests.
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		owner: state.service.owner().to_string(),
		chain_id: state.service.token().chain_id,
	})
}
