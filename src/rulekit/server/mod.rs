// SPDX-License-Identifier: MIT

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::engine::{DataRecord, RuleError};
use crate::rulekit::registry::RuleRegistry;
use crate::rulekit::storage;

#[derive(Clone)]
pub struct AppState {
    pub registry: RuleRegistry,
    pub default_record: DataRecord,
}

/// Error response wrapper mapping rule errors onto HTTP statuses
pub struct ApiError(RuleError);

impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(RuleError::invalid_input(rejection.body_text()))
    }
}

/// Unwrap a JSON body, turning axum's rejection into the API error shape
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(ApiError::from)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            RuleError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input".to_string()),
            RuleError::RuleNotFound { .. } => (StatusCode::NOT_FOUND, self.0.to_string()),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };
        log::warn!("Request failed ({}): {}", status, self.0);
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/create_rule", post(create_rule))
        .route("/api/combine_rules", post(combine_rules))
        .route("/api/evaluate_rule", post(evaluate_rule))
        .route("/api/rules", get(list_rules).delete(clear_rules))
        .route("/api/rules/{name}", delete(delete_rule))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C, then save the registry to `rules_file`
pub async fn serve(
    state: AppState,
    port: u16,
    rules_file: PathBuf,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let registry = state.registry.clone();
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    save_on_exit(served, &rules_file, &registry).await
}

/// Save the registry however the server stopped, then report the serve result
pub async fn save_on_exit<E>(
    served: Result<(), E>,
    rules_file: &std::path::Path,
    registry: &RuleRegistry,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    if let Err(e) = &served {
        log::error!("Server stopped with error: {}", e);
    }

    log::info!("Shutting down, saving rules to {:?}", rules_file);
    storage::save_from(rules_file, registry).await?;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct CreateRuleRequest {
    name: Option<String>,
    rule: Option<String>,
}

async fn create_rule(
    State(state): State<AppState>,
    payload: Result<Json<CreateRuleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = json_body(payload)?;
    let name = payload.name.unwrap_or_default();
    let rule = payload.rule.unwrap_or_default();
    state.registry.create_rule(&name, &rule).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("Rule '{}' created!", name) })),
    ))
}

#[derive(Deserialize)]
struct CombineRulesRequest {
    name: Option<String>,
    rules: Option<Vec<String>>,
    operator: Option<String>,
}

async fn combine_rules(
    State(state): State<AppState>,
    payload: Result<Json<CombineRulesRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = json_body(payload)?;
    let name = payload.name.unwrap_or_default();
    let rules = payload.rules.unwrap_or_default();
    let operator = payload.operator.unwrap_or_default();
    state
        .registry
        .combine_rules(&name, &rules, &operator)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("Combined rule '{}' created!", name) })),
    ))
}

#[derive(Deserialize)]
struct EvaluateRuleRequest {
    name: Option<String>,
    data: Option<DataRecord>,
}

async fn evaluate_rule(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRuleRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let payload = json_body(payload)?;
    let name = payload.name.unwrap_or_default();
    let record = payload.data.as_ref().unwrap_or(&state.default_record);
    let result = state.registry.evaluate_rule(&name, record).await?;
    Ok(Json(json!({ "result": result })))
}

async fn list_rules(State(state): State<AppState>) -> Json<Value> {
    let rules: Vec<Value> = state
        .registry
        .snapshot()
        .await
        .into_iter()
        .map(|(name, tree)| json!({ "name": name, "rule": tree.to_string() }))
        .collect();
    Json(json!(rules))
}

async fn delete_rule(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .registry
        .remove(&name)
        .await
        .ok_or_else(|| RuleError::rule_not_found(name.as_str()))?;
    log::info!("Rule '{}' deleted", name);
    Ok(Json(json!({ "message": format!("Rule '{}' deleted.", name) })))
}

async fn clear_rules(State(state): State<AppState>) -> Json<Value> {
    state.registry.clear().await;
    log::info!("All rules cleared");
    Json(json!({ "message": "All rules cleared." }))
}
