//! API handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use metrics::counter;
use serde::{Deserialize, Serialize};

use ironwall_core::metrics as m;
use ironwall_rule_engine::{LogEntry, PacketSpec, Rule, RuleSpec};

use super::AppState;
use super::error::ApiError;

/// Response body for `DELETE /rules/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
    pub message: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rules: usize,
    pub log_entries: usize,
    pub evicted: u64,
}

fn record(route: &'static str, status: u16) {
    counter!(m::API_REQUESTS_TOTAL, m::LABEL_ROUTE => route, m::LABEL_STATUS => status.to_string())
        .increment(1);
}

fn record_result<T>(route: &'static str, result: &Result<T, ApiError>) {
    let status = match result {
        Ok(_) => 200,
        Err(e) => e.status().as_u16(),
    };
    record(route, status);
}

pub async fn list_rules(State(state): State<AppState>) -> Json<Vec<Rule>> {
    record("/rules", 200);
    Json(state.simulator().list_rules())
}

pub async fn create_rule(
    State(state): State<AppState>,
    body: Result<Json<RuleSpec>, JsonRejection>,
) -> Result<Json<Rule>, ApiError> {
    let result = body
        .map_err(ApiError::from)
        .and_then(|Json(spec)| Ok(state.simulator().create_rule(&spec)?));
    record_result("/rules", &result);
    result.map(Json)
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeleteResponse> {
    state.simulator().delete_rule(&id);
    record("/rules/{id}", 200);
    Json(DeleteResponse {
        status: "success".to_owned(),
        message: format!("Rule {id} deleted"),
    })
}

pub async fn simulate(
    State(state): State<AppState>,
    body: Result<Json<PacketSpec>, JsonRejection>,
) -> Result<Json<LogEntry>, ApiError> {
    let result = body
        .map_err(ApiError::from)
        .and_then(|Json(spec)| Ok(state.simulator().simulate(&spec)?));
    record_result("/simulate", &result);
    result.map(Json)
}

pub async fn list_logs(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    record("/logs", 200);
    Json(state.simulator().list_logs())
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.simulator().stats();
    record("/health", 200);
    Json(HealthResponse {
        status: "healthy".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        rules: stats.rules,
        log_entries: stats.log_entries,
        evicted: stats.evicted,
    })
}
