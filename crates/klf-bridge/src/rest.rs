//! REST facade.
//!
//! Routes (trailing slash optional):
//!
//! | Method | Path | Gateway operation |
//! |---|---|---|
//! | GET  | `/actuator/`, `/actuator/{id}/` | node enumeration stream |
//! | POST | `/actuator/{id}/` | `GW_COMMAND_SEND_REQ` |
//! | GET  | `/version/` | version + protocol version |
//! | GET  | `/network_setup/` | `GW_GET_NETWORK_SETUP_REQ` |
//! | GET  | `/clock/` | `GW_GET_LOCAL_TIME_REQ` |
//! | POST | `/clock/` | `GW_SET_UTC_REQ` (+ optional time zone) |
//! | POST | `/config/controller_copy/` | `GW_CS_CONTROLLER_COPY_REQ` |
//!
//! Handler failures map to `500 {"status":"error"}`, unknown paths to 404,
//! known paths with the wrong method to 405 with an `Allow` header. Bodies
//! are JSON with an explicit `charset=utf-8` content type.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use klf_client::{ClientError, GatewayClient};
use klf_proto::{
    FunctionalParameter,
    messages::{config::ControllerCopyMode, info::GetAllNodesInformationNtf},
};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Build the REST router over a shared gateway client.
pub fn router(client: GatewayClient) -> Router {
    Router::new()
        .route("/actuator", get(list_actuators))
        .route("/actuator/", get(list_actuators))
        .route("/actuator/{id}", get(get_actuator).post(post_actuator))
        .route("/actuator/{id}/", get(get_actuator).post(post_actuator))
        .route("/version", get(version))
        .route("/version/", get(version))
        .route("/network_setup", get(network_setup))
        .route("/network_setup/", get(network_setup))
        .route("/clock", get(clock).post(update_clock))
        .route("/clock/", get(clock).post(update_clock))
        .route("/config/controller_copy", post(controller_copy))
        .route("/config/controller_copy/", post(controller_copy))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .with_state(client)
}

/// Handler failure, rendered as a JSON error body.
#[derive(Error, Debug)]
enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Gateway(#[from] ClientError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(reason) => {
                tracing::debug!(reason, "rejecting request");
                StatusCode::BAD_REQUEST
            },
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Gateway(error) => {
                tracing::error!(%error, "gateway operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            },
        };
        json_response(status, &json!({"status": "error"}))
    }
}

fn json_response(status: StatusCode, body: &Value) -> Response {
    (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body.to_string()).into_response()
}

fn node_json(node: &GetAllNodesInformationNtf) -> Value {
    json!({
        "id": node.node_id,
        "name": node.name,
        "position": FunctionalParameter::relative_from_raw(node.current_position),
        "target": FunctionalParameter::relative_from_raw(node.target),
        "state": node.state,
    })
}

async fn list_actuators(State(client): State<GatewayClient>) -> Result<Response, ApiError> {
    let nodes = client.nodes().await?;
    let body = Value::Array(nodes.iter().map(node_json).collect());
    Ok(json_response(StatusCode::OK, &body))
}

async fn get_actuator(
    State(client): State<GatewayClient>,
    Path(node_id): Path<u8>,
) -> Result<Response, ApiError> {
    let nodes = client.nodes().await?;
    let node =
        nodes.iter().find(|node| node.node_id == node_id).ok_or(ApiError::NotFound)?;
    Ok(json_response(StatusCode::OK, &node_json(node)))
}

#[derive(Debug, Deserialize)]
struct ActuatorCommand {
    /// Relative target position in `[0, 1]`.
    position: f64,
}

async fn post_actuator(
    State(client): State<GatewayClient>,
    Path(node_id): Path<u8>,
    Json(body): Json<ActuatorCommand>,
) -> Result<Response, ApiError> {
    let run = client
        .send_command(vec![node_id], FunctionalParameter::Relative(body.position))
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({
            "status": "ok",
            "session_id": run.session_id,
            "events": run.run_status.len(),
        }),
    ))
}

async fn version(State(client): State<GatewayClient>) -> Result<Response, ApiError> {
    let (version, protocol) =
        tokio::try_join!(client.get_version(), client.get_protocol_version())?;
    Ok(json_response(
        StatusCode::OK,
        &json!({
            "software_version": version.software_version_string(),
            "hardware_version": version.hardware_version,
            "product_group": version.product_group,
            "product_type": version.product_type,
            "protocol": { "major": protocol.major, "minor": protocol.minor },
        }),
    ))
}

async fn network_setup(State(client): State<GatewayClient>) -> Result<Response, ApiError> {
    let setup = client.get_network_setup().await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({
            "ip_address": setup.ip_address.to_string(),
            "mask": setup.mask.to_string(),
            "default_gateway": setup.default_gateway.to_string(),
            "dhcp": setup.dhcp,
        }),
    ))
}

async fn clock(State(client): State<GatewayClient>) -> Result<Response, ApiError> {
    let time = client.get_local_time().await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({
            "utc_time": time.utc_time,
            "second": time.second,
            "minute": time.minute,
            "hour": time.hour,
            "day_of_month": time.day_of_month,
            "month": time.month,
            "year": time.year,
            "week_day": time.week_day,
            "day_of_year": time.day_of_year,
            "daylight_saving": time.daylight_saving,
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct ClockUpdate {
    /// Seconds since the UNIX epoch; defaults to the bridge's clock.
    timestamp: Option<u32>,
    /// Optional zone rule string for `GW_RTC_SET_TIME_ZONE_REQ`.
    time_zone: Option<String>,
}

async fn update_clock(
    State(client): State<GatewayClient>,
    Json(body): Json<ClockUpdate>,
) -> Result<Response, ApiError> {
    let timestamp = body.timestamp.unwrap_or_else(now_unix);
    client.set_utc(timestamp).await?;
    if let Some(time_zone) = &body.time_zone {
        client.set_time_zone(time_zone).await?;
    }
    Ok(json_response(StatusCode::OK, &json!({"status": "ok"})))
}

#[derive(Debug, Deserialize)]
struct ControllerCopy {
    copy_mode: String,
}

async fn controller_copy(
    State(client): State<GatewayClient>,
    Json(body): Json<ControllerCopy>,
) -> Result<Response, ApiError> {
    let mode = match body.copy_mode.as_str() {
        "rcm" => ControllerCopyMode::Rcm,
        "tcm" => ControllerCopyMode::Tcm,
        other => return Err(ApiError::BadRequest(format!("unknown copy_mode '{other}'"))),
    };
    client.controller_copy(mode).await?;
    Ok(json_response(StatusCode::OK, &json!({"status": "ok"})))
}

async fn not_found() -> Response {
    json_response(StatusCode::NOT_FOUND, &json!({"status": "error"}))
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET, POST"), (header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
        json!({"status": "error", "reason": "HTTP method not allowed"}).to_string(),
    )
        .into_response()
}

fn now_unix() -> u32 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs() as u32)
}
