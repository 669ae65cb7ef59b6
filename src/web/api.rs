use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use super::export::{render_csv, EXPORT_FILENAME};
use crate::simulation::{Snapshot, SystemStatus, Target};
use crate::vehicle::Vehicle;

// Request bodies
#[derive(Debug, Default, Deserialize)]
pub struct PayloadRequest {
    /// Absent or null means inactive.
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TargetRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ServiceStatus {
    status: &'static str,
    mode: &'static str,
    vehicle_id: String,
    version: &'static str,
    tick: u64,
}

pub fn routes(vehicle: Vehicle) -> Router {
    Router::new()
        .route("/api/telemetry", get(telemetry))
        .route("/api/system", get(system_status))
        .route("/api/status", get(service_status))
        .route("/api/payload", post(set_payload))
        .route("/api/navigate", post(navigate))
        .route("/api/export", get(export_detections))
        .with_state(vehicle)
}

async fn telemetry(State(vehicle): State<Vehicle>) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(vehicle.get_state_snapshot()?))
}

async fn system_status(State(vehicle): State<Vehicle>) -> Result<Json<SystemStatus>, ApiError> {
    Ok(Json(vehicle.get_system_status()?))
}

async fn service_status(State(vehicle): State<Vehicle>) -> Result<Json<ServiceStatus>, ApiError> {
    Ok(Json(ServiceStatus {
        status: "active",
        mode: "server-side",
        vehicle_id: vehicle.vehicle_id.clone(),
        version: env!("CARGO_PKG_VERSION"),
        tick: vehicle.tick_count()?,
    }))
}

async fn set_payload(
    State(vehicle): State<Vehicle>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: PayloadRequest = parse_body(&body)?;
    let active = request.active.unwrap_or(false);
    vehicle.set_payload(active)?;
    Ok(Json(json!({
        "status": "success",
        "payload_active": active,
    })))
}

async fn navigate(State(vehicle): State<Vehicle>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let request: TargetRequest = parse_body(&body)?;
    let Target { lat, lon } = vehicle.set_target(request.lat, request.lon)?;
    Ok(Json(json!({
        "status": "success",
        "target": { "lat": lat, "lon": lon },
    })))
}

async fn export_detections(State(vehicle): State<Vehicle>) -> Result<impl IntoResponse, ApiError> {
    let csv = render_csv(&vehicle.detections()?);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        csv,
    ))
}

/// Parses a JSON body; an empty body yields the request's defaults.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}
