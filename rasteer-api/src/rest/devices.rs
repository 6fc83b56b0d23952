use crate::rest::{bad_request, store_error};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rasteer_core::MacAddr;
use rasteer_store::{Device, DeviceUpdate};
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/devices/", get(list_devices).post(create_device))
        .route(
            "/devices/{mac}",
            get(get_device).put(update_device).delete(delete_device),
        )
}

#[derive(Deserialize)]
struct CreateDeviceRequest {
    mac: String,
    tag_id: u32,
    #[serde(default)]
    alias: Option<String>,
}

#[derive(Deserialize)]
struct UpdateDeviceRequest {
    tag_id: Option<u32>,
    alias: Option<String>,
}

fn parse_mac(raw: &str) -> Result<MacAddr, (StatusCode, String)> {
    raw.parse()
        .map_err(|_| bad_request(format!("invalid MAC address: {raw}")))
}

async fn list_devices(
    State(state): State<AppState>,
) -> Result<Json<Vec<Device>>, (StatusCode, String)> {
    state.db.list_devices().map(Json).map_err(store_error)
}

async fn create_device(
    State(state): State<AppState>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<Device>), (StatusCode, String)> {
    let device = Device {
        mac: parse_mac(&req.mac)?,
        tag_id: req.tag_id,
        alias: req.alias,
    };
    state.db.create_device(&device).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(device)))
}

async fn get_device(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<Device>, (StatusCode, String)> {
    let mac = parse_mac(&mac)?;
    match state.db.get_device(mac).map_err(store_error)? {
        Some(device) => Ok(Json(device)),
        None => Err((StatusCode::NOT_FOUND, format!("device {mac} not found"))),
    }
}

async fn update_device(
    State(state): State<AppState>,
    Path(mac): Path<String>,
    Json(req): Json<UpdateDeviceRequest>,
) -> Result<Json<Device>, (StatusCode, String)> {
    let mac = parse_mac(&mac)?;
    state
        .db
        .update_device(
            mac,
            DeviceUpdate {
                tag_id: req.tag_id,
                alias: req.alias,
            },
        )
        .map(Json)
        .map_err(store_error)
}

async fn delete_device(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let mac = parse_mac(&mac)?;
    state.db.delete_device(mac).map_err(store_error)?;
    Ok(Json(serde_json::json!({ "message": "deleted" })))
}
