use crate::rest::{bad_request, store_error};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rasteer_core::MacAddr;
use rasteer_store::{Gateway, GatewayUpdate};
use serde::Deserialize;
use std::net::Ipv6Addr;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gateways/", get(list_gateways).post(create_gateway))
        .route(
            "/gateways/{mac}",
            get(get_gateway).put(update_gateway).delete(delete_gateway),
        )
}

#[derive(Deserialize)]
struct CreateGatewayRequest {
    mac: String,
    tag_id: u32,
    #[serde(default)]
    alias: Option<String>,
    local_ipv6: String,
}

#[derive(Deserialize)]
struct UpdateGatewayRequest {
    tag_id: Option<u32>,
    alias: Option<String>,
    local_ipv6: Option<String>,
}

fn parse_mac(raw: &str) -> Result<MacAddr, (StatusCode, String)> {
    raw.parse()
        .map_err(|_| bad_request(format!("invalid MAC address: {raw}")))
}

fn parse_ipv6(raw: &str) -> Result<Ipv6Addr, (StatusCode, String)> {
    raw.parse()
        .map_err(|_| bad_request(format!("invalid IPv6 address: {raw}")))
}

async fn list_gateways(
    State(state): State<AppState>,
) -> Result<Json<Vec<Gateway>>, (StatusCode, String)> {
    state.db.list_gateways().map(Json).map_err(store_error)
}

async fn create_gateway(
    State(state): State<AppState>,
    Json(req): Json<CreateGatewayRequest>,
) -> Result<(StatusCode, Json<Gateway>), (StatusCode, String)> {
    let gateway = Gateway {
        mac: parse_mac(&req.mac)?,
        tag_id: req.tag_id,
        alias: req.alias,
        local_ipv6: parse_ipv6(&req.local_ipv6)?,
    };
    state.db.create_gateway(&gateway).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(gateway)))
}

async fn get_gateway(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<Gateway>, (StatusCode, String)> {
    let mac = parse_mac(&mac)?;
    match state.db.get_gateway(mac).map_err(store_error)? {
        Some(gateway) => Ok(Json(gateway)),
        None => Err((StatusCode::NOT_FOUND, format!("gateway {mac} not found"))),
    }
}

async fn update_gateway(
    State(state): State<AppState>,
    Path(mac): Path<String>,
    Json(req): Json<UpdateGatewayRequest>,
) -> Result<Json<Gateway>, (StatusCode, String)> {
    let mac = parse_mac(&mac)?;
    let local_ipv6 = match &req.local_ipv6 {
        Some(raw) => Some(parse_ipv6(raw)?),
        None => None,
    };

    state
        .db
        .update_gateway(
            mac,
            GatewayUpdate {
                tag_id: req.tag_id,
                alias: req.alias,
                local_ipv6,
            },
        )
        .map(Json)
        .map_err(store_error)
}

async fn delete_gateway(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let mac = parse_mac(&mac)?;
    state.db.delete_gateway(mac).map_err(store_error)?;
    Ok(Json(serde_json::json!({ "message": "deleted" })))
}
