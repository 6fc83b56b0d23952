use crate::rest::bad_request;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/neighbors/", get(list_neighbors))
        .route("/ipv4/mac/", get(ipv4_mac))
}

#[derive(Serialize)]
struct NeighborResponse {
    local_ipv6: String,
    mac: String,
}

async fn list_neighbors(
    State(state): State<AppState>,
) -> Result<Json<Vec<NeighborResponse>>, (StatusCode, String)> {
    let entries = state
        .neighbors
        .scan()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(
        entries
            .into_iter()
            .map(|e| NeighborResponse {
                local_ipv6: e.local_ipv6.to_string(),
                mac: e.mac.to_string(),
            })
            .collect(),
    ))
}

#[derive(Deserialize)]
struct Ipv4MacQuery {
    ip: String,
}

#[derive(Serialize)]
struct Ipv4MacResponse {
    ip: String,
    mac: Option<String>,
}

async fn ipv4_mac(
    State(state): State<AppState>,
    Query(query): Query<Ipv4MacQuery>,
) -> Result<Json<Ipv4MacResponse>, (StatusCode, String)> {
    let ip: Ipv4Addr = query
        .ip
        .parse()
        .map_err(|_| bad_request(format!("invalid IPv4 address: {}", query.ip)))?;

    let mac = state
        .neighbors
        .ipv4_to_mac(ip)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(Ipv4MacResponse {
        ip: query.ip,
        mac: mac.map(|m| m.to_string()),
    }))
}
