use crate::rest::{bad_request, store_error};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rasteer_store::{Tag, TagUpdate};
use serde::Deserialize;
use std::net::Ipv6Addr;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags/", get(list_tags).post(create_tag))
        .route("/tags/{tag_id}", get(get_tag).put(update_tag).delete(delete_tag))
}

#[derive(Deserialize)]
struct CreateTagRequest {
    alias: String,
    #[serde(default)]
    dns: Vec<String>,
}

#[derive(Deserialize)]
struct UpdateTagRequest {
    alias: Option<String>,
    dns: Option<Vec<String>>,
}

fn parse_dns(raw: &[String]) -> Result<Vec<Ipv6Addr>, (StatusCode, String)> {
    raw.iter()
        .map(|s| {
            s.parse::<Ipv6Addr>()
                .map_err(|_| bad_request(format!("invalid IPv6 address: {s}")))
        })
        .collect()
}

async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tag>>, (StatusCode, String)> {
    state.db.list_tags().map(Json).map_err(store_error)
}

async fn create_tag(
    State(state): State<AppState>,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), (StatusCode, String)> {
    let dns = parse_dns(&req.dns)?;
    let tag = state.db.create_tag(&req.alias, dns).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn get_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<u32>,
) -> Result<Json<Tag>, (StatusCode, String)> {
    match state.db.get_tag(tag_id).map_err(store_error)? {
        Some(tag) => Ok(Json(tag)),
        None => Err((StatusCode::NOT_FOUND, format!("tag {tag_id} not found"))),
    }
}

async fn update_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<u32>,
    Json(req): Json<UpdateTagRequest>,
) -> Result<Json<Tag>, (StatusCode, String)> {
    let dns = match &req.dns {
        Some(raw) => Some(parse_dns(raw)?),
        None => None,
    };

    state
        .db
        .update_tag(
            tag_id,
            TagUpdate {
                alias: req.alias,
                dns,
            },
        )
        .map(Json)
        .map_err(store_error)
}

async fn delete_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<u32>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state.db.delete_tag(tag_id).map_err(store_error)?;
    Ok(Json(serde_json::json!({ "message": "deleted" })))
}
