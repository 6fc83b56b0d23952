//! Broadcast job controls.
//!
//! The verbs mirror the original dashboard surface: plain GETs that pause,
//! resume, or trigger the job, plus a status read.

use crate::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/broadcast/", get(status))
        .route("/broadcast/start", get(start))
        .route("/broadcast/stop", get(stop))
        .route("/broadcast/trigger_now", get(trigger_now))
}

#[derive(Serialize)]
struct StatusResponse {
    running: bool,
    next_run_time: Option<String>,
}

#[derive(Serialize)]
struct ControlResponse {
    status: &'static str,
    message: &'static str,
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.scheduler.status();
    Json(StatusResponse {
        running: status.running,
        next_run_time: status.next_run_time.map(|t| t.to_rfc3339()),
    })
}

async fn start(State(state): State<AppState>) -> Json<ControlResponse> {
    state.scheduler.resume();
    Json(ControlResponse {
        status: "success",
        message: "Broadcast job resumed",
    })
}

async fn stop(State(state): State<AppState>) -> Json<ControlResponse> {
    state.scheduler.pause();
    Json(ControlResponse {
        status: "success",
        message: "Broadcast job paused",
    })
}

async fn trigger_now(State(state): State<AppState>) -> Json<ControlResponse> {
    state.scheduler.trigger_now();
    Json(ControlResponse {
        status: "success",
        message: "Broadcast triggered",
    })
}
