pub mod broadcast;
pub mod devices;
pub mod gateways;
pub mod health;
pub mod neighbors;
pub mod tags;

use crate::AppState;
use axum::http::StatusCode;
use axum::Router;
use rasteer_store::Error as StoreError;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(broadcast::router())
        .merge(tags::router())
        .merge(devices::router())
        .merge(gateways::router())
        .merge(neighbors::router())
        .merge(health::router())
}

/// Map store errors onto HTTP status codes.
pub(crate) fn store_error(e: StoreError) -> (StatusCode, String) {
    let status = match &e {
        StoreError::TagNotFound(_)
        | StoreError::DeviceNotFound(_)
        | StoreError::GatewayNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::DuplicateDevice(_) | StoreError::DuplicateGateway(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

pub(crate) fn bad_request(msg: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.into())
}
