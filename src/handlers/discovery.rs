use axum::response::Json;
use serde_json::{json, Value};

use crate::api::version::{MAX_API_VERSION, MIN_API_VERSION};
use crate::routes::API_PREFIX;

/// GET / - version discovery document
pub async fn versions() -> Json<Value> {
    Json(json!({
        "versions": [{
            "id": "v2.1",
            "status": "CURRENT",
            "version": MAX_API_VERSION.to_string(),
            "min_version": MIN_API_VERSION.to_string(),
            "updated": "2013-07-23T11:33:21Z",
            "links": [{ "rel": "self", "href": format!("{}/", API_PREFIX) }],
            "service": env!("CARGO_PKG_NAME"),
            "build": env!("CARGO_PKG_VERSION"),
        }]
    }))
}

/// GET /health - liveness only; the network service is not probed
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
