//! HTTP server side of the peer protocol
//!
//! - `GET <base>{group}/{key}` - raw value as `application/octet-stream`
//! - `GET /api?key=<key>` - optional front end over a single group

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use ringcache::{ByteView, Group, GroupRegistry};
use tracing::info;

use crate::error::HttpError;

/// Router for the peer endpoint under `base_path` (leading and trailing `/`)
pub fn peer_router(registry: Arc<GroupRegistry>, base_path: &str) -> Router {
    let route = format!("{}{{group}}/{{*key}}", base_path);

    Router::new()
        .route(&route, get(serve_key))
        .fallback(invalid_path)
        .with_state(registry)
}

/// Router for the client-facing API over one group
pub fn api_router(group: Arc<Group>) -> Router {
    Router::new().route("/api", get(serve_api)).with_state(group)
}

async fn serve_key(
    State(registry): State<Arc<GroupRegistry>>,
    Path((group_name, key)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    info!(group = %group_name, key = %key, "peer request");

    let group = match registry.get(&group_name) {
        Some(group) => group,
        None => return Err(HttpError::NoSuchGroup(group_name)),
    };

    let view = group.get(&key).await?;
    Ok(octet_stream(view))
}

async fn serve_api(
    State(group): State<Arc<Group>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, HttpError> {
    let key = params.get("key").map(String::as_str).unwrap_or_default();
    let view = group.get(key).await?;
    Ok(octet_stream(view))
}

async fn invalid_path(uri: Uri) -> HttpError {
    HttpError::BadRequest(format!(
        "invalid request path, expected <base>/<group>/<key>: {}",
        uri.path()
    ))
}

fn octet_stream(view: ByteView) -> Response {
    ([(header::CONTENT_TYPE, "application/octet-stream")], view.bytes()).into_response()
}
