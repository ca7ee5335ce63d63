use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::logger::{self, LogTag};
use crate::pools::{PoolRecord, ProtocolYield};
use crate::webserver::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProtocolsQuery {
    pub search: Option<String>,
    /// Kept as text so `?count=` falls back to the default like a missing value
    pub count: Option<String>,
}

impl ProtocolsQuery {
    /// `None` for a missing or blank count, an error for anything non-numeric
    pub fn parsed_count(&self) -> Result<Option<i64>, String> {
        match self.count.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|e| format!("Invalid count '{}': {}", raw, e)),
        }
    }
}

/// Create yield routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/protocols", get(get_protocols))
        .route("/apy", get(get_named_apy))
        .route("/pools", get(get_pools))
}

/// GET /api/protocols
/// - ?count=N (default 5) returns top-N by APY
/// - ?search=foo returns all projects matching 'foo'
async fn get_protocols(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProtocolsQuery>,
) -> Result<Json<Vec<ProtocolYield>>, (StatusCode, String)> {
    logger::debug(
        LogTag::Webserver,
        &format!(
            "GET /api/protocols search={:?} count={:?}",
            query.search, query.count
        ),
    );
    let count = query
        .parsed_count()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    Ok(Json(state.queries.protocols(query.search.as_deref(), count)))
}

/// GET /api/apy - `{ "<label>": apy }` for the configured named protocols
async fn get_named_apy(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, f64>> {
    Json(state.queries.get_named_apy())
}

/// GET /api/pools - the full cached pool list
async fn get_pools(State(state): State<Arc<AppState>>) -> Json<Vec<PoolRecord>> {
    Json(state.queries.all_pools())
}
