use crate::config::{ExplorerConfig, ServerConfig};
use crate::dashboard::params::{parse_created_after, DashboardParams};
use crate::dashboard::{Dashboard, RefreshState};
use crate::error::{Error, Result};
use crate::render;
use log::{error, info};
use serde::Deserialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// Query string of `/` and `/api/pairs`. Every field is optional; missing
/// fields keep the dashboard's current value.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ParamsQuery {
    pub first: Option<String>,
    pub order_by: Option<String>,
    pub order_direction: Option<String>,
    pub created_after: Option<String>,
    pub min_daily_volume_usd: Option<String>,
    pub created_at_block_number: Option<String>,
    pub page: Option<usize>,
}

impl ParamsQuery {
    /// Overlays the query on `current`.
    pub fn merge(&self, current: &DashboardParams) -> Result<DashboardParams> {
        let mut params = current.clone();
        if let Some(first) = non_empty(&self.first) {
            params.first = first
                .parse()
                .map_err(|_| Error::ValidationError(format!("first must be an integer, got {}", first)))?;
        }
        if let Some(order_by) = non_empty(&self.order_by) {
            params.order_by = order_by.parse()?;
        }
        if let Some(direction) = non_empty(&self.order_direction) {
            params.order_direction = direction.parse()?;
        }
        if let Some(created_after) = non_empty(&self.created_after) {
            params.created_after = parse_created_after(created_after)?;
        }
        if let Some(volume) = non_empty(&self.min_daily_volume_usd) {
            params.min_daily_volume_usd = volume.parse().map_err(|_| {
                Error::ValidationError(format!("minimum volume must be a number, got {}", volume))
            })?;
        }
        // An empty block field clears the filter.
        if let Some(block) = &self.created_at_block_number {
            let block = block.trim();
            params.created_at_block_number = if block.is_empty() {
                None
            } else {
                Some(block.parse().map_err(|_| {
                    Error::ValidationError(format!("block number must be an integer, got {}", block))
                })?)
            };
        }
        params.validate()?;
        Ok(params)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct ServerState {
    pub dashboard: Dashboard,
    pub explorer: ExplorerConfig,
    pub page_size: usize,
}

pub fn routes(
    state: Arc<ServerState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_state = warp::any().map(move || state.clone());

    let health = warp::path("health").and(warp::path::end()).and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "status": "ok",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    });

    let api = warp::path!("api" / "pairs")
        .and(warp::get())
        .and(warp::query::<ParamsQuery>())
        .and(with_state.clone())
        .and_then(get_pairs_json);

    let page = warp::path::end()
        .and(warp::get())
        .and(warp::query::<ParamsQuery>())
        .and(with_state)
        .and_then(get_page);

    health.or(api).or(page)
}

/// Applies the query if it changes anything (or nothing was loaded yet).
async fn sync_params(state: &ServerState, query: &ParamsQuery) -> Result<()> {
    let snapshot = state.dashboard.snapshot().await;
    let params = query.merge(&snapshot.params)?;
    if params != snapshot.params || snapshot.state == RefreshState::Idle {
        // A failed cycle is reflected in the snapshot, not as an HTTP error.
        state.dashboard.apply_params(params).await?;
    }
    Ok(())
}

async fn get_page(query: ParamsQuery, state: Arc<ServerState>) -> std::result::Result<Response, Infallible> {
    if let Err(e) = sync_params(&state, &query).await {
        let body = format!(
            "<!DOCTYPE html><html><body><p class=\"status error\">{}</p></body></html>",
            render::escape_html(&e.to_string())
        );
        return Ok(warp::reply::with_status(warp::reply::html(body), StatusCode::BAD_REQUEST).into_response());
    }
    let snapshot = state.dashboard.snapshot().await;
    let html = render::render_html(
        &snapshot,
        &state.explorer,
        query.page.unwrap_or(1),
        state.page_size,
    );
    Ok(warp::reply::html(html).into_response())
}

async fn get_pairs_json(
    query: ParamsQuery,
    state: Arc<ServerState>,
) -> std::result::Result<Response, Infallible> {
    if let Err(e) = sync_params(&state, &query).await {
        return Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "error": e.to_string() })),
            StatusCode::BAD_REQUEST,
        )
        .into_response());
    }
    let snapshot = state.dashboard.snapshot().await;
    let rows = render::rows(&snapshot.rows, &state.explorer);
    Ok(warp::reply::json(&serde_json::json!({
        "params": snapshot.params,
        "state": snapshot.state,
        "loading": snapshot.loading,
        "cycle": snapshot.cycle,
        "last_updated": snapshot.last_updated,
        "last_error": snapshot.last_error,
        "rows": rows,
    }))
    .into_response())
}

pub async fn serve(state: Arc<ServerState>, config: &ServerConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::ConfigError(format!("Invalid server address: {}", e)))?;
    info!("Starting dashboard server on {}", addr);

    let (bound, server) = warp::serve(routes(state))
        .try_bind_ephemeral(addr)
        .map_err(|e| {
            error!("Failed to bind {}: {}", addr, e);
            Error::ConfigError(format!("Failed to bind {}: {}", addr, e))
        })?;
    info!("Dashboard listening on http://{}", bound);
    server.await;
    Ok(())
}
