use super::{ApiResult, AppState};
use crate::feed::{FeedEntry, FeedService, Viewer};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct FeedParams {
    #[serde(default)]
    viewer: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedResponse {
    entries: Vec<FeedEntry>,
}

pub(crate) async fn get_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> ApiResult<FeedResponse> {
    let viewer = Viewer::from_optional(params.viewer);
    let limit = params.limit.unwrap_or(state.config.feed.default_feed_limit);
    let entries = FeedService::new(state.database.clone()).assemble_for(&viewer, limit)?;
    Ok(Json(FeedResponse { entries }))
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    version: &'static str,
    api_port: u16,
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_port: state.config.api_port,
    })
}
