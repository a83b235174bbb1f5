use super::{ApiResult, AppState};
use crate::feed::{AuthorView, FeedEntry, FeedService, RegisterAuthorInput, Viewer};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct SetVisibilityRequest {
    visibility: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewerParams {
    #[serde(default)]
    viewer: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuthorPostsResponse {
    entries: Vec<FeedEntry>,
}

pub(crate) async fn create_author(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAuthorInput>,
) -> ApiResult<AuthorView> {
    let author = FeedService::new(state.database.clone()).register_author(payload)?;
    Ok(Json(author))
}

pub(crate) async fn get_author(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
) -> ApiResult<AuthorView> {
    let author = FeedService::new(state.database.clone()).get_author(&author_id)?;
    Ok(Json(author))
}

pub(crate) async fn list_author_posts(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
    Query(params): Query<ViewerParams>,
) -> ApiResult<AuthorPostsResponse> {
    let viewer = Viewer::from_optional(params.viewer);
    let entries =
        FeedService::new(state.database.clone()).posts_by_author(&author_id, &viewer)?;
    Ok(Json(AuthorPostsResponse { entries }))
}

pub(crate) async fn set_visibility(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
    Json(payload): Json<SetVisibilityRequest>,
) -> ApiResult<AuthorView> {
    let author =
        FeedService::new(state.database.clone()).set_visibility(&author_id, &payload.visibility)?;
    Ok(Json(author))
}
