use super::{ApiError, ApiResult, AppState};
use crate::feed::{
    CommentView, CreateCommentInput, CreatePostInput, FeedService, LikeOutcome, PostDetails,
    PostView, Viewer,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct ViewerParams {
    #[serde(default)]
    viewer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LikeRequest {
    author_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostResponse {
    post: PostView,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentResponse {
    comment: CommentView,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentsResponse {
    comments: Vec<CommentView>,
}

pub(crate) async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostInput>,
) -> ApiResult<PostResponse> {
    let post = FeedService::new(state.database.clone()).create_post(payload)?;
    Ok(Json(PostResponse { post }))
}

pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(params): Query<ViewerParams>,
) -> ApiResult<PostDetails> {
    let viewer = Viewer::from_optional(params.viewer);
    let details = FeedService::new(state.database.clone()).get_post(&post_id, &viewer)?;
    Ok(Json(details))
}

pub(crate) async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(payload): Json<LikeRequest>,
) -> ApiResult<LikeOutcome> {
    let outcome = FeedService::new(state.database.clone()).like(&post_id, &payload.author_id)?;
    Ok(Json(outcome))
}

pub(crate) async fn view_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    FeedService::new(state.database.clone()).record_view(&post_id)?;
    Ok(StatusCode::OK)
}

pub(crate) async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(payload): Json<CreateCommentInput>,
) -> ApiResult<CommentResponse> {
    let comment = FeedService::new(state.database.clone()).comment(&post_id, payload)?;
    Ok(Json(CommentResponse { comment }))
}

pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(params): Query<ViewerParams>,
) -> ApiResult<CommentsResponse> {
    // Routed through the visibility-checked lookup so a hidden post's
    // comments read as absent, same as the post itself.
    let viewer = Viewer::from_optional(params.viewer);
    let details = FeedService::new(state.database.clone()).get_post(&post_id, &viewer)?;
    Ok(Json(CommentsResponse {
        comments: details.comments,
    }))
}
