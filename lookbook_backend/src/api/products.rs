use super::{ApiError, ApiResult, AppState};
use crate::catalog::{CatalogService, ProductLikeOutcome, ProductView};
use crate::feed::Viewer;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogParams {
    #[serde(default)]
    viewer: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LikeRequest {
    author_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProductsResponse {
    products: Vec<ProductView>,
}

pub(crate) async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> ApiResult<ProductsResponse> {
    let viewer = Viewer::from_optional(params.viewer);
    let limit = params
        .limit
        .unwrap_or(state.config.feed.default_catalog_limit);
    let products = CatalogService::new(state.database.clone()).list_trending(&viewer, limit)?;
    Ok(Json(ProductsResponse { products }))
}

pub(crate) async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(params): Query<CatalogParams>,
) -> ApiResult<ProductView> {
    let viewer = Viewer::from_optional(params.viewer);
    let product = CatalogService::new(state.database.clone()).get_product(&product_id, &viewer)?;
    Ok(Json(product))
}

pub(crate) async fn like_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(payload): Json<LikeRequest>,
) -> ApiResult<ProductLikeOutcome> {
    let outcome =
        CatalogService::new(state.database.clone()).like(&product_id, &payload.author_id)?;
    Ok(Json(outcome))
}

pub(crate) async fn view_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    CatalogService::new(state.database.clone()).record_view(&product_id)?;
    Ok(StatusCode::OK)
}
