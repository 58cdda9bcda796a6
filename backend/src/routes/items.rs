//! Item routes
//!
//! All handlers here sit behind the authentication gate and take the
//! verified caller as [`AuthUser`].

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::ItemService;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use items_api_shared::types::{ApiResponse, ItemList, ItemListQuery, ItemRequest};
use items_api_shared::Item;
use tracing::info;

/// Create item routes
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

fn item_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("Invalid item ID".to_string()))
}

/// GET /api/v1/items - List items with pagination (limit default 50, max 100)
async fn list_items(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ItemListQuery>,
) -> ApiResult<Json<ApiResponse<ItemList>>> {
    let items = ItemService::list(state.db(), query).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// POST /api/v1/items
async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Item>>)> {
    let Json(req) = payload?;
    let item = ItemService::create(state.db(), req).await?;
    info!(item_id = item.id, user_id = auth.user_id, "Item created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(item, "Item created successfully")),
    ))
}

/// GET /api/v1/items/:id
async fn get_item(
    State(state): State<AppState>,
    _auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<Item>>> {
    let item = ItemService::get(state.db(), item_id(path)?).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// PUT /api/v1/items/:id
async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Item>>> {
    let id = item_id(path)?;
    let Json(req) = payload?;
    let item = ItemService::update(state.db(), id, req).await?;
    info!(item_id = item.id, user_id = auth.user_id, "Item updated");
    Ok(Json(ApiResponse::with_message(item, "Item updated successfully")))
}

/// DELETE /api/v1/items/:id
async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let id = item_id(path)?;
    ItemService::delete(state.db(), id).await?;
    info!(item_id = id, user_id = auth.user_id, "Item deleted");
    Ok(Json(ApiResponse::message("Item deleted successfully")))
}
