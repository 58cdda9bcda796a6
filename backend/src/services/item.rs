//! Item service

use crate::error::ApiError;
use crate::repositories::ItemRepository;
use items_api_shared::types::{ItemList, ItemListQuery, ItemRequest};
use items_api_shared::validation::{validate_item_description, validate_item_name};
use items_api_shared::{Item, ValidationError};
use sqlx::PgPool;

/// Item CRUD operations
pub struct ItemService;

impl ItemService {
    /// List items with normalized pagination
    pub async fn list(pool: &PgPool, query: ItemListQuery) -> Result<ItemList, ApiError> {
        let page = query.normalize();
        let items = ItemRepository::list(pool, page.limit, page.offset)
            .await?
            .into_iter()
            .map(Item::from)
            .collect();

        Ok(ItemList {
            items,
            limit: page.limit,
            offset: page.offset,
        })
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Item, ApiError> {
        ItemRepository::find_by_id(pool, id)
            .await?
            .map(Item::from)
            .ok_or_else(not_found)
    }

    pub async fn create(pool: &PgPool, req: ItemRequest) -> Result<Item, ApiError> {
        validate_item(&req)?;
        let record = ItemRepository::create(pool, req.name.trim(), &req.description).await?;
        Ok(record.into())
    }

    pub async fn update(pool: &PgPool, id: i64, req: ItemRequest) -> Result<Item, ApiError> {
        validate_item(&req)?;
        ItemRepository::update(pool, id, req.name.trim(), &req.description)
            .await?
            .map(Item::from)
            .ok_or_else(not_found)
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        if ItemRepository::delete(pool, id).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Item not found".to_string())
}

fn validate_item(req: &ItemRequest) -> Result<(), ValidationError> {
    validate_item_name(&req.name)?;
    validate_item_description(&req.description)
}
