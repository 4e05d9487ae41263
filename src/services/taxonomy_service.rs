use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    cache::CacheKey,
    catalog::slug,
    dto::taxonomy::{BrandList, CategoryList, CreateNamedRequest, CreateOptionRequest, OptionList, TagList},
    entity::{brands, categories, global_options, tags},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Brand, Category, GlobalOption, Tag},
    response::{ApiResponse, Meta},
    routes::params::NameSearchQuery,
    services::product_service::{brand_from_entity, category_from_entity, option_from_entity, tag_from_entity},
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    query: NameSearchQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    let cache_key = CacheKey::new("categories").filter_opt("q", query.q.as_deref());
    if let Some(items) = state.cache.get::<Vec<Category>>(&cache_key) {
        return Ok(ApiResponse::success(
            "Categories",
            CategoryList { items },
            Some(Meta::empty()),
        ));
    }

    let mut finder = categories::Entity::find().order_by_asc(categories::Column::Name);
    if let Some(q) = query.q.as_ref().filter(|s| !s.is_empty()) {
        finder = finder.filter(categories::Column::Name.contains(q.clone()));
    }
    let items: Vec<Category> = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    state.cache.put(cache_key, &items);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateNamedRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let name = normalized_name(&payload.name)?;

    let exists = categories::Entity::find()
        .filter(categories::Column::Name.eq(name.clone()))
        .count(&state.orm)
        .await?
        > 0;
    if exists {
        return Err(AppError::Conflict(format!("category '{name}' already exists")));
    }

    let slug = slug::unique_slug(&name, |candidate| async move {
        Ok(categories::Entity::find()
            .filter(categories::Column::Slug.eq(candidate))
            .count(&state.orm)
            .await?
            > 0)
    })
    .await?;

    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    state.cache.invalidate("categories");
    state.cache.invalidate("products");
    audit(state, user, "category_create", "categories", category.id).await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = categories::Entity::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    state.cache.invalidate("categories");
    state.cache.invalidate("products");
    audit(state, user, "category_delete", "categories", id).await;
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_brands(
    state: &AppState,
    query: NameSearchQuery,
) -> AppResult<ApiResponse<BrandList>> {
    let cache_key = CacheKey::new("brands").filter_opt("q", query.q.as_deref());
    if let Some(items) = state.cache.get::<Vec<Brand>>(&cache_key) {
        return Ok(ApiResponse::success(
            "Brands",
            BrandList { items },
            Some(Meta::empty()),
        ));
    }

    let mut finder = brands::Entity::find().order_by_asc(brands::Column::Name);
    if let Some(q) = query.q.as_ref().filter(|s| !s.is_empty()) {
        finder = finder.filter(brands::Column::Name.contains(q.clone()));
    }
    let items: Vec<Brand> = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(brand_from_entity)
        .collect();

    state.cache.put(cache_key, &items);
    Ok(ApiResponse::success(
        "Brands",
        BrandList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_brand(
    state: &AppState,
    user: &AuthUser,
    payload: CreateNamedRequest,
) -> AppResult<ApiResponse<Brand>> {
    ensure_admin(user)?;
    let name = normalized_name(&payload.name)?;

    let exists = brands::Entity::find()
        .filter(brands::Column::Name.eq(name.clone()))
        .count(&state.orm)
        .await?
        > 0;
    if exists {
        return Err(AppError::Conflict(format!("brand '{name}' already exists")));
    }

    let slug = slug::unique_slug(&name, |candidate| async move {
        Ok(brands::Entity::find()
            .filter(brands::Column::Slug.eq(candidate))
            .count(&state.orm)
            .await?
            > 0)
    })
    .await?;

    let brand = brands::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    state.cache.invalidate("brands");
    audit(state, user, "brand_create", "brands", brand.id).await;

    Ok(ApiResponse::success(
        "Brand created",
        brand_from_entity(brand),
        Some(Meta::empty()),
    ))
}

pub async fn delete_brand(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = brands::Entity::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    state.cache.invalidate("brands");
    state.cache.invalidate("products");
    audit(state, user, "brand_delete", "brands", id).await;
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_tags(state: &AppState, query: NameSearchQuery) -> AppResult<ApiResponse<TagList>> {
    let cache_key = CacheKey::new("tags").filter_opt("q", query.q.as_deref());
    if let Some(items) = state.cache.get::<Vec<Tag>>(&cache_key) {
        return Ok(ApiResponse::success(
            "Tags",
            TagList { items },
            Some(Meta::empty()),
        ));
    }

    let mut finder = tags::Entity::find().order_by_asc(tags::Column::Name);
    if let Some(q) = query.q.as_ref().filter(|s| !s.is_empty()) {
        finder = finder.filter(tags::Column::Name.contains(q.clone()));
    }
    let items: Vec<Tag> = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(tag_from_entity)
        .collect();

    state.cache.put(cache_key, &items);
    Ok(ApiResponse::success(
        "Tags",
        TagList { items },
        Some(Meta::empty()),
    ))
}

pub async fn delete_tag(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = tags::Entity::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    state.cache.invalidate("tags");
    state.cache.invalidate("products");
    audit(state, user, "tag_delete", "tags", id).await;
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_options(state: &AppState) -> AppResult<ApiResponse<OptionList>> {
    let cache_key = CacheKey::new("options");
    if let Some(items) = state.cache.get::<Vec<GlobalOption>>(&cache_key) {
        return Ok(ApiResponse::success(
            "Options",
            OptionList { items },
            Some(Meta::empty()),
        ));
    }

    let items = global_options::Entity::find()
        .order_by_asc(global_options::Column::Kind)
        .order_by_asc(global_options::Column::Value)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(option_from_entity)
        .collect::<AppResult<Vec<GlobalOption>>>()?;

    state.cache.put(cache_key, &items);
    Ok(ApiResponse::success(
        "Options",
        OptionList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_option(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOptionRequest,
) -> AppResult<ApiResponse<GlobalOption>> {
    ensure_admin(user)?;
    let value = normalized_name(&payload.value)
        .map_err(|_| AppError::validation("value", "value must not be empty"))?;

    let exists = global_options::Entity::find()
        .filter(global_options::Column::Kind.eq(payload.kind.as_str()))
        .filter(global_options::Column::Value.eq(value.clone()))
        .count(&state.orm)
        .await?
        > 0;
    if exists {
        return Err(AppError::Conflict(format!(
            "option {}/{value} already exists",
            payload.kind.as_str()
        )));
    }

    let option = global_options::ActiveModel {
        id: Set(Uuid::new_v4()),
        kind: Set(payload.kind.as_str().to_string()),
        value: Set(value),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    state.cache.invalidate("options");
    audit(state, user, "option_create", "global_options", option.id).await;

    Ok(ApiResponse::success(
        "Option created",
        option_from_entity(option)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_option(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = global_options::Entity::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    state.cache.invalidate("options");
    state.cache.invalidate("products");
    audit(state, user, "option_delete", "global_options", id).await;
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Resolve tag names to ids, creating missing tags (with derived slugs)
/// on the way. Used by the product write paths; runs on the caller's
/// transaction.
pub async fn ensure_tags<C: ConnectionTrait>(conn: &C, names: &[String]) -> AppResult<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(names.len());
    for raw in names {
        let name = normalized_name(raw).map_err(|_| {
            AppError::validation("tag_names", "tag names must not be empty")
        })?;

        if let Some(existing) = tags::Entity::find()
            .filter(tags::Column::Name.eq(name.clone()))
            .one(conn)
            .await?
        {
            if !ids.contains(&existing.id) {
                ids.push(existing.id);
            }
            continue;
        }

        let slug = slug::unique_slug(&name, |candidate| async move {
            Ok(tags::Entity::find()
                .filter(tags::Column::Slug.eq(candidate))
                .count(conn)
                .await?
                > 0)
        })
        .await?;

        let tag = tags::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            slug: Set(slug),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
        ids.push(tag.id);
    }
    Ok(ids)
}

fn normalized_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name", "name must not be empty"));
    }
    Ok(name.to_string())
}

async fn audit(state: &AppState, user: &AuthUser, action: &str, resource: &'static str, id: Uuid) {
    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        action,
        Some(resource),
        Some(serde_json::json!({ "id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}
