use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    cache::CacheKey,
    catalog::{
        images::{self, GalleryImageInput},
        pricing, slug,
    },
    dto::products::{
        AddImagesRequest, CreateProductRequest, CreateVariantRequest, GalleryImagePayload,
        ImageList, ProductList, ReplaceGalleryRequest, UpdateProductRequest, UpdateVariantRequest,
        VariantList,
    },
    entity::{
        brands, categories, global_options, product_categories, product_images, product_options,
        product_tags, product_variants, products, tags,
    },
    error::{AppError, AppResult},
    media,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Brand, Category, GlobalOption, OptionKind, Product, ProductImage, ProductVariant, Tag},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::taxonomy_service,
    state::AppState,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

const CACHE_ENTITY: &str = "products";
const CONDITIONS: [&str; 2] = ["new", "ex_dubai"];

#[derive(Serialize, Deserialize)]
struct CachedProductPage {
    items: Vec<Product>,
    total: i64,
}

pub async fn list_products(
    state: &AppState,
    viewer: Option<&AuthUser>,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let admin_view = viewer.is_some_and(|u| u.is_admin());

    let cache_key = CacheKey::new(CACHE_ENTITY)
        .filter("page", page)
        .filter("per_page", limit)
        .filter_opt("q", query.q.as_deref())
        .filter_opt("category", query.category.as_deref())
        .filter_opt("brand_id", query.brand_id)
        .filter_opt("is_featured", query.is_featured)
        .filter_opt("condition", query.condition.as_deref())
        .filter_opt("min_price", query.min_price)
        .filter_opt("max_price", query.max_price)
        .filter_opt("sort_by", query.sort_by.map(|s| s.as_str()))
        .filter_opt("sort_order", query.sort_order.map(|s| s.as_str()));

    // Admin listings include inactive rows and must not share pages
    // with the public view.
    if !admin_view {
        if let Some(cached) = state.cache.get::<CachedProductPage>(&cache_key) {
            let meta = Meta::new(page, limit, cached.total);
            return Ok(ApiResponse::success(
                "Products",
                ProductList { items: cached.items },
                Some(meta),
            ));
        }
    }

    let mut condition = Condition::all();
    if !admin_view {
        condition = condition.add(products::Column::IsActive.eq(true));
    }

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(products::Column::Title).ilike(pattern.clone()))
                .add(Expr::col(products::Column::Description).ilike(pattern)),
        );
    }

    if let Some(category_slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let category = categories::Entity::find()
            .filter(categories::Column::Slug.eq(category_slug.clone()))
            .one(&state.orm)
            .await?;
        match category {
            Some(category) => {
                let product_ids: Vec<Uuid> = product_categories::Entity::find()
                    .filter(product_categories::Column::CategoryId.eq(category.id))
                    .all(&state.orm)
                    .await?
                    .into_iter()
                    .map(|link| link.product_id)
                    .collect();
                condition = condition.add(products::Column::Id.is_in(product_ids));
            }
            // Unknown category slug matches nothing rather than erroring,
            // so stale storefront links degrade gracefully.
            None => condition = condition.add(products::Column::Id.is_in(Vec::<Uuid>::new())),
        }
    }

    if let Some(brand_id) = query.brand_id {
        condition = condition.add(products::Column::BrandId.eq(brand_id));
    }
    if let Some(is_featured) = query.is_featured {
        condition = condition.add(products::Column::IsFeatured.eq(is_featured));
    }
    if let Some(cond) = query.condition.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(products::Column::Condition.eq(cond.clone()));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(products::Column::FinalPrice.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(products::Column::FinalPrice.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => products::Column::CreatedAt,
        ProductSortBy::Price => products::Column::FinalPrice,
        ProductSortBy::Title => products::Column::Title,
    };

    let mut finder = products::Entity::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = hydrate_products(&state.orm, models).await?;

    if !admin_view {
        state.cache.put(
            cache_key,
            &CachedProductPage {
                items: items.clone(),
                total,
            },
        );
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn featured_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let cache_key = CacheKey::new(CACHE_ENTITY).filter("view", "featured");
    if let Some(cached) = state.cache.get::<CachedProductPage>(&cache_key) {
        return Ok(ApiResponse::success(
            "Featured products",
            ProductList { items: cached.items },
            Some(Meta::empty()),
        ));
    }

    let models = products::Entity::find()
        .filter(products::Column::IsActive.eq(true))
        .filter(products::Column::IsFeatured.eq(true))
        .order_by_desc(products::Column::CreatedAt)
        .limit(12)
        .all(&state.orm)
        .await?;

    let items = hydrate_products(&state.orm, models).await?;
    state.cache.put(
        cache_key,
        &CachedProductPage {
            items: items.clone(),
            total: items.len() as i64,
        },
    );

    Ok(ApiResponse::success(
        "Featured products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let model = products::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let product = hydrate_products(&state.orm, vec![model])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let price = pricing::validate_price(payload.price.unwrap_or_default())?;
    let discount = pricing::validate_discount(payload.discount.unwrap_or_default())?;
    let stock = payload.stock.unwrap_or(0);
    if stock < 0 {
        return Err(AppError::validation("stock", "stock must not be negative"));
    }
    if let Some(condition) = payload.condition.as_deref() {
        validate_condition(condition)?;
    }
    if let Some(cover) = payload.cover_image.as_deref() {
        media::validate_image_url("cover_image", cover)?;
    }
    validate_gallery(&payload.gallery)?;

    let txn = state.orm.begin().await?;

    if let Some(brand_id) = payload.brand_id {
        ensure_brand_exists(&txn, brand_id).await?;
    }
    ensure_categories_exist(&txn, &payload.category_ids).await?;
    ensure_options_exist(&txn, &payload.option_ids).await?;

    let slug = unique_product_slug(&txn, &payload.title, None).await?;
    let final_price = pricing::resolve_final_price(price, discount);

    let id = Uuid::new_v4();
    let product = products::ActiveModel {
        id: Set(id),
        title: Set(payload.title),
        slug: Set(slug),
        description: Set(payload.description),
        brand_id: Set(payload.brand_id),
        price: Set(price),
        discount: Set(discount),
        final_price: Set(Some(final_price)),
        stock: Set(stock),
        condition: Set(payload.condition),
        cover_image: Set(None),
        is_active: Set(payload.is_active.unwrap_or(true)),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    set_categories(&txn, id, &payload.category_ids).await?;
    set_options(&txn, id, &payload.option_ids).await?;
    let tag_ids = taxonomy_service::ensure_tags(&txn, &payload.tag_names).await?;
    set_tags(&txn, id, &tag_ids).await?;

    // An explicit cover becomes the primary image; otherwise the first
    // primary claim in the gallery wins the cover.
    let mut incoming: Vec<GalleryImageInput> = Vec::new();
    if let Some(cover) = payload.cover_image {
        incoming.push(GalleryImageInput {
            image_url: cover,
            alt_text: None,
            is_primary: true,
        });
    }
    incoming.extend(payload.gallery.into_iter().map(GalleryImageInput::from));
    if !incoming.is_empty() {
        images::append_product_images(&txn, id, None, incoming).await?;
    }

    txn.commit().await?;
    state.cache.invalidate(CACHE_ENTITY);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let product = hydrate_products(&state.orm, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    if let Some(price) = payload.price {
        pricing::validate_price(price)?;
    }
    if let Some(discount) = payload.discount {
        pricing::validate_discount(discount)?;
    }
    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(AppError::validation("stock", "stock must not be negative"));
        }
    }
    if let Some(condition) = payload.condition.as_deref() {
        validate_condition(condition)?;
    }

    let txn = state.orm.begin().await?;

    let existing = products::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(Some(brand_id)) = payload.brand_id {
        ensure_brand_exists(&txn, brand_id).await?;
    }
    if let Some(category_ids) = payload.category_ids.as_deref() {
        ensure_categories_exist(&txn, category_ids).await?;
    }
    if let Some(option_ids) = payload.option_ids.as_deref() {
        ensure_options_exist(&txn, option_ids).await?;
    }

    let title_changed = payload
        .title
        .as_ref()
        .is_some_and(|title| *title != existing.title);

    let effective_price = payload.price.unwrap_or(existing.price);
    let effective_discount = payload.discount.unwrap_or(existing.discount);
    let price_changed = payload.price.is_some() || payload.discount.is_some();

    let mut active: products::ActiveModel = existing.clone().into();
    if let Some(title) = payload.title {
        if title_changed {
            // Slug follows the title; unrelated updates leave it alone.
            let slug = unique_product_slug(&txn, &title, Some(id)).await?;
            active.slug = Set(slug);
        }
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(brand_id) = payload.brand_id {
        active.brand_id = Set(brand_id);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(discount) = payload.discount {
        active.discount = Set(discount);
    }
    if price_changed {
        active.final_price = Set(Some(pricing::resolve_final_price(
            effective_price,
            effective_discount,
        )));
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(condition) = payload.condition {
        active.condition = Set(Some(condition));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&txn).await?;

    if let Some(category_ids) = payload.category_ids {
        product_categories::Entity::delete_many()
            .filter(product_categories::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        set_categories(&txn, id, &category_ids).await?;
    }
    if let Some(tag_names) = payload.tag_names {
        product_tags::Entity::delete_many()
            .filter(product_tags::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        let tag_ids = taxonomy_service::ensure_tags(&txn, &tag_names).await?;
        set_tags(&txn, id, &tag_ids).await?;
    }
    if let Some(option_ids) = payload.option_ids {
        product_options::Entity::delete_many()
            .filter(product_options::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        set_options(&txn, id, &option_ids).await?;
    }

    txn.commit().await?;
    state.cache.invalidate(CACHE_ENTITY);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let product = hydrate_products(&state.orm, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = products::Entity::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    state.cache.invalidate(CACHE_ENTITY);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

pub async fn replace_gallery(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: ReplaceGalleryRequest,
) -> AppResult<ApiResponse<ImageList>> {
    ensure_admin(user)?;
    validate_gallery(&payload.images)?;

    let incoming = payload.images.into_iter().map(GalleryImageInput::from).collect();

    let txn = state.orm.begin().await?;
    let final_set = images::replace_product_gallery(&txn, product_id, incoming).await?;
    txn.commit().await?;

    state.cache.invalidate(CACHE_ENTITY);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_gallery_replace",
        Some("product_images"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let items = final_set.into_iter().map(image_from_entity).collect();
    Ok(ApiResponse::success(
        "Gallery replaced",
        ImageList { items },
        Some(Meta::empty()),
    ))
}

pub async fn add_images(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: AddImagesRequest,
) -> AppResult<ApiResponse<ImageList>> {
    ensure_admin(user)?;
    if payload.images.is_empty() {
        return Err(AppError::validation("images", "no images supplied"));
    }
    validate_gallery(&payload.images)?;

    let txn = state.orm.begin().await?;

    products::Entity::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if let Some(variant_id) = payload.variant_id {
        product_variants::Entity::find_by_id(variant_id)
            .one(&txn)
            .await?
            .filter(|v| v.product_id == product_id)
            .ok_or(AppError::NotFound)?;
    }

    let incoming = payload.images.into_iter().map(GalleryImageInput::from).collect();
    let inserted =
        images::append_product_images(&txn, product_id, payload.variant_id, incoming).await?;

    txn.commit().await?;
    state.cache.invalidate(CACHE_ENTITY);

    let items = inserted.into_iter().map(image_from_entity).collect();
    Ok(ApiResponse::success(
        "Images added",
        ImageList { items },
        Some(Meta::empty()),
    ))
}

pub async fn set_primary_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<ApiResponse<crate::models::ProductImage>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let image = images::set_primary_product_image(&txn, product_id, image_id).await?;
    txn.commit().await?;

    state.cache.invalidate(CACHE_ENTITY);

    Ok(ApiResponse::success(
        "Primary image set",
        image_from_entity(image),
        Some(Meta::empty()),
    ))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    images::delete_product_image(&txn, product_id, image_id).await?;
    txn.commit().await?;

    state.cache.invalidate(CACHE_ENTITY);

    Ok(ApiResponse::success(
        "Image deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

pub async fn list_variants(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<VariantList>> {
    products::Entity::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = product_variants::Entity::find()
        .filter(product_variants::Column::ProductId.eq(product_id))
        .order_by_desc(product_variants::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(variant_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Variants",
        VariantList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateVariantRequest,
) -> AppResult<ApiResponse<ProductVariant>> {
    ensure_admin(user)?;

    if payload.sku.trim().is_empty() {
        return Err(AppError::validation("sku", "sku must not be empty"));
    }
    pricing::validate_price(payload.price)?;
    if let Some(compare_at) = payload.compare_at_price {
        pricing::validate_price(compare_at)?;
    }
    let stock = payload.stock.unwrap_or(0);
    if stock < 0 {
        return Err(AppError::validation("stock", "stock must not be negative"));
    }

    products::Entity::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let sku_taken = product_variants::Entity::find()
        .filter(product_variants::Column::Sku.eq(payload.sku.clone()))
        .count(&state.orm)
        .await?
        > 0;
    if sku_taken {
        return Err(AppError::Conflict(format!(
            "sku '{}' already exists",
            payload.sku
        )));
    }

    let variant = product_variants::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        sku: Set(payload.sku),
        color: Set(payload.color),
        ram_gb: Set(payload.ram_gb),
        storage_gb: Set(payload.storage_gb),
        processor: Set(payload.processor),
        size: Set(payload.size),
        price: Set(payload.price),
        compare_at_price: Set(payload.compare_at_price),
        stock: Set(stock),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    state.cache.invalidate(CACHE_ENTITY);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "variant_create",
        Some("product_variants"),
        Some(serde_json::json!({ "variant_id": variant.id, "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Variant created",
        variant_from_entity(variant),
        Some(Meta::empty()),
    ))
}

pub async fn update_variant(
    state: &AppState,
    user: &AuthUser,
    variant_id: Uuid,
    payload: UpdateVariantRequest,
) -> AppResult<ApiResponse<ProductVariant>> {
    ensure_admin(user)?;

    if let Some(price) = payload.price {
        pricing::validate_price(price)?;
    }
    if let Some(compare_at) = payload.compare_at_price {
        pricing::validate_price(compare_at)?;
    }
    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(AppError::validation("stock", "stock must not be negative"));
        }
    }

    let existing = product_variants::Entity::find_by_id(variant_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(sku) = payload.sku.as_ref() {
        if sku.trim().is_empty() {
            return Err(AppError::validation("sku", "sku must not be empty"));
        }
        if *sku != existing.sku {
            let taken = product_variants::Entity::find()
                .filter(product_variants::Column::Sku.eq(sku.clone()))
                .filter(product_variants::Column::Id.ne(variant_id))
                .count(&state.orm)
                .await?
                > 0;
            if taken {
                return Err(AppError::Conflict(format!("sku '{sku}' already exists")));
            }
        }
    }

    let mut active: product_variants::ActiveModel = existing.into();
    if let Some(sku) = payload.sku {
        active.sku = Set(sku);
    }
    if let Some(color) = payload.color {
        active.color = Set(Some(color));
    }
    if let Some(ram_gb) = payload.ram_gb {
        active.ram_gb = Set(Some(ram_gb));
    }
    if let Some(storage_gb) = payload.storage_gb {
        active.storage_gb = Set(Some(storage_gb));
    }
    if let Some(processor) = payload.processor {
        active.processor = Set(Some(processor));
    }
    if let Some(size) = payload.size {
        active.size = Set(Some(size));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(compare_at) = payload.compare_at_price {
        active.compare_at_price = Set(Some(compare_at));
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let variant = active.update(&state.orm).await?;
    state.cache.invalidate(CACHE_ENTITY);

    Ok(ApiResponse::success(
        "Variant updated",
        variant_from_entity(variant),
        Some(Meta::empty()),
    ))
}

pub async fn delete_variant(
    state: &AppState,
    user: &AuthUser,
    variant_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = product_variants::Entity::delete_by_id(variant_id)
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    state.cache.invalidate(CACHE_ENTITY);
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn unique_product_slug<C: ConnectionTrait>(
    conn: &C,
    title: &str,
    exclude: Option<Uuid>,
) -> AppResult<String> {
    slug::unique_slug(title, |candidate| async move {
        let mut finder = products::Entity::find().filter(products::Column::Slug.eq(candidate));
        if let Some(id) = exclude {
            finder = finder.filter(products::Column::Id.ne(id));
        }
        Ok(finder.count(conn).await? > 0)
    })
    .await
}

fn validate_condition(condition: &str) -> AppResult<()> {
    if CONDITIONS.contains(&condition) {
        return Ok(());
    }
    Err(AppError::validation(
        "condition",
        format!("condition must be one of {CONDITIONS:?}"),
    ))
}

fn validate_gallery(gallery: &[GalleryImagePayload]) -> AppResult<()> {
    for (i, image) in gallery.iter().enumerate() {
        media::validate_image_url(&format!("gallery[{i}]"), &image.image_url)?;
    }
    Ok(())
}

async fn ensure_brand_exists<C: ConnectionTrait>(conn: &C, brand_id: Uuid) -> AppResult<()> {
    brands::Entity::find_by_id(brand_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::validation("brand_id", "brand does not exist"))
}

async fn ensure_categories_exist<C: ConnectionTrait>(
    conn: &C,
    category_ids: &[Uuid],
) -> AppResult<()> {
    if category_ids.is_empty() {
        return Ok(());
    }
    let found = categories::Entity::find()
        .filter(categories::Column::Id.is_in(category_ids.to_vec()))
        .count(conn)
        .await? as usize;
    if found != category_ids.len() {
        return Err(AppError::validation(
            "category_ids",
            "one or more categories do not exist",
        ));
    }
    Ok(())
}

async fn ensure_options_exist<C: ConnectionTrait>(conn: &C, option_ids: &[Uuid]) -> AppResult<()> {
    if option_ids.is_empty() {
        return Ok(());
    }
    let found = global_options::Entity::find()
        .filter(global_options::Column::Id.is_in(option_ids.to_vec()))
        .count(conn)
        .await? as usize;
    if found != option_ids.len() {
        return Err(AppError::validation(
            "option_ids",
            "one or more options do not exist",
        ));
    }
    Ok(())
}

async fn set_categories<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    category_ids: &[Uuid],
) -> AppResult<()> {
    for category_id in category_ids {
        product_categories::ActiveModel {
            product_id: Set(product_id),
            category_id: Set(*category_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn set_tags<C: ConnectionTrait>(conn: &C, product_id: Uuid, tag_ids: &[Uuid]) -> AppResult<()> {
    for tag_id in tag_ids {
        product_tags::ActiveModel {
            product_id: Set(product_id),
            tag_id: Set(*tag_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn set_options<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    option_ids: &[Uuid],
) -> AppResult<()> {
    for option_id in option_ids {
        product_options::ActiveModel {
            product_id: Set(product_id),
            option_id: Set(*option_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Resolve the nested representation for a batch of product rows in a
/// fixed number of queries.
pub async fn hydrate_products<C: ConnectionTrait>(
    conn: &C,
    models: Vec<products::Model>,
) -> AppResult<Vec<Product>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let brand_rows = models.load_one(brands::Entity, conn).await?;
    let category_rows = models
        .load_many_to_many(categories::Entity, product_categories::Entity, conn)
        .await?;
    let tag_rows = models
        .load_many_to_many(tags::Entity, product_tags::Entity, conn)
        .await?;
    let option_rows = models
        .load_many_to_many(global_options::Entity, product_options::Entity, conn)
        .await?;
    let image_rows = models.load_many(product_images::Entity, conn).await?;
    let variant_rows = models.load_many(product_variants::Entity, conn).await?;

    let mut out = Vec::with_capacity(models.len());
    for (i, model) in models.into_iter().enumerate() {
        let options = option_rows[i]
            .iter()
            .map(|o| option_from_entity(o.clone()))
            .collect::<AppResult<Vec<GlobalOption>>>()?;
        let mut images: Vec<ProductImage> = image_rows[i]
            .iter()
            .cloned()
            .map(image_from_entity)
            .collect();
        images.sort_by(|a, b| {
            b.is_primary
                .cmp(&a.is_primary)
                .then(a.uploaded_at.cmp(&b.uploaded_at))
        });

        out.push(Product {
            id: model.id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            brand: brand_rows[i].clone().map(brand_from_entity),
            categories: category_rows[i]
                .iter()
                .cloned()
                .map(category_from_entity)
                .collect(),
            tags: tag_rows[i].iter().cloned().map(tag_from_entity).collect(),
            options,
            cover_image: model.cover_image,
            images,
            variants: variant_rows[i]
                .iter()
                .cloned()
                .map(variant_from_entity)
                .collect(),
            price: model.price,
            discount: model.discount,
            final_price: model.final_price,
            stock: model.stock,
            condition: model.condition,
            is_active: model.is_active,
            is_featured: model.is_featured,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        });
    }

    Ok(out)
}

pub fn brand_from_entity(model: brands::Model) -> Brand {
    Brand {
        id: model.id,
        name: model.name,
        slug: model.slug,
    }
}

pub fn category_from_entity(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
    }
}

pub fn tag_from_entity(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        slug: model.slug,
    }
}

pub fn option_from_entity(model: global_options::Model) -> AppResult<GlobalOption> {
    Ok(GlobalOption {
        id: model.id,
        kind: OptionKind::parse(&model.kind)?,
        value: model.value,
    })
}

pub fn image_from_entity(model: product_images::Model) -> ProductImage {
    ProductImage {
        id: model.id,
        variant_id: model.variant_id,
        image_url: model.image_url,
        alt_text: model.alt_text,
        is_primary: model.is_primary,
        uploaded_at: model.uploaded_at.with_timezone(&Utc),
    }
}

pub fn variant_from_entity(model: product_variants::Model) -> ProductVariant {
    ProductVariant {
        id: model.id,
        product_id: model.product_id,
        sku: model.sku,
        color: model.color,
        ram_gb: model.ram_gb,
        storage_gb: model.storage_gb,
        processor: model.processor,
        size: model.size,
        price: model.price,
        compare_at_price: model.compare_at_price,
        stock: model.stock,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
