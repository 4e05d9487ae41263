use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::taxonomy::{BrandList, CategoryList, CreateNamedRequest, CreateOptionRequest, OptionList, TagList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Brand, Category, GlobalOption},
    response::ApiResponse,
    routes::params::NameSearchQuery,
    services::taxonomy_service,
    state::AppState,
};

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", delete(delete_category))
}

pub fn brand_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/{id}", delete(delete_brand))
}

pub fn tag_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags))
        .route("/{id}", delete(delete_tag))
}

pub fn option_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_options).post(create_option))
        .route("/{id}", delete(delete_option))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("q" = Option<String>, Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Taxonomy"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<NameSearchQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = taxonomy_service::list_categories(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateNamedRequest,
    responses(
        (status = 200, description = "Category created", body = ApiResponse<Category>),
        (status = 409, description = "Name already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Taxonomy"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateNamedRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = taxonomy_service::create_category(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Taxonomy"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = taxonomy_service::delete_category(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/brands",
    params(
        ("q" = Option<String>, Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "List brands", body = ApiResponse<BrandList>)
    ),
    tag = "Taxonomy"
)]
pub async fn list_brands(
    State(state): State<AppState>,
    Query(query): Query<NameSearchQuery>,
) -> AppResult<Json<ApiResponse<BrandList>>> {
    let resp = taxonomy_service::list_brands(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/brands",
    request_body = CreateNamedRequest,
    responses(
        (status = 200, description = "Brand created", body = ApiResponse<Brand>),
        (status = 409, description = "Name already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Taxonomy"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateNamedRequest>,
) -> AppResult<Json<ApiResponse<Brand>>> {
    let resp = taxonomy_service::create_brand(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Taxonomy"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = taxonomy_service::delete_brand(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tags",
    params(
        ("q" = Option<String>, Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "List tags", body = ApiResponse<TagList>)
    ),
    tag = "Taxonomy"
)]
pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<NameSearchQuery>,
) -> AppResult<Json<ApiResponse<TagList>>> {
    let resp = taxonomy_service::list_tags(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(
        ("id" = Uuid, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Taxonomy"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = taxonomy_service::delete_tag(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/options",
    responses(
        (status = 200, description = "List global options", body = ApiResponse<OptionList>)
    ),
    tag = "Taxonomy"
)]
pub async fn list_options(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<OptionList>>> {
    let resp = taxonomy_service::list_options(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/options",
    request_body = CreateOptionRequest,
    responses(
        (status = 200, description = "Option created", body = ApiResponse<GlobalOption>),
        (status = 409, description = "Option already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Taxonomy"
)]
pub async fn create_option(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOptionRequest>,
) -> AppResult<Json<ApiResponse<GlobalOption>>> {
    let resp = taxonomy_service::create_option(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/options/{id}",
    params(
        ("id" = Uuid, Path, description = "Option ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Taxonomy"
)]
pub async fn delete_option(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = taxonomy_service::delete_option(&state, &user, id).await?;
    Ok(Json(resp))
}
