use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::repairs::{
        AddRepairImagesRequest, CreateRepairRequest, RepairImageList, RepairList,
        UpdateRepairStatusRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{RepairImage, RepairRequest},
    response::ApiResponse,
    routes::params::RepairListQuery,
    services::repair_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_repairs).post(create_repair))
        .route("/{id}", get(get_repair).delete(delete_repair))
        .route("/{id}/status", patch(update_repair_status))
        .route("/{id}/images", post(add_repair_images))
        .route("/{id}/images/{image_id}/primary", post(set_primary_repair_image))
        .route("/{id}/images/{image_id}", delete(delete_repair_image))
}

#[utoipa::path(
    post,
    path = "/api/repairs",
    request_body = CreateRepairRequest,
    responses(
        (status = 200, description = "Repair request received", body = ApiResponse<RepairRequest>),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Repairs"
)]
pub async fn create_repair(
    State(state): State<AppState>,
    Json(payload): Json<CreateRepairRequest>,
) -> AppResult<Json<ApiResponse<RepairRequest>>> {
    let resp = repair_service::create_repair(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/repairs",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
    ),
    responses(
        (status = 200, description = "List repair requests", body = ApiResponse<RepairList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Repairs"
)]
pub async fn list_repairs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RepairListQuery>,
) -> AppResult<Json<ApiResponse<RepairList>>> {
    let resp = repair_service::list_repairs(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/repairs/{id}",
    params(
        ("id" = Uuid, Path, description = "Repair request ID")
    ),
    responses(
        (status = 200, description = "Get repair request", body = ApiResponse<RepairRequest>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Repairs"
)]
pub async fn get_repair(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RepairRequest>>> {
    let resp = repair_service::get_repair(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/repairs/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Repair request ID")
    ),
    request_body = UpdateRepairStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<RepairRequest>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Repairs"
)]
pub async fn update_repair_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRepairStatusRequest>,
) -> AppResult<Json<ApiResponse<RepairRequest>>> {
    let resp = repair_service::update_repair_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/repairs/{id}/images",
    params(
        ("id" = Uuid, Path, description = "Repair request ID")
    ),
    request_body = AddRepairImagesRequest,
    responses(
        (status = 200, description = "Images added", body = ApiResponse<RepairImageList>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Repairs"
)]
pub async fn add_repair_images(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddRepairImagesRequest>,
) -> AppResult<Json<ApiResponse<RepairImageList>>> {
    let resp = repair_service::add_repair_images(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/repairs/{id}/images/{image_id}/primary",
    params(
        ("id" = Uuid, Path, description = "Repair request ID"),
        ("image_id" = Uuid, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Primary image set", body = ApiResponse<RepairImage>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Repairs"
)]
pub async fn set_primary_repair_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<RepairImage>>> {
    let resp = repair_service::set_primary_repair_image(&state, &user, id, image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/repairs/{id}/images/{image_id}",
    params(
        ("id" = Uuid, Path, description = "Repair request ID"),
        ("image_id" = Uuid, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Repairs"
)]
pub async fn delete_repair_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = repair_service::delete_repair_image(&state, &user, id, image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/repairs/{id}",
    params(
        ("id" = Uuid, Path, description = "Repair request ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Repairs"
)]
pub async fn delete_repair(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = repair_service::delete_repair(&state, &user, id).await?;
    Ok(Json(resp))
}
