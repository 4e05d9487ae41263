use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::testimonials::{CreateTestimonialRequest, TestimonialList, UpdateTestimonialRequest},
    error::AppResult,
    middleware::auth::{AuthUser, MaybeAuthUser},
    models::Testimonial,
    response::ApiResponse,
    routes::params::TestimonialQuery,
    services::testimonial_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_testimonials).post(create_testimonial))
        .route(
            "/{id}",
            axum::routing::patch(update_testimonial).delete(delete_testimonial),
        )
}

#[utoipa::path(
    post,
    path = "/api/testimonials",
    request_body = CreateTestimonialRequest,
    responses(
        (status = 200, description = "Testimonial submitted (pending approval)", body = ApiResponse<Testimonial>),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Testimonials"
)]
pub async fn create_testimonial(
    State(state): State<AppState>,
    Json(payload): Json<CreateTestimonialRequest>,
) -> AppResult<Json<ApiResponse<Testimonial>>> {
    let resp = testimonial_service::create_testimonial(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/testimonials",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("include_unapproved" = Option<bool>, Query, description = "Admin only: include the moderation queue"),
    ),
    responses(
        (status = 200, description = "List testimonials", body = ApiResponse<TestimonialList>)
    ),
    tag = "Testimonials"
)]
pub async fn list_testimonials(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Query(query): Query<TestimonialQuery>,
) -> AppResult<Json<ApiResponse<TestimonialList>>> {
    let resp = testimonial_service::list_testimonials(&state, viewer.0.as_ref(), query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/testimonials/{id}",
    params(
        ("id" = Uuid, Path, description = "Testimonial ID")
    ),
    request_body = UpdateTestimonialRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<Testimonial>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
pub async fn update_testimonial(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTestimonialRequest>,
) -> AppResult<Json<ApiResponse<Testimonial>>> {
    let resp = testimonial_service::update_testimonial(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/testimonials/{id}",
    params(
        ("id" = Uuid, Path, description = "Testimonial ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = testimonial_service::delete_testimonial(&state, &user, id).await?;
    Ok(Json(resp))
}
