use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::testimonials::{CreateTestimonialRequest, TestimonialList, UpdateTestimonialRequest},
    entity::testimonials,
    error::{AppError, AppResult},
    media,
    middleware::auth::{AuthUser, ensure_admin},
    models::Testimonial,
    response::{ApiResponse, Meta},
    routes::params::TestimonialQuery,
    state::AppState,
};

/// Public submission; always lands unapproved regardless of payload.
pub async fn create_testimonial(
    state: &AppState,
    payload: CreateTestimonialRequest,
) -> AppResult<ApiResponse<Testimonial>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name", "name must not be empty"));
    }
    if payload.experience.trim().is_empty() {
        return Err(AppError::validation("experience", "experience must not be empty"));
    }
    validate_rating(payload.rating)?;
    if let Some(url) = payload.image_url.as_deref() {
        media::validate_image_url("image_url", url)?;
    }

    let testimonial = testimonials::ActiveModel {
        id: Set(Uuid::new_v4()),
        product: Set(payload.product),
        image_url: Set(payload.image_url),
        experience: Set(payload.experience),
        rating: Set(payload.rating),
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        is_approved: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Testimonial submitted",
        testimonial_from_entity(testimonial),
        Some(Meta::empty()),
    ))
}

/// Public listing shows approved rows only; admins may ask for the
/// moderation queue too.
pub async fn list_testimonials(
    state: &AppState,
    viewer: Option<&AuthUser>,
    query: TestimonialQuery,
) -> AppResult<ApiResponse<TestimonialList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let admin_view = viewer.is_some_and(|u| u.is_admin());
    let mut condition = Condition::all();
    if !(admin_view && query.include_unapproved) {
        condition = condition.add(testimonials::Column::IsApproved.eq(true));
    }

    let finder = testimonials::Entity::find()
        .filter(condition)
        .order_by_desc(testimonials::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(testimonial_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Testimonials",
        TestimonialList { items },
        Some(meta),
    ))
}

pub async fn update_testimonial(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTestimonialRequest,
) -> AppResult<ApiResponse<Testimonial>> {
    ensure_admin(user)?;

    if let Some(rating) = payload.rating {
        validate_rating(rating)?;
    }
    if let Some(url) = payload.image_url.as_deref() {
        media::validate_image_url("image_url", url)?;
    }

    let existing = testimonials::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: testimonials::ActiveModel = existing.into();
    if let Some(product) = payload.product {
        active.product = Set(product);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(experience) = payload.experience {
        active.experience = Set(experience);
    }
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    if let Some(is_approved) = payload.is_approved {
        active.is_approved = Set(is_approved);
    }
    active.updated_at = Set(Utc::now().into());

    let testimonial = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "testimonial_update",
        Some("testimonials"),
        Some(serde_json::json!({
            "testimonial_id": testimonial.id,
            "is_approved": testimonial.is_approved,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        testimonial_from_entity(testimonial),
        Some(Meta::empty()),
    ))
}

pub async fn delete_testimonial(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = testimonials::Entity::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_rating(rating: i16) -> AppResult<()> {
    if (1..=5).contains(&rating) {
        return Ok(());
    }
    Err(AppError::validation("rating", "rating must be between 1 and 5"))
}

fn testimonial_from_entity(model: testimonials::Model) -> Testimonial {
    Testimonial {
        id: model.id,
        product: model.product,
        image_url: model.image_url,
        experience: model.experience,
        rating: model.rating,
        name: model.name,
        email: model.email,
        phone: model.phone,
        is_approved: model.is_approved,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
