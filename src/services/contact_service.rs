use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::{
    dto::contact::{ContactList, CreateContactRequest},
    entity::contact_messages,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::ContactMessage,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn create_message(
    state: &AppState,
    payload: CreateContactRequest,
) -> AppResult<ApiResponse<ContactMessage>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name", "name must not be empty"));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::validation("email", "a valid email is required"));
    }
    if payload.message.trim().is_empty() {
        return Err(AppError::validation("message", "message must not be empty"));
    }

    let message = contact_messages::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        subject: Set(payload.subject),
        message: Set(payload.message),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // Admins pick these up from the dashboard; the notification email
    // the old system sent is out of scope here.
    tracing::info!(
        message_id = %message.id,
        from = %message.email,
        "contact message received"
    );

    Ok(ApiResponse::success(
        "Message received",
        message_from_entity(message),
        Some(Meta::empty()),
    ))
}

pub async fn list_messages(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ContactList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = contact_messages::Entity::find()
        .order_by_desc(contact_messages::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(message_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Messages",
        ContactList { items },
        Some(meta),
    ))
}

fn message_from_entity(model: contact_messages::Model) -> ContactMessage {
    ContactMessage {
        id: model.id,
        name: model.name,
        email: model.email,
        subject: model.subject,
        message: model.message,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
