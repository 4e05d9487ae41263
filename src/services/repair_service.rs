use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    catalog::images::{self, GalleryImageInput},
    dto::{
        products::GalleryImagePayload,
        repairs::{AddRepairImagesRequest, CreateRepairRequest, RepairImageList, RepairList, UpdateRepairStatusRequest},
    },
    entity::{repair_images, repair_requests},
    error::{AppError, AppResult},
    media,
    middleware::auth::{AuthUser, ensure_admin},
    models::{RepairImage, RepairRequest, RepairStatus},
    response::{ApiResponse, Meta},
    routes::params::RepairListQuery,
    state::AppState,
};

/// Public intake. Images may arrive with the request; any primary claim
/// is honored through the sync rule so the cover is set on day one.
pub async fn create_repair(
    state: &AppState,
    payload: CreateRepairRequest,
) -> AppResult<ApiResponse<RepairRequest>> {
    if payload.client_name.as_deref().unwrap_or("").trim().is_empty()
        && payload.client_phone.as_deref().unwrap_or("").trim().is_empty()
        && payload.client_email.as_deref().unwrap_or("").trim().is_empty()
    {
        return Err(AppError::validation(
            "client_name",
            "at least one contact field is required",
        ));
    }
    validate_images(&payload.images)?;

    let txn = state.orm.begin().await?;

    let id = Uuid::new_v4();
    let request = repair_requests::ActiveModel {
        id: Set(id),
        client_name: Set(payload.client_name),
        client_email: Set(payload.client_email),
        client_phone: Set(payload.client_phone),
        device_type: Set(payload.device_type),
        issue_description: Set(payload.issue_description),
        status: Set(RepairStatus::Pending.as_str().to_string()),
        cover_image: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    if !payload.images.is_empty() {
        let incoming = payload.images.into_iter().map(GalleryImageInput::from).collect();
        images::append_repair_images(&txn, id, incoming).await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "repair_create",
        Some("repair_requests"),
        Some(serde_json::json!({ "repair_id": request.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let request = hydrate_repairs(&state.orm, vec![request]).await?.remove(0);
    Ok(ApiResponse::success(
        "Repair request received",
        request,
        Some(Meta::empty()),
    ))
}

pub async fn list_repairs(
    state: &AppState,
    user: &AuthUser,
    query: RepairListQuery,
) -> AppResult<ApiResponse<RepairList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        // Reject unknown filters instead of silently matching nothing.
        RepairStatus::parse(status)?;
        condition = condition.add(repair_requests::Column::Status.eq(status.clone()));
    }

    let finder = repair_requests::Entity::find()
        .filter(condition)
        .order_by_desc(repair_requests::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = hydrate_repairs(&state.orm, models).await?;
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Repairs", RepairList { items }, Some(meta)))
}

pub async fn get_repair(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<RepairRequest>> {
    ensure_admin(user)?;
    let model = repair_requests::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let request = hydrate_repairs(&state.orm, vec![model]).await?.remove(0);
    Ok(ApiResponse::success("Repair", request, None))
}

pub async fn update_repair_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRepairStatusRequest,
) -> AppResult<ApiResponse<RepairRequest>> {
    ensure_admin(user)?;

    let existing = repair_requests::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: repair_requests::ActiveModel = existing.into();
    active.status = Set(payload.status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let request = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "repair_status_update",
        Some("repair_requests"),
        Some(serde_json::json!({ "repair_id": request.id, "status": request.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let request = hydrate_repairs(&state.orm, vec![request]).await?.remove(0);
    Ok(ApiResponse::success(
        "Status updated",
        request,
        Some(Meta::empty()),
    ))
}

pub async fn add_repair_images(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AddRepairImagesRequest,
) -> AppResult<ApiResponse<RepairImageList>> {
    ensure_admin(user)?;
    if payload.images.is_empty() {
        return Err(AppError::validation("images", "no images supplied"));
    }
    validate_images(&payload.images)?;

    let txn = state.orm.begin().await?;

    repair_requests::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let incoming = payload.images.into_iter().map(GalleryImageInput::from).collect();
    let inserted = images::append_repair_images(&txn, id, incoming).await?;

    txn.commit().await?;

    let items = inserted.into_iter().map(repair_image_from_entity).collect();
    Ok(ApiResponse::success(
        "Images added",
        RepairImageList { items },
        Some(Meta::empty()),
    ))
}

pub async fn set_primary_repair_image(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    image_id: Uuid,
) -> AppResult<ApiResponse<RepairImage>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let image = images::set_primary_repair_image(&txn, id, image_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Primary image set",
        repair_image_from_entity(image),
        Some(Meta::empty()),
    ))
}

pub async fn delete_repair_image(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    image_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    images::delete_repair_image(&txn, id, image_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Image deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn delete_repair(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = repair_requests::Entity::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "repair_delete",
        Some("repair_requests"),
        Some(serde_json::json!({ "repair_id": id })),
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

fn validate_images(images: &[GalleryImagePayload]) -> AppResult<()> {
    for (i, image) in images.iter().enumerate() {
        media::validate_image_url(&format!("images[{i}]"), &image.image_url)?;
    }
    Ok(())
}

async fn hydrate_repairs<C: ConnectionTrait>(
    conn: &C,
    models: Vec<repair_requests::Model>,
) -> AppResult<Vec<RepairRequest>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let image_rows = models.load_many(repair_images::Entity, conn).await?;

    let mut out = Vec::with_capacity(models.len());
    for (i, model) in models.into_iter().enumerate() {
        let mut images: Vec<RepairImage> = image_rows[i]
            .iter()
            .cloned()
            .map(repair_image_from_entity)
            .collect();
        images.sort_by(|a, b| {
            b.is_primary
                .cmp(&a.is_primary)
                .then(a.uploaded_at.cmp(&b.uploaded_at))
        });

        out.push(RepairRequest {
            id: model.id,
            client_name: model.client_name,
            client_email: model.client_email,
            client_phone: model.client_phone,
            device_type: model.device_type,
            issue_description: model.issue_description,
            status: RepairStatus::parse(&model.status)?,
            cover_image: model.cover_image,
            images,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        });
    }

    Ok(out)
}

fn repair_image_from_entity(model: repair_images::Model) -> RepairImage {
    RepairImage {
        id: model.id,
        image_url: model.image_url,
        alt_text: model.alt_text,
        is_primary: model.is_primary,
        uploaded_at: model.uploaded_at.with_timezone(&Utc),
    }
}
