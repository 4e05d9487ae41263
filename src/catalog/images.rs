use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::{product_images, products, repair_images, repair_requests};
use crate::error::{AppError, AppResult};

/// One incoming gallery entry, as submitted by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryImageInput {
    pub image_url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
}

/// The stored images the planner diffs against.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingImage {
    pub id: Uuid,
    pub image_url: String,
    pub is_primary: bool,
}

/// Outcome of diffing a wholesale gallery replacement against the
/// current image set. Rows whose content reference is unchanged are
/// retained (same id, same upload time) instead of being recreated.
#[derive(Debug, Default, PartialEq)]
pub struct GalleryPlan {
    pub delete: Vec<Uuid>,
    pub insert: Vec<GalleryImageInput>,
    /// (retained row id, whether it ends up primary)
    pub retain: Vec<(Uuid, bool)>,
    /// Cover reference after the replacement; None clears the cover.
    pub cover: Option<String>,
}

/// Index of the image that wins the primary flag: the first claim in
/// input order. Duplicate claims are demoted.
pub fn pick_primary(incoming: &[GalleryImageInput]) -> Option<usize> {
    incoming.iter().position(|img| img.is_primary)
}

/// Diff `incoming` (the authoritative new gallery, in order) against
/// `existing`. Pure; the caller applies the plan in one transaction.
pub fn plan_gallery(existing: &[ExistingImage], incoming: &[GalleryImageInput]) -> GalleryPlan {
    // Duplicate URLs in the submission collapse to their first occurrence.
    let mut deduped: Vec<GalleryImageInput> = Vec::with_capacity(incoming.len());
    for img in incoming {
        if !deduped.iter().any(|seen| seen.image_url == img.image_url) {
            deduped.push(img.clone());
        }
    }

    let primary_url = pick_primary(&deduped).map(|i| deduped[i].image_url.clone());

    let mut plan = GalleryPlan {
        cover: primary_url.clone(),
        ..GalleryPlan::default()
    };

    for img in &deduped {
        let is_primary = primary_url.as_deref() == Some(img.image_url.as_str());
        match existing.iter().find(|e| e.image_url == img.image_url) {
            Some(kept) => plan.retain.push((kept.id, is_primary)),
            None => plan.insert.push(GalleryImageInput {
                image_url: img.image_url.clone(),
                alt_text: img.alt_text.clone(),
                is_primary,
            }),
        }
    }

    for e in existing {
        if !deduped.iter().any(|img| img.image_url == e.image_url) {
            plan.delete.push(e.id);
        }
    }

    plan
}

// ---------------------------------------------------------------------------
// Product galleries
// ---------------------------------------------------------------------------

/// Mark one product image primary: demote every sibling of the same
/// owner, promote the target, and mirror the product cover when the
/// image belongs to the product itself (variant images have no cover to
/// mirror). Idempotent. Run inside a transaction.
pub async fn set_primary_product_image<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<product_images::Model> {
    let image = product_images::Entity::find_by_id(image_id)
        .one(conn)
        .await?
        .filter(|img| img.product_id == product_id)
        .ok_or(AppError::NotFound)?;

    let mut siblings = product_images::Entity::update_many()
        .col_expr(product_images::Column::IsPrimary, Expr::value(false))
        .filter(product_images::Column::ProductId.eq(product_id))
        .filter(product_images::Column::Id.ne(image_id))
        .filter(product_images::Column::IsPrimary.eq(true));
    siblings = match image.variant_id {
        Some(variant_id) => siblings.filter(product_images::Column::VariantId.eq(variant_id)),
        None => siblings.filter(product_images::Column::VariantId.is_null()),
    };
    siblings.exec(conn).await?;

    let image = if image.is_primary {
        image
    } else {
        let mut active: product_images::ActiveModel = image.into();
        active.is_primary = Set(true);
        active.update(conn).await?
    };

    if image.variant_id.is_none() {
        sync_product_cover(conn, product_id, Some(image.image_url.clone())).await?;
    }

    Ok(image)
}

/// Delete one product image. Deleting the current primary clears the
/// product cover; no other image is auto-promoted.
pub async fn delete_product_image<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<()> {
    let image = product_images::Entity::find_by_id(image_id)
        .one(conn)
        .await?
        .filter(|img| img.product_id == product_id)
        .ok_or(AppError::NotFound)?;

    let was_cover = image.is_primary && image.variant_id.is_none();
    product_images::Entity::delete_by_id(image.id).exec(conn).await?;

    if was_cover {
        sync_product_cover(conn, product_id, None).await?;
    }

    Ok(())
}

/// Append images to a product (or variant) gallery. At most one of the
/// appended images may end up primary: the first claim wins and the
/// existing siblings are demoted through `set_primary_product_image`.
pub async fn append_product_images<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    mut items: Vec<GalleryImageInput>,
) -> AppResult<Vec<product_images::Model>> {
    let primary_idx = pick_primary(&items);
    for item in items.iter_mut() {
        item.is_primary = false;
    }

    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let model = product_images::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            variant_id: Set(variant_id),
            image_url: Set(item.image_url),
            alt_text: Set(item.alt_text),
            is_primary: Set(false),
            uploaded_at: NotSet,
        }
        .insert(conn)
        .await?;
        inserted.push(model);
    }

    if let Some(idx) = primary_idx {
        let promoted = set_primary_product_image(conn, product_id, inserted[idx].id).await?;
        inserted[idx] = promoted;
    }

    Ok(inserted)
}

/// Wholesale gallery replacement for the product's own image set
/// (variant-attached images are untouched). Diff-and-apply per
/// `plan_gallery`; ends with at most one primary and a cover that
/// mirrors it. Run inside a transaction.
pub async fn replace_product_gallery<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    incoming: Vec<GalleryImageInput>,
) -> AppResult<Vec<product_images::Model>> {
    products::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing_models = product_images::Entity::find()
        .filter(product_images::Column::ProductId.eq(product_id))
        .filter(product_images::Column::VariantId.is_null())
        .order_by_asc(product_images::Column::UploadedAt)
        .all(conn)
        .await?;

    let existing: Vec<ExistingImage> = existing_models
        .iter()
        .map(|img| ExistingImage {
            id: img.id,
            image_url: img.image_url.clone(),
            is_primary: img.is_primary,
        })
        .collect();

    let plan = plan_gallery(&existing, &incoming);

    if !plan.delete.is_empty() {
        product_images::Entity::delete_many()
            .filter(product_images::Column::Id.is_in(plan.delete.clone()))
            .exec(conn)
            .await?;
    }

    for (id, should_be_primary) in &plan.retain {
        let unchanged = existing
            .iter()
            .any(|e| e.id == *id && e.is_primary == *should_be_primary);
        if unchanged {
            continue;
        }
        product_images::Entity::update_many()
            .col_expr(product_images::Column::IsPrimary, Expr::value(*should_be_primary))
            .filter(product_images::Column::Id.eq(*id))
            .exec(conn)
            .await?;
    }

    for item in plan.insert {
        product_images::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            variant_id: Set(None),
            image_url: Set(item.image_url),
            alt_text: Set(item.alt_text),
            is_primary: Set(item.is_primary),
            uploaded_at: NotSet,
        }
        .insert(conn)
        .await?;
    }

    sync_product_cover(conn, product_id, plan.cover).await?;

    product_images::Entity::find()
        .filter(product_images::Column::ProductId.eq(product_id))
        .filter(product_images::Column::VariantId.is_null())
        .order_by_desc(product_images::Column::IsPrimary)
        .order_by_asc(product_images::Column::UploadedAt)
        .all(conn)
        .await
        .map_err(AppError::from)
}

/// Point the product's cover at `cover` if it is not already there.
async fn sync_product_cover<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    cover: Option<String>,
) -> AppResult<()> {
    let product = products::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if product.cover_image == cover {
        return Ok(());
    }

    let mut active: products::ActiveModel = product.into();
    active.cover_image = Set(cover);
    active.update(conn).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Repair galleries (same rule, repair_requests own the cover)
// ---------------------------------------------------------------------------

pub async fn set_primary_repair_image<C: ConnectionTrait>(
    conn: &C,
    repair_id: Uuid,
    image_id: Uuid,
) -> AppResult<repair_images::Model> {
    let image = repair_images::Entity::find_by_id(image_id)
        .one(conn)
        .await?
        .filter(|img| img.repair_request_id == repair_id)
        .ok_or(AppError::NotFound)?;

    repair_images::Entity::update_many()
        .col_expr(repair_images::Column::IsPrimary, Expr::value(false))
        .filter(repair_images::Column::RepairRequestId.eq(repair_id))
        .filter(repair_images::Column::Id.ne(image_id))
        .filter(repair_images::Column::IsPrimary.eq(true))
        .exec(conn)
        .await?;

    let image = if image.is_primary {
        image
    } else {
        let mut active: repair_images::ActiveModel = image.into();
        active.is_primary = Set(true);
        active.update(conn).await?
    };

    sync_repair_cover(conn, repair_id, Some(image.image_url.clone())).await?;

    Ok(image)
}

pub async fn delete_repair_image<C: ConnectionTrait>(
    conn: &C,
    repair_id: Uuid,
    image_id: Uuid,
) -> AppResult<()> {
    let image = repair_images::Entity::find_by_id(image_id)
        .one(conn)
        .await?
        .filter(|img| img.repair_request_id == repair_id)
        .ok_or(AppError::NotFound)?;

    let was_primary = image.is_primary;
    repair_images::Entity::delete_by_id(image.id).exec(conn).await?;

    if was_primary {
        sync_repair_cover(conn, repair_id, None).await?;
    }

    Ok(())
}

pub async fn append_repair_images<C: ConnectionTrait>(
    conn: &C,
    repair_id: Uuid,
    mut items: Vec<GalleryImageInput>,
) -> AppResult<Vec<repair_images::Model>> {
    let primary_idx = pick_primary(&items);
    for item in items.iter_mut() {
        item.is_primary = false;
    }

    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let model = repair_images::ActiveModel {
            id: Set(Uuid::new_v4()),
            repair_request_id: Set(repair_id),
            image_url: Set(item.image_url),
            alt_text: Set(item.alt_text),
            is_primary: Set(false),
            uploaded_at: NotSet,
        }
        .insert(conn)
        .await?;
        inserted.push(model);
    }

    if let Some(idx) = primary_idx {
        let promoted = set_primary_repair_image(conn, repair_id, inserted[idx].id).await?;
        inserted[idx] = promoted;
    }

    Ok(inserted)
}

async fn sync_repair_cover<C: ConnectionTrait>(
    conn: &C,
    repair_id: Uuid,
    cover: Option<String>,
) -> AppResult<()> {
    let request = repair_requests::Entity::find_by_id(repair_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if request.cover_image == cover {
        return Ok(());
    }

    let mut active: repair_requests::ActiveModel = request.into();
    active.cover_image = Set(cover);
    active.update(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(url: &str, primary: bool) -> GalleryImageInput {
        GalleryImageInput {
            image_url: url.to_string(),
            alt_text: None,
            is_primary: primary,
        }
    }

    fn existing(id: u128, url: &str, primary: bool) -> ExistingImage {
        ExistingImage {
            id: Uuid::from_u128(id),
            image_url: url.to_string(),
            is_primary: primary,
        }
    }

    #[test]
    fn first_primary_claim_wins() {
        let incoming = vec![input("a", false), input("b", true), input("c", true)];
        assert_eq!(pick_primary(&incoming), Some(1));

        let plan = plan_gallery(&[], &incoming);
        let primaries: Vec<_> = plan.insert.iter().filter(|i| i.is_primary).collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].image_url, "b");
        assert_eq!(plan.cover.as_deref(), Some("b"));
    }

    #[test]
    fn no_primary_claim_clears_cover() {
        let plan = plan_gallery(
            &[existing(1, "a", true)],
            &[input("a", false), input("b", false)],
        );
        assert_eq!(plan.cover, None);
        assert_eq!(plan.retain, vec![(Uuid::from_u128(1), false)]);
    }

    #[test]
    fn unchanged_urls_are_retained_not_recreated() {
        let plan = plan_gallery(
            &[existing(1, "a", true), existing(2, "b", false)],
            &[input("b", true), input("c", false)],
        );
        assert_eq!(plan.delete, vec![Uuid::from_u128(1)]);
        assert_eq!(plan.retain, vec![(Uuid::from_u128(2), true)]);
        assert_eq!(plan.insert, vec![input("c", false)]);
        assert_eq!(plan.cover.as_deref(), Some("b"));
    }

    #[test]
    fn duplicate_submitted_urls_collapse() {
        let plan = plan_gallery(&[], &[input("a", false), input("a", true), input("b", true)]);
        assert_eq!(plan.insert.len(), 2);
        // "a" was deduped to its first, non-primary occurrence, so "b"
        // carries the first surviving primary claim.
        assert_eq!(plan.cover.as_deref(), Some("b"));
    }

    #[test]
    fn empty_incoming_deletes_everything() {
        let plan = plan_gallery(&[existing(1, "a", true), existing(2, "b", false)], &[]);
        assert_eq!(plan.delete.len(), 2);
        assert!(plan.insert.is_empty());
        assert!(plan.retain.is_empty());
        assert_eq!(plan.cover, None);
    }

    #[test]
    fn replacement_with_two_primaries_yields_one() {
        let plan = plan_gallery(
            &[existing(1, "a", true), existing(2, "b", true)],
            &[input("a", true), input("b", true), input("c", false)],
        );
        let retained_primaries = plan.retain.iter().filter(|(_, p)| *p).count();
        let inserted_primaries = plan.insert.iter().filter(|i| i.is_primary).count();
        assert_eq!(retained_primaries + inserted_primaries, 1);
        assert_eq!(plan.cover.as_deref(), Some("a"));
    }
}
