use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::catalog::images::GalleryImageInput;
use crate::models::{Product, ProductImage, ProductVariant};

/// One gallery entry as submitted over the wire. The image itself is
/// already uploaded; we only get its reference.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GalleryImagePayload {
    pub image_url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl From<GalleryImagePayload> for GalleryImageInput {
    fn from(payload: GalleryImagePayload) -> Self {
        GalleryImageInput {
            image_url: payload.image_url,
            alt_text: payload.alt_text,
            is_primary: payload.is_primary,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub discount: Option<Decimal>,
    pub stock: Option<i32>,
    pub condition: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub brand_id: Option<Uuid>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
    #[serde(default)]
    pub tag_names: Vec<String>,
    #[serde(default)]
    pub option_ids: Vec<Uuid>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub gallery: Vec<GalleryImagePayload>,
}

/// Partial update: every field optional, validated field by field before
/// anything is written. Absent fields are left alone; association lists,
/// when present, replace the current set.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub stock: Option<i32>,
    pub condition: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub brand_id: Option<Option<Uuid>>,
    pub category_ids: Option<Vec<Uuid>>,
    pub tag_names: Option<Vec<String>>,
    pub option_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceGalleryRequest {
    pub images: Vec<GalleryImagePayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddImagesRequest {
    pub images: Vec<GalleryImagePayload>,
    pub variant_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVariantRequest {
    pub sku: String,
    pub color: Option<String>,
    pub ram_gb: Option<i32>,
    pub storage_gb: Option<i32>,
    pub processor: Option<String>,
    pub size: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateVariantRequest {
    pub sku: Option<String>,
    pub color: Option<String>,
    pub ram_gb: Option<i32>,
    pub storage_gb: Option<i32>,
    pub processor: Option<String>,
    pub size: Option<String>,
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct VariantList {
    #[schema(value_type = Vec<ProductVariant>)]
    pub items: Vec<ProductVariant>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ImageList {
    #[schema(value_type = Vec<ProductImage>)]
    pub items: Vec<ProductImage>,
}
