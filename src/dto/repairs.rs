use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::products::GalleryImagePayload;
use crate::models::{RepairImage, RepairRequest, RepairStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRepairRequest {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub device_type: Option<String>,
    pub issue_description: Option<String>,
    #[serde(default)]
    pub images: Vec<GalleryImagePayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRepairStatusRequest {
    pub status: RepairStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddRepairImagesRequest {
    pub images: Vec<GalleryImagePayload>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RepairList {
    #[schema(value_type = Vec<RepairRequest>)]
    pub items: Vec<RepairRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RepairImageList {
    #[schema(value_type = Vec<RepairImage>)]
    pub items: Vec<RepairImage>,
}
