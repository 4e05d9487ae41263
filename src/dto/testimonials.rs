use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Testimonial;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTestimonialRequest {
    pub product: String,
    pub image_url: Option<String>,
    pub experience: String,
    pub rating: i16,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Admin-side partial update; the public submit path can never touch
/// `is_approved`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTestimonialRequest {
    pub product: Option<String>,
    pub image_url: Option<String>,
    pub experience: Option<String>,
    pub rating: Option<i16>,
    pub is_approved: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TestimonialList {
    #[schema(value_type = Vec<Testimonial>)]
    pub items: Vec<Testimonial>,
}
