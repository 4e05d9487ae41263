use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod contact;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod repairs;
pub mod taxonomy;
pub mod testimonials;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/variants", products::variant_router())
        .nest("/categories", taxonomy::category_router())
        .nest("/brands", taxonomy::brand_router())
        .nest("/tags", taxonomy::tag_router())
        .nest("/options", taxonomy::option_router())
        .nest("/orders", orders::router())
        .nest("/repairs", repairs::router())
        .nest("/contact", contact::router())
        .nest("/testimonials", testimonials::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}
