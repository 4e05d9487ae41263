pub mod auth;
pub mod contact;
pub mod orders;
pub mod products;
pub mod repairs;
pub mod taxonomy;
pub mod testimonials;
