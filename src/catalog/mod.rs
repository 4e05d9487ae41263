//! Rules that keep a product, its variants and its images mutually
//! consistent: slug derivation, final-price resolution and the
//! primary-image/cover sync. Services call into these; nothing here
//! talks HTTP.

pub mod images;
pub mod pricing;
pub mod slug;
