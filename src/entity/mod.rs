pub mod audit_logs;
pub mod brands;
pub mod categories;
pub mod contact_messages;
pub mod global_options;
pub mod order_items;
pub mod orders;
pub mod product_categories;
pub mod product_images;
pub mod product_options;
pub mod product_tags;
pub mod product_variants;
pub mod products;
pub mod repair_images;
pub mod repair_requests;
pub mod tags;
pub mod testimonials;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use brands::Entity as Brands;
pub use categories::Entity as Categories;
pub use contact_messages::Entity as ContactMessages;
pub use global_options::Entity as GlobalOptions;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_categories::Entity as ProductCategories;
pub use product_images::Entity as ProductImages;
pub use product_options::Entity as ProductOptions;
pub use product_tags::Entity as ProductTags;
pub use product_variants::Entity as ProductVariants;
pub use products::Entity as Products;
pub use repair_images::Entity as RepairImages;
pub use repair_requests::Entity as RepairRequests;
pub use tags::Entity as Tags;
pub use testimonials::Entity as Testimonials;
pub use users::Entity as Users;
