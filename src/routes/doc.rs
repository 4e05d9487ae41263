use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth as auth_dto,
        contact::{ContactList, CreateContactRequest},
        orders::{CreateOrderRequest, OrderItemPayload, OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::{
            AddImagesRequest, CreateProductRequest, CreateVariantRequest, GalleryImagePayload,
            ImageList, ProductList, ReplaceGalleryRequest, UpdateProductRequest,
            UpdateVariantRequest, VariantList,
        },
        repairs::{AddRepairImagesRequest, CreateRepairRequest, RepairImageList, RepairList, UpdateRepairStatusRequest},
        taxonomy::{BrandList, CategoryList, CreateNamedRequest, CreateOptionRequest, OptionList, TagList},
        testimonials::{CreateTestimonialRequest, TestimonialList, UpdateTestimonialRequest},
    },
    models::{
        Brand, Category, ContactMessage, GlobalOption, OptionKind, Order, OrderItem,
        PaymentMethod, Product, ProductImage, ProductVariant, RepairImage, RepairRequest,
        RepairStatus, Tag, Testimonial, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, contact, health, orders, params, products, repairs, taxonomy, testimonials,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        products::list_products,
        products::featured_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::replace_gallery,
        products::add_images,
        products::set_primary_image,
        products::delete_image,
        products::list_variants,
        products::create_variant,
        products::update_variant,
        products::delete_variant,
        taxonomy::list_categories,
        taxonomy::create_category,
        taxonomy::delete_category,
        taxonomy::list_brands,
        taxonomy::create_brand,
        taxonomy::delete_brand,
        taxonomy::list_tags,
        taxonomy::delete_tag,
        taxonomy::list_options,
        taxonomy::create_option,
        taxonomy::delete_option,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        orders::delete_order,
        repairs::create_repair,
        repairs::list_repairs,
        repairs::get_repair,
        repairs::update_repair_status,
        repairs::add_repair_images,
        repairs::set_primary_repair_image,
        repairs::delete_repair_image,
        repairs::delete_repair,
        contact::create_message,
        contact::list_messages,
        testimonials::create_testimonial,
        testimonials::list_testimonials,
        testimonials::update_testimonial,
        testimonials::delete_testimonial,
        admin::list_low_stock,
        admin::adjust_inventory
    ),
    components(
        schemas(
            User,
            Brand,
            Category,
            Tag,
            OptionKind,
            GlobalOption,
            Product,
            ProductImage,
            ProductVariant,
            PaymentMethod,
            Order,
            OrderItem,
            RepairStatus,
            RepairImage,
            RepairRequest,
            ContactMessage,
            Testimonial,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            GalleryImagePayload,
            ReplaceGalleryRequest,
            AddImagesRequest,
            CreateVariantRequest,
            UpdateVariantRequest,
            ProductList,
            VariantList,
            ImageList,
            CreateNamedRequest,
            CreateOptionRequest,
            CategoryList,
            BrandList,
            TagList,
            OptionList,
            CreateOrderRequest,
            OrderItemPayload,
            UpdateOrderStatusRequest,
            OrderList,
            OrderWithItems,
            CreateRepairRequest,
            UpdateRepairStatusRequest,
            AddRepairImagesRequest,
            RepairList,
            RepairImageList,
            CreateContactRequest,
            ContactList,
            CreateTestimonialRequest,
            UpdateTestimonialRequest,
            TestimonialList,
            admin::LowStockQuery,
            admin::InventoryAdjustRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::RepairListQuery,
            params::TestimonialQuery,
            params::NameSearchQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<RepairRequest>,
            ApiResponse<TestimonialList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Taxonomy", description = "Categories, brands, tags and global options"),
        (name = "Orders", description = "Order capture and tracking"),
        (name = "Repairs", description = "Repair request intake and management"),
        (name = "Contact", description = "Contact message intake"),
        (name = "Testimonials", description = "Customer testimonials"),
        (name = "Admin", description = "Admin inventory endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
