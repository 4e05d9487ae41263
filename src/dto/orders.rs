use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem, PaymentMethod};

/// One cart line at checkout. These values are snapshotted verbatim
/// into the order; the live catalog is never consulted again.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OrderItemPayload {
    pub product_id: String,
    pub title: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment: PaymentMethod,
    pub mpesa_code: Option<String>,
    pub cash_amount: Option<Decimal>,
    pub change_due: Option<Decimal>,
    pub subtotal: Decimal,
    pub shipping: Option<Decimal>,
    pub total: Decimal,
    pub items: Vec<OrderItemPayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
