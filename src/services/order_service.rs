use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    entity::{
        order_items::{self, Entity as OrderItems},
        orders::{self, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

const DEFAULT_SHIPPING: Decimal = dec!(200);

const ORDER_STATUSES: [&str; 5] = ["confirmed", "processing", "shipped", "delivered", "cancelled"];

/// Capture a checkout. Item titles and prices are snapshotted verbatim
/// so the order stays stable however the catalog changes later. Every
/// submission creates a fresh order with a fresh code, even for an
/// identical payload.
pub async fn create_order(
    state: &AppState,
    user: Option<&AuthUser>,
    device_id: Option<String>,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name", "name must not be empty"));
    }
    if payload.phone.trim().is_empty() {
        return Err(AppError::validation("phone", "phone must not be empty"));
    }
    if payload.items.is_empty() {
        return Err(AppError::validation("items", "order has no items"));
    }

    let mut computed_subtotal = Decimal::ZERO;
    for (i, item) in payload.items.iter().enumerate() {
        if item.quantity <= 0 {
            return Err(AppError::validation(
                format!("items[{i}].quantity"),
                "quantity must be greater than 0",
            ));
        }
        if item.price.is_sign_negative() {
            return Err(AppError::validation(
                format!("items[{i}].price"),
                "price must not be negative",
            ));
        }
        if item.title.trim().is_empty() {
            return Err(AppError::validation(
                format!("items[{i}].title"),
                "title must not be empty",
            ));
        }
        computed_subtotal += item.price * Decimal::from(item.quantity);
    }

    if computed_subtotal != payload.subtotal {
        return Err(AppError::validation(
            "subtotal",
            "subtotal does not match the sum of item prices",
        ));
    }

    let shipping = payload.shipping.unwrap_or(DEFAULT_SHIPPING);
    if shipping.is_sign_negative() {
        return Err(AppError::validation("shipping", "shipping must not be negative"));
    }
    if payload.subtotal + shipping != payload.total {
        return Err(AppError::validation(
            "total",
            "total does not equal subtotal plus shipping",
        ));
    }

    let order_id = build_order_code();
    let user_id = user.map(|u| u.user_id);

    let txn = state.orm.begin().await?;

    let order = orders::ActiveModel {
        id: Set(order_id),
        user_id: Set(user_id),
        device_id: Set(device_id),
        customer_name: Set(payload.name),
        phone: Set(payload.phone),
        address: Set(payload.address),
        city: Set(payload.city),
        payment: Set(payload.payment.as_str().to_string()),
        mpesa_code: Set(payload.mpesa_code),
        cash_amount: Set(payload.cash_amount.unwrap_or_default()),
        change_due: Set(payload.change_due.unwrap_or_default()),
        subtotal: Set(payload.subtotal),
        shipping: Set(shipping),
        total: Set(payload.total),
        status: Set("confirmed".into()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(payload.items.len());
    for item in payload.items {
        let model = order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id.clone()),
            product_id: Set(item.product_id),
            title: Set(item.title),
            price: Set(item.price),
            quantity: Set(item.quantity),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(model));
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        user_id,
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Admins see everything; an authenticated user sees their own orders; a
/// guest sees orders matching the supplied device id; anyone else gets
/// an empty page.
pub async fn list_orders(
    state: &AppState,
    viewer: Option<&AuthUser>,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    match viewer {
        Some(user) if user.is_admin() => {}
        Some(user) => {
            condition = condition.add(orders::Column::UserId.eq(user.user_id));
        }
        None => match query.device_id.as_ref().filter(|s| !s.is_empty()) {
            Some(device_id) => {
                condition = condition.add(orders::Column::DeviceId.eq(device_id.clone()));
            }
            None => {
                return Ok(ApiResponse::success(
                    "Orders",
                    OrderList { items: Vec::new() },
                    Some(Meta::new(page, limit, 0)),
                ));
            }
        },
    }

    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(orders::Column::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(orders::Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(orders::Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

/// Public fetch by code; order codes are the guest's receipt.
pub async fn get_order(state: &AppState, id: &str) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(order_items::Column::OrderId.eq(order.id.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    validate_order_status(&payload.status)?;

    let existing = Orders::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: orders::ActiveModel = existing.into();
    active.status = Set(payload.status);
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Status updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Orders::delete_by_id(id.to_string()).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_order_status(status: &str) -> AppResult<()> {
    if ORDER_STATUSES.contains(&status) {
        return Ok(());
    }
    Err(AppError::validation(
        "status",
        format!("status must be one of {ORDER_STATUSES:?}"),
    ))
}

/// Human-readable order code: CT prefix, millisecond timestamp, random
/// uppercase-alphanumeric suffix. Practically unique at creation time;
/// the primary-key constraint is the backstop.
fn build_order_code() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("CT{millis}-{suffix}")
}

fn order_from_entity(model: orders::Model) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        device_id: model.device_id,
        customer_name: model.customer_name,
        phone: model.phone,
        address: model.address,
        city: model.city,
        payment: model.payment,
        mpesa_code: model.mpesa_code,
        cash_amount: model.cash_amount,
        change_due: model.change_due,
        subtotal: model.subtotal,
        shipping: model.shipping,
        total: model.total,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: order_items::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        title: model.title,
        price: model.price,
        quantity: model.quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_codes_have_prefix_and_suffix() {
        let code = build_order_code();
        assert!(code.starts_with("CT"));
        let (_, suffix) = code.rsplit_once('-').expect("suffix separator");
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn order_codes_differ_between_calls() {
        assert_ne!(build_order_code(), build_order_code());
    }

    #[test]
    fn status_validation() {
        assert!(validate_order_status("shipped").is_ok());
        assert!(validate_order_status("paid").is_err());
    }
}
