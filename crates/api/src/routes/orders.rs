//! Order placement and lifecycle endpoints.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{OrderId, OrderStatus, OrderTotals, ProductId};

use crate::db::{self, RepositoryError};
use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::{Order, OrderItemDetail, User};
use crate::routes::ApiMessage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct PlaceOrderRequest {
    items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
struct OrderLineRequest {
    product_id: ProductId,
    #[serde(default = "default_quantity")]
    quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Serialize)]
pub struct OrderPlacedResponse {
    pub status: bool,
    pub message: String,
    pub order_id: OrderId,
    pub total: Decimal,
}

/// `POST /place_order`
///
/// The body is parsed manually so malformed JSON still renders through
/// the standard error envelope.
pub async fn place(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: PlaceOrderRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid order data".to_owned()))?;

    if request.items.is_empty() {
        return Err(ApiError::BadRequest("No items in order".to_owned()));
    }

    // Price snapshots are read up front so validation failures never
    // leave a half-written order behind.
    let mut lines = Vec::with_capacity(request.items.len());
    let mut subtotal = Decimal::ZERO;
    for item in &request.items {
        let Some(product) = db::products::get_by_id(state.pool(), item.product_id).await? else {
            return Err(ApiError::NotFound(format!(
                "Product ID {} not found",
                item.product_id
            )));
        };
        if item.quantity <= 0 {
            return Err(ApiError::BadRequest(format!(
                "Invalid quantity for product {}",
                product.name
            )));
        }

        subtotal += product.price * Decimal::from(item.quantity);
        lines.push((product, item.quantity));
    }

    let totals = OrderTotals::from_subtotal(subtotal);
    let total = totals.total;

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    let order = db::orders::create(&mut *tx, user.id, totals).await?;
    for (product, quantity) in lines {
        db::orders::insert_item(&mut *tx, order.id, product.id, quantity, product.price).await?;
    }
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok((
        StatusCode::CREATED,
        Json(OrderPlacedResponse {
            status: true,
            message: "Order placed successfully".to_owned(),
            order_id: order.id,
            total,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct OrderItemPayload {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub rating: Option<Decimal>,
    /// Unit price captured at placement, not the live product price.
    pub price: Decimal,
    pub quantity: i32,
    pub total_price: Decimal,
}

impl From<OrderItemDetail> for OrderItemPayload {
    fn from(item: OrderItemDetail) -> Self {
        let total_price = item.total_price();
        Self {
            id: item.product_id,
            name: item.name,
            description: item.description,
            image_path: item.image_path,
            rating: item.rating,
            price: item.unit_price,
            quantity: item.quantity,
            total_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderPayload {
    pub id: OrderId,
    pub status: i32,
    pub order_date: DateTime<Utc>,
    pub order_change_date: Option<DateTime<Utc>>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub items: Vec<OrderItemPayload>,
}

impl OrderPayload {
    fn new(order: Order, items: Vec<OrderItemDetail>) -> Self {
        Self {
            id: order.id,
            status: order.status.as_i32(),
            order_date: order.order_date,
            order_change_date: order.order_change_date,
            subtotal: order.subtotal,
            tax: order.tax,
            shipping: order.shipping,
            total: order.total,
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct OrdersByStatus {
    pub active: Vec<OrderPayload>,
    pub completed: Vec<OrderPayload>,
    pub canceled: Vec<OrderPayload>,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub status: bool,
    pub orders: OrdersByStatus,
}

/// `GET /orders`
///
/// All of the caller's orders, grouped by lifecycle status.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = db::orders::list_for_user(state.pool(), user.id).await?;
    if orders.is_empty() {
        return Err(ApiError::NotFound("No orders found".to_owned()));
    }

    let order_ids: Vec<i32> = orders.iter().map(|order| order.id.as_i32()).collect();
    let items = db::orders::items_for_orders(state.pool(), &order_ids).await?;

    let mut items_by_order: HashMap<OrderId, Vec<OrderItemDetail>> = HashMap::new();
    for item in items {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let mut grouped = OrdersByStatus::default();
    for order in orders {
        let items = items_by_order.remove(&order.id).unwrap_or_default();
        let status = order.status;
        let payload = OrderPayload::new(order, items);
        match status {
            OrderStatus::Active => grouped.active.push(payload),
            OrderStatus::Completed => grouped.completed.push(payload),
            OrderStatus::Canceled => grouped.canceled.push(payload),
        }
    }

    Ok(Json(OrdersResponse {
        status: true,
        orders: grouped,
    }))
}

/// `POST /orders/cancel/{id}`
pub async fn cancel(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(order_id): Path<i32>,
) -> Result<Json<ApiMessage>, ApiError> {
    transition(
        &state,
        &user,
        OrderId::new(order_id),
        OrderStatus::Canceled,
        "Order canceled successfully",
    )
    .await
}

/// `POST /orders/complete/{id}`
pub async fn complete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(order_id): Path<i32>,
) -> Result<Json<ApiMessage>, ApiError> {
    transition(
        &state,
        &user,
        OrderId::new(order_id),
        OrderStatus::Completed,
        "Order completed successfully",
    )
    .await
}

async fn transition(
    state: &AppState,
    user: &User,
    order_id: OrderId,
    target: OrderStatus,
    success_message: &str,
) -> Result<Json<ApiMessage>, ApiError> {
    let Some(order) = db::orders::get_for_user(state.pool(), order_id, user.id).await? else {
        return Err(ApiError::NotFound("Order not found".to_owned()));
    };

    let next = order
        .status
        .transition_to(target)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::orders::set_status(&mut *tx, order.id, next, Utc::now()).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok(Json(ApiMessage::ok(success_message)))
}
