//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bazaar_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user.
    pub user_id: UserId,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed (UTC).
    pub order_date: DateTime<Utc>,
    /// When the status last changed; null until the first transition.
    pub order_change_date: Option<DateTime<Utc>>,
    /// Sum of line totals at placement.
    pub subtotal: Decimal,
    /// Tax charged (currently always zero).
    pub tax: Decimal,
    /// Shipping charged (currently always zero).
    pub shipping: Decimal,
    /// subtotal + tax + shipping.
    pub total: Decimal,
}

/// A line item within an order.
#[derive(Debug, Clone)]
pub struct OrderItem {
    /// Unique line item ID.
    pub id: OrderItemId,
    /// Parent order.
    pub order_id: OrderId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Quantity ordered (always positive).
    pub quantity: i32,
    /// Unit price captured at order time. Immutable snapshot, decoupled
    /// from the live product price.
    pub current_unit_price: Decimal,
}

/// A line item joined with its product details, for order listings.
#[derive(Debug, Clone)]
pub struct OrderItemDetail {
    /// Parent order.
    pub order_id: OrderId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Product name at read time.
    pub name: String,
    /// Product description at read time.
    pub description: Option<String>,
    /// Product image at read time.
    pub image_path: Option<String>,
    /// Product rating at read time.
    pub rating: Option<Decimal>,
    /// Snapshotted unit price.
    pub unit_price: Decimal,
    /// Quantity ordered.
    pub quantity: i32,
}

impl OrderItemDetail {
    /// Line total: quantity x snapshotted unit price.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
