//! Orders — headers, line items, and the placement service.
//!
//! An order is a header row plus one immutable line item per cart line,
//! written together as one atomic unit. Line items carry denormalized
//! snapshots (name, department, subcategory, price, image) so historical
//! orders stay readable no matter what later happens to the catalog.

mod service;

use std::fmt;
use std::time::SystemTime;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Collection;

pub use service::{OrderError, OrderService, OrderWithItems};

/// Order lifecycle status.
///
/// A closed set of tags rather than a free string, but deliberately not a
/// guarded state machine: any tag can follow any other (`cancelled` is
/// reachable from anywhere, and so is everything else).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Parse a caller-supplied tag. Returns None for anything outside the set.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status recorded on the header.
///
/// Creation always writes `Completed` regardless of payment method — the
/// payment itself is a caller-recorded string, not a processed flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Order header. Totals and delivery details are frozen at creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub total_amount: Decimal,
    pub tax_amount: Decimal,
    pub shipping_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl Collection for Order {
    const NAME: &'static str = "orders";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One persisted, immutable line of an order.
///
/// `product_id` is a weak reference into whichever catalog collection the
/// (department, subcategory) pair names — not a foreign key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_name: String,
    pub department: String,
    pub subcategory: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
}

impl Collection for OrderItem {
    const NAME: &'static str = "order_items";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A client-submitted descriptor of one product and quantity to purchase.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub department: String,
    pub subcategory: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
}

/// Checkout request body.
///
/// `total_amount` and `tax_amount` are caller-computed and trusted as-is;
/// the service never recomputes them from the cart.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub cart: Vec<CartLine>,
    pub total_amount: Decimal,
    pub tax_amount: Decimal,
    pub shipping_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
    pub payment_method: String,
}

/// Status-update request body.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatus {
    pub order_status: String,
}
