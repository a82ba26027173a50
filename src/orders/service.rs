//! OrderService — placement, status transitions, and the order read side.

use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::catalog::CatalogRegistry;
use crate::store::{BatchExt, Store, StoreError};

use super::{CartLine, Order, OrderItem, OrderStatus, PaymentStatus, PlaceOrder};

/// Error type for order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout submitted with no cart lines.
    #[error("cart is empty")]
    EmptyCart,
    /// Status tag outside the known set.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
    /// Order id missing, or not visible to the caller.
    #[error("order not found: {0}")]
    NotFound(String),
    /// Header/line-item commit failed. The diagnostic goes to the log,
    /// not to the client.
    #[error("order creation failed")]
    CreationFailed(#[source] StoreError),
    /// Any other store failure. The diagnostic goes to the log, not to
    /// the client.
    #[error("order lookup failed")]
    Store(#[from] StoreError),
}

impl OrderError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::EmptyCart => 400,
            OrderError::UnknownStatus(_) => 400,
            OrderError::NotFound(_) => 404,
            OrderError::CreationFailed(_) => 500,
            OrderError::Store(_) => 500,
        }
    }
}

/// An order header joined with its line items.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// The order service.
///
/// Holds the store and the catalog registry. Placement commits the header
/// and every line item as one batch, then walks the cart decrementing
/// stock per line — resolution or decrement failures are logged and
/// swallowed, never surfaced to the caller.
pub struct OrderService<S> {
    store: S,
    catalog: Arc<CatalogRegistry>,
}

impl<S: Store> OrderService<S> {
    pub fn new(store: S, catalog: Arc<CatalogRegistry>) -> Self {
        Self { store, catalog }
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the catalog registry.
    pub fn catalog(&self) -> &CatalogRegistry {
        &self.catalog
    }

    /// Place an order: one header plus one line item per cart line,
    /// committed atomically, followed by best-effort stock decrements.
    ///
    /// There is no idempotency key — submitting the same request twice
    /// creates two distinct orders.
    pub fn place_order(
        &self,
        user_id: &str,
        input: PlaceOrder,
    ) -> Result<OrderWithItems, OrderError> {
        if input.cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let now = SystemTime::now();
        let order = Order {
            id: self.store.allocate_id().to_string(),
            user_id: user_id.to_string(),
            total_amount: input.total_amount,
            tax_amount: input.tax_amount,
            shipping_address: input.shipping_address,
            city: input.city,
            state: input.state,
            pincode: input.pincode,
            phone: input.phone,
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Completed,
            order_status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<OrderItem> = input
            .cart
            .iter()
            .map(|line| OrderItem {
                id: self.store.allocate_id().to_string(),
                order_id: order.id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.name.clone(),
                department: line.department.clone(),
                subcategory: line.subcategory.clone(),
                price: line.price,
                quantity: line.quantity,
                image: line.image.clone(),
            })
            .collect();

        let mut batch = self.store.batch().insert(&order);
        for item in &items {
            batch = batch.insert(item);
        }
        batch.commit().map_err(|e| {
            error!(order_id = %order.id, error = %e, "order commit failed");
            OrderError::CreationFailed(e)
        })?;

        // Stock adjustment runs after the commit: its outcome must never
        // unwind the order, and one line's failure must not stop the rest.
        for line in &input.cart {
            self.adjust_stock(&order.id, line);
        }

        Ok(OrderWithItems { order, items })
    }

    fn adjust_stock(&self, order_id: &str, line: &CartLine) {
        let Some(repo) = self.catalog.resolve(&line.subcategory) else {
            warn!(
                order_id,
                subcategory = %line.subcategory,
                product_id = %line.product_id,
                "stock adjustment skipped: unknown subcategory"
            );
            return;
        };

        match repo.decrement_stock(&line.product_id, line.quantity) {
            Ok(remaining) => debug!(
                order_id,
                subcategory = %line.subcategory,
                product_id = %line.product_id,
                quantity = line.quantity,
                remaining,
                "stock decremented"
            ),
            Err(e) => warn!(
                order_id,
                subcategory = %line.subcategory,
                product_id = %line.product_id,
                error = %e,
                "stock adjustment failed"
            ),
        }
    }

    /// Write a new status tag and bump `updated_at`.
    ///
    /// Any known tag is accepted from any current status.
    pub fn update_status(&self, order_id: &str, status_tag: &str) -> Result<Order, OrderError> {
        let status = OrderStatus::parse(status_tag)
            .ok_or_else(|| OrderError::UnknownStatus(status_tag.to_string()))?;

        let stored = self
            .store
            .get::<Order>(order_id)?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        let mut order = stored.data;
        order.order_status = status;
        order.updated_at = SystemTime::now();

        self.store.update(&order, stored.version)?;

        Ok(order)
    }

    /// Fetch one order scoped to its owner. A foreign order id reads the
    /// same as a missing one.
    pub fn order_for_user(
        &self,
        order_id: &str,
        user_id: &str,
    ) -> Result<OrderWithItems, OrderError> {
        let order = self
            .store
            .get::<Order>(order_id)?
            .map(|v| v.data)
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        let items = self.items_of(order_id)?;
        Ok(OrderWithItems { order, items })
    }

    /// Fetch one order without owner scoping (administrator read).
    pub fn order_unscoped(&self, order_id: &str) -> Result<OrderWithItems, OrderError> {
        let order = self
            .store
            .get::<Order>(order_id)?
            .map(|v| v.data)
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        let items = self.items_of(order_id)?;
        Ok(OrderWithItems { order, items })
    }

    /// All orders for one user, newest first, items nested.
    pub fn orders_for_user(&self, user_id: &str) -> Result<Vec<OrderWithItems>, OrderError> {
        let orders = self
            .store
            .find::<Order>(&|o| o.user_id == user_id)?
            .into_iter()
            .map(|v| v.data)
            .collect();
        self.join_items(orders)
    }

    /// All orders for all users, newest first (administrator listing).
    pub fn all_orders(&self) -> Result<Vec<OrderWithItems>, OrderError> {
        let orders = self
            .store
            .find::<Order>(&|_| true)?
            .into_iter()
            .map(|v| v.data)
            .collect();
        self.join_items(orders)
    }

    fn items_of(&self, order_id: &str) -> Result<Vec<OrderItem>, OrderError> {
        let mut items: Vec<OrderItem> = self
            .store
            .find::<OrderItem>(&|i| i.order_id == order_id)?
            .into_iter()
            .map(|v| v.data)
            .collect();
        // Line items keep cart submission order via their sequential ids.
        items.sort_by_key(|i| id_ordinal(&i.id));
        Ok(items)
    }

    fn join_items(&self, mut orders: Vec<Order>) -> Result<Vec<OrderWithItems>, OrderError> {
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| id_ordinal(&b.id).cmp(&id_ordinal(&a.id)))
        });

        let mut joined = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.items_of(&order.id)?;
            joined.push(OrderWithItems { order, items });
        }
        Ok(joined)
    }
}

/// Numeric ordinal of a store-allocated id, for stable ordering.
fn id_ordinal(id: &str) -> u64 {
    id.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        assert_eq!(OrderError::EmptyCart.status_code(), 400);
        assert_eq!(OrderError::UnknownStatus("x".into()).status_code(), 400);
        assert_eq!(OrderError::NotFound("1".into()).status_code(), 404);
        assert_eq!(
            OrderError::CreationFailed(StoreError::Storage("boom".into())).status_code(),
            500
        );
        assert_eq!(
            OrderError::Store(StoreError::Storage("boom".into())).status_code(),
            500
        );
    }

    #[test]
    fn creation_failure_message_is_generic() {
        let err = OrderError::CreationFailed(StoreError::Storage("disk on fire".into()));
        assert_eq!(err.to_string(), "order creation failed");
    }

    #[test]
    fn store_failure_message_is_generic_but_keeps_the_source() {
        let err = OrderError::from(StoreError::Storage("lock poisoned".into()));
        assert_eq!(err.to_string(), "order lookup failed");

        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("lock poisoned"));
    }

    #[test]
    fn id_ordinal_parses_sequence_ids() {
        assert_eq!(id_ordinal("17"), 17);
        assert_eq!(id_ordinal("not-a-number"), 0);
    }
}
