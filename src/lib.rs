mod catalog;
mod orders;
mod session;
mod store;

pub use catalog::{CatalogRegistry, Product, StockRepository, StoreStockRepository};
pub use orders::{
    CartLine, Order, OrderError, OrderItem, OrderService, OrderStatus, OrderWithItems,
    PaymentStatus, PlaceOrder, UpdateOrderStatus,
};
pub use session::Session;
pub use store::{
    BatchExt, Collection, InMemoryStore, StagedRow, Store, StoreError, Versioned, WriteBatch,
};

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
pub mod http;
