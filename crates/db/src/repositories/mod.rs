use async_trait::async_trait;
use thiserror::Error;

use shopgauge_core::domain::customer::{Customer, CustomerId};
use shopgauge_core::domain::order::{Order, OrderStatus};
use shopgauge_core::domain::product::{Product, ProductId};
use shopgauge_core::window::DateWindow;

pub mod customer;
pub mod memory;
pub mod order;
pub mod product;

pub use customer::SqlCustomerRepository;
pub use memory::{InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryProductRepository};
pub use order::SqlOrderRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read access to stored orders. Implementations return orders whose
/// `placed_at` falls inside the window and whose status is in `statuses`,
/// lines included.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn list_in_window(
        &self,
        window: &DateWindow,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}
