//! In-memory repository doubles used by tests and the demo seed path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use shopgauge_core::domain::customer::{Customer, CustomerId};
use shopgauge_core::domain::order::{Order, OrderStatus};
use shopgauge_core::domain::product::{Product, ProductId};
use shopgauge_core::window::DateWindow;

use super::{CustomerRepository, OrderRepository, ProductRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
    fetches: AtomicU64,
}

impl InMemoryOrderRepository {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self { orders: RwLock::new(orders), fetches: AtomicU64::new(0) }
    }

    pub async fn insert(&self, order: Order) {
        self.orders.write().await.push(order);
    }

    /// Number of `list_in_window` calls served. Lets tests observe whether
    /// the result cache actually short-circuited a recomputation.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list_in_window(
        &self,
        window: &DateWindow,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|order| window.contains(order.placed_at) && statuses.contains(&order.status))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        let map = products.into_iter().map(|product| (product.id.clone(), product)).collect();
        Self { products: RwLock::new(map) }
    }

    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id.clone(), product);
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<HashMap<CustomerId, Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        let map = customers.into_iter().map(|customer| (customer.id.clone(), customer)).collect();
        Self { customers: RwLock::new(map) }
    }
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.get(id).cloned())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.len() as u64)
    }
}
