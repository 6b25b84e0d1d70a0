//! Deterministic demo dataset for seeding and end-to-end report checks.
//!
//! Order timestamps are anchored relative to a caller-supplied `now`, so a
//! freshly seeded database always has activity inside the default 30-day
//! window. The mix intentionally covers every order status, a product with
//! unknown cost, a critically low-stock product, and customers whose RFM
//! profiles land in different segments.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::Executor;

use shopgauge_core::domain::customer::{Customer, CustomerId};
use shopgauge_core::domain::order::{Order, OrderId, OrderLine, OrderStatus};
use shopgauge_core::domain::product::{Product, ProductId};

use crate::repositories::RepositoryError;
use crate::DbPool;

struct ProductSeed {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    price: i64,
    cost: i64,
    stock: u32,
}

const PRODUCT_SEEDS: &[ProductSeed] = &[
    ProductSeed { id: "prod-espresso", name: "Espresso Maker", category: "kitchen", price: 120, cost: 70, stock: 40 },
    ProductSeed { id: "prod-grinder", name: "Burr Grinder", category: "kitchen", price: 80, cost: 45, stock: 12 },
    ProductSeed { id: "prod-kettle", name: "Gooseneck Kettle", category: "kitchen", price: 45, cost: 20, stock: 3 },
    ProductSeed { id: "prod-hoodie", name: "Logo Hoodie", category: "apparel", price: 55, cost: 22, stock: 60 },
    ProductSeed { id: "prod-tee", name: "Graphic Tee", category: "apparel", price: 25, cost: 8, stock: 9 },
    ProductSeed { id: "prod-beans", name: "House Blend Beans", category: "consumables", price: 18, cost: 0, stock: 200 },
    ProductSeed { id: "prod-mug", name: "Ceramic Mug", category: "kitchen", price: 15, cost: 4, stock: 75 },
];

struct CustomerSeed {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    signed_up_days_ago: i64,
}

const CUSTOMER_SEEDS: &[CustomerSeed] = &[
    CustomerSeed { id: "cust-ada", name: "Ada Fletcher", email: "ada@example.com", signed_up_days_ago: 400 },
    CustomerSeed { id: "cust-bo", name: "Bo Lindqvist", email: "bo@example.com", signed_up_days_ago: 320 },
    CustomerSeed { id: "cust-cy", name: "Cy Okafor", email: "cy@example.com", signed_up_days_ago: 250 },
    CustomerSeed { id: "cust-dee", name: "Dee Marsh", email: "dee@example.com", signed_up_days_ago: 180 },
    CustomerSeed { id: "cust-eli", name: "Eli Navarro", email: "eli@example.com", signed_up_days_ago: 95 },
    CustomerSeed { id: "cust-fay", name: "Fay Brennan", email: "fay@example.com", signed_up_days_ago: 40 },
    CustomerSeed { id: "cust-gus", name: "Gus Ito", email: "gus@example.com", signed_up_days_ago: 12 },
    CustomerSeed { id: "cust-hana", name: "Hana Volkov", email: "hana@example.com", signed_up_days_ago: 500 },
];

struct OrderSeed {
    id: &'static str,
    customer_id: &'static str,
    days_ago: i64,
    status: OrderStatus,
    lines: &'static [(&'static str, u32)],
}

const ORDER_SEEDS: &[OrderSeed] = &[
    // cust-ada: frequent, high value, recent (Champions territory).
    OrderSeed { id: "ord-1001", customer_id: "cust-ada", days_ago: 80, status: OrderStatus::Delivered, lines: &[("prod-espresso", 1), ("prod-beans", 2)] },
    OrderSeed { id: "ord-1002", customer_id: "cust-ada", days_ago: 66, status: OrderStatus::Delivered, lines: &[("prod-grinder", 1)] },
    OrderSeed { id: "ord-1003", customer_id: "cust-ada", days_ago: 52, status: OrderStatus::Delivered, lines: &[("prod-beans", 3)] },
    OrderSeed { id: "ord-1004", customer_id: "cust-ada", days_ago: 38, status: OrderStatus::Delivered, lines: &[("prod-kettle", 1), ("prod-mug", 2)] },
    OrderSeed { id: "ord-1005", customer_id: "cust-ada", days_ago: 24, status: OrderStatus::Shipped, lines: &[("prod-espresso", 1)] },
    OrderSeed { id: "ord-1006", customer_id: "cust-ada", days_ago: 10, status: OrderStatus::Paid, lines: &[("prod-beans", 4), ("prod-mug", 1)] },
    OrderSeed { id: "ord-1007", customer_id: "cust-ada", days_ago: 3, status: OrderStatus::Paid, lines: &[("prod-hoodie", 2)] },
    // cust-bo: steady repeat buyer.
    OrderSeed { id: "ord-1010", customer_id: "cust-bo", days_ago: 75, status: OrderStatus::Delivered, lines: &[("prod-hoodie", 1)] },
    OrderSeed { id: "ord-1011", customer_id: "cust-bo", days_ago: 45, status: OrderStatus::Delivered, lines: &[("prod-tee", 2), ("prod-mug", 1)] },
    OrderSeed { id: "ord-1012", customer_id: "cust-bo", days_ago: 20, status: OrderStatus::Delivered, lines: &[("prod-grinder", 1)] },
    OrderSeed { id: "ord-1013", customer_id: "cust-bo", days_ago: 6, status: OrderStatus::Shipped, lines: &[("prod-beans", 2)] },
    // cust-cy: lapsed frequent buyer (At Risk).
    OrderSeed { id: "ord-1020", customer_id: "cust-cy", days_ago: 230, status: OrderStatus::Delivered, lines: &[("prod-espresso", 1)] },
    OrderSeed { id: "ord-1021", customer_id: "cust-cy", days_ago: 215, status: OrderStatus::Delivered, lines: &[("prod-beans", 2)] },
    OrderSeed { id: "ord-1022", customer_id: "cust-cy", days_ago: 200, status: OrderStatus::Delivered, lines: &[("prod-mug", 4)] },
    // cust-dee: one old mid-value order (Lost / Cannot Lose Them boundary).
    OrderSeed { id: "ord-1030", customer_id: "cust-dee", days_ago: 190, status: OrderStatus::Delivered, lines: &[("prod-hoodie", 1), ("prod-tee", 1)] },
    // cust-eli: cancelled plus one kept order.
    OrderSeed { id: "ord-1040", customer_id: "cust-eli", days_ago: 28, status: OrderStatus::Cancelled, lines: &[("prod-espresso", 1)] },
    OrderSeed { id: "ord-1041", customer_id: "cust-eli", days_ago: 26, status: OrderStatus::Paid, lines: &[("prod-tee", 1)] },
    // cust-fay: new, recent, single order (Potential Loyalist).
    OrderSeed { id: "ord-1050", customer_id: "cust-fay", days_ago: 8, status: OrderStatus::Paid, lines: &[("prod-kettle", 1)] },
    // cust-gus: pending order only, excluded from all analytics.
    OrderSeed { id: "ord-1060", customer_id: "cust-gus", days_ago: 1, status: OrderStatus::Pending, lines: &[("prod-mug", 2)] },
    // Fast-moving tee drains stock inside the velocity window.
    OrderSeed { id: "ord-1070", customer_id: "cust-bo", days_ago: 5, status: OrderStatus::Delivered, lines: &[("prod-tee", 6)] },
    OrderSeed { id: "ord-1071", customer_id: "cust-fay", days_ago: 2, status: OrderStatus::Paid, lines: &[("prod-tee", 8)] },
];

pub struct DemoDataset;

impl DemoDataset {
    pub fn products() -> Vec<Product> {
        PRODUCT_SEEDS
            .iter()
            .map(|seed| Product {
                id: ProductId(seed.id.to_string()),
                name: seed.name.to_string(),
                category: seed.category.to_string(),
                price: Decimal::from(seed.price),
                cost: Decimal::from(seed.cost),
                stock: seed.stock,
            })
            .collect()
    }

    pub fn customers(now: DateTime<Utc>) -> Vec<Customer> {
        CUSTOMER_SEEDS
            .iter()
            .map(|seed| Customer {
                id: CustomerId(seed.id.to_string()),
                name: seed.name.to_string(),
                email: seed.email.to_string(),
                created_at: now - Duration::days(seed.signed_up_days_ago),
            })
            .collect()
    }

    pub fn orders(now: DateTime<Utc>) -> Vec<Order> {
        ORDER_SEEDS.iter().map(|seed| Self::build_order(seed, now)).collect()
    }

    fn build_order(seed: &OrderSeed, now: DateTime<Utc>) -> Order {
        // Checkout-time total: in the fixtures the stored price is the
        // current catalog price, so totals reconcile with live projections.
        let total: Decimal = seed
            .lines
            .iter()
            .map(|(product_id, quantity)| {
                let price = PRODUCT_SEEDS
                    .iter()
                    .find(|product| product.id == *product_id)
                    .map(|product| product.price)
                    .unwrap_or(0);
                Decimal::from(price) * Decimal::from(*quantity)
            })
            .sum();

        Order {
            id: OrderId(seed.id.to_string()),
            customer_id: CustomerId(seed.customer_id.to_string()),
            placed_at: now - Duration::days(seed.days_ago),
            status: seed.status,
            total,
            lines: seed
                .lines
                .iter()
                .map(|(product_id, quantity)| OrderLine {
                    product_id: ProductId((*product_id).to_string()),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    /// Inserts the full dataset into an empty, migrated database.
    pub async fn load(pool: &DbPool, now: DateTime<Utc>) -> Result<SeedSummary, RepositoryError> {
        let mut tx = pool.begin().await?;

        for customer in Self::customers(now) {
            tx.execute(
                sqlx::query(
                    "INSERT INTO customers (id, name, email, created_at) VALUES (?, ?, ?, ?)",
                )
                .bind(customer.id.0)
                .bind(customer.name)
                .bind(customer.email)
                .bind(customer.created_at.to_rfc3339()),
            )
            .await?;
        }

        for product in Self::products() {
            tx.execute(
                sqlx::query(
                    "INSERT INTO products (id, name, category, price, cost, stock)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(product.id.0)
                .bind(product.name)
                .bind(product.category)
                .bind(product.price.to_string())
                .bind(product.cost.to_string())
                .bind(i64::from(product.stock)),
            )
            .await?;
        }

        let orders = Self::orders(now);
        for order in &orders {
            tx.execute(
                sqlx::query(
                    "INSERT INTO orders (id, customer_id, placed_at, status, total)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&order.id.0)
                .bind(&order.customer_id.0)
                .bind(order.placed_at.to_rfc3339())
                .bind(order.status.as_str())
                .bind(order.total.to_string()),
            )
            .await?;

            for line in &order.lines {
                tx.execute(
                    sqlx::query(
                        "INSERT INTO order_lines (order_id, product_id, quantity)
                         VALUES (?, ?, ?)",
                    )
                    .bind(&order.id.0)
                    .bind(&line.product_id.0)
                    .bind(i64::from(line.quantity)),
                )
                .await?;
            }
        }

        tx.commit().await?;

        Ok(SeedSummary {
            customers: CUSTOMER_SEEDS.len(),
            products: PRODUCT_SEEDS.len(),
            orders: ORDER_SEEDS.len(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use shopgauge_core::domain::order::OrderStatus;
    use shopgauge_core::window::DateWindow;

    use crate::repositories::{OrderRepository, SqlOrderRepository};
    use crate::{connect_with_settings, migrations};

    use super::DemoDataset;

    #[test]
    fn every_order_line_references_a_seeded_product() {
        let products = DemoDataset::products();
        for order in DemoDataset::orders(Utc::now()) {
            for line in &order.lines {
                assert!(
                    products.iter().any(|product| product.id == line.product_id),
                    "order {} references unknown product {}",
                    order.id.0,
                    line.product_id.0
                );
            }
        }
    }

    #[test]
    fn totals_match_line_prices() {
        let products = DemoDataset::products();
        for order in DemoDataset::orders(Utc::now()) {
            let expected: rust_decimal::Decimal = order
                .lines
                .iter()
                .map(|line| {
                    let product =
                        products.iter().find(|product| product.id == line.product_id).expect("product");
                    product.price * rust_decimal::Decimal::from(line.quantity)
                })
                .sum();
            assert_eq!(order.total, expected, "order {} total mismatch", order.id.0);
        }
    }

    #[tokio::test]
    async fn seeded_database_serves_windowed_order_queries() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let now = Utc::now();
        let summary = DemoDataset::load(&pool, now).await.expect("seed");
        assert_eq!(summary.orders, 21);

        let repo = SqlOrderRepository::new(pool);
        let window = DateWindow::trailing(now, 30);
        let qualifying =
            repo.list_in_window(&window, OrderStatus::QUALIFYING).await.expect("query");

        // Qualifying orders within 30 days of the anchor, Pending/Cancelled excluded.
        assert_eq!(qualifying.len(), 9);
        assert!(qualifying.iter().all(|order| order.status.is_qualifying()));
        assert!(qualifying.iter().all(|order| !order.lines.is_empty()));
    }
}
