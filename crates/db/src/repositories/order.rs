use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use shopgauge_core::domain::customer::CustomerId;
use shopgauge_core::domain::order::{Order, OrderId, OrderLine, OrderStatus};
use shopgauge_core::domain::product::ProductId;
use shopgauge_core::window::DateWindow;

use super::{OrderRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn list_in_window(
        &self,
        window: &DateWindow,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, RepositoryError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        // Status names come from the enum, never from request input, so
        // inlining them is safe; the window bounds are bound parameters.
        let status_list = statuses
            .iter()
            .map(|status| format!("'{}'", status.as_str()))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "SELECT o.id, o.customer_id, o.placed_at, o.status, o.total,
                    l.product_id, l.quantity
             FROM orders o
             LEFT JOIN order_lines l ON l.order_id = o.id
             WHERE o.placed_at >= ? AND o.placed_at <= ? AND o.status IN ({status_list})
             ORDER BY o.placed_at, o.id"
        );

        let rows = sqlx::query(&sql)
            .bind(window.from.to_rfc3339())
            .bind(window.to.to_rfc3339())
            .fetch_all(&self.pool)
            .await?;

        // Fold the joined rows back into orders, preserving scan order.
        let mut orders: Vec<Order> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let id: String = row.get("id");
            let position = match positions.get(&id) {
                Some(position) => *position,
                None => {
                    orders.push(decode_order(&row)?);
                    positions.insert(id, orders.len() - 1);
                    orders.len() - 1
                }
            };

            let product_id: Option<String> = row.get("product_id");
            if let Some(product_id) = product_id {
                let quantity: i64 = row.get("quantity");
                orders[position].lines.push(OrderLine {
                    product_id: ProductId(product_id),
                    quantity: u32::try_from(quantity).map_err(|_| {
                        RepositoryError::Decode(format!("negative quantity {quantity}"))
                    })?,
                });
            }
        }

        Ok(orders)
    }
}

fn decode_order(row: &sqlx::sqlite::SqliteRow) -> Result<Order, RepositoryError> {
    let placed_at_raw: String = row.get("placed_at");
    let placed_at = DateTime::parse_from_rfc3339(&placed_at_raw)
        .map_err(|err| RepositoryError::Decode(format!("placed_at `{placed_at_raw}`: {err}")))?
        .with_timezone(&Utc);

    let status_raw: String = row.get("status");
    let status = OrderStatus::from_str(&status_raw)
        .map_err(|err| RepositoryError::Decode(err.to_string()))?;

    let total_raw: String = row.get("total");
    let total = Decimal::from_str(&total_raw)
        .map_err(|err| RepositoryError::Decode(format!("total `{total_raw}`: {err}")))?;

    Ok(Order {
        id: OrderId(row.get("id")),
        customer_id: CustomerId(row.get("customer_id")),
        placed_at,
        status,
        total,
        lines: Vec::new(),
    })
}
