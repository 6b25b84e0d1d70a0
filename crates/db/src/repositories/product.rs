use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::Row;

use shopgauge_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, category, price, cost, stock FROM products WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| decode_product(&row)).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows =
            sqlx::query("SELECT id, name, category, price, cost, stock FROM products ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(decode_product).collect()
    }
}

fn decode_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let price_raw: String = row.get("price");
    let price = Decimal::from_str(&price_raw)
        .map_err(|err| RepositoryError::Decode(format!("price `{price_raw}`: {err}")))?;

    let cost_raw: String = row.get("cost");
    let cost = Decimal::from_str(&cost_raw)
        .map_err(|err| RepositoryError::Decode(format!("cost `{cost_raw}`: {err}")))?;

    let stock: i64 = row.get("stock");

    Ok(Product {
        id: ProductId(row.get("id")),
        name: row.get("name"),
        category: row.get("category"),
        price,
        cost,
        stock: u32::try_from(stock)
            .map_err(|_| RepositoryError::Decode(format!("negative stock {stock}")))?,
    })
}
