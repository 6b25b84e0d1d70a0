use chrono::{DateTime, Utc};
use sqlx::Row;

use shopgauge_core::domain::customer::{Customer, CustomerId};

use super::{CustomerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM customers WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| decode_customer(&row)).transpose()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM customers")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.get("count");
        Ok(count.max(0) as u64)
    }
}

fn decode_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let created_at_raw: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_raw)
        .map_err(|err| RepositoryError::Decode(format!("created_at `{created_at_raw}`: {err}")))?
        .with_timezone(&Utc);

    Ok(Customer {
        id: CustomerId(row.get("id")),
        name: row.get("name"),
        email: row.get("email"),
        created_at,
    })
}
