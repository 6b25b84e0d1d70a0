use sqlx::migrate::{MigrateError, Migrator};
use sqlx::Row;

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Tables owned by the migration set, in creation order.
pub const MANAGED_TABLES: &[&str] = &["customers", "products", "orders", "order_lines"];

/// Applies any unapplied migrations, returning how many were run. Zero means
/// the schema was already current.
pub async fn run_pending(pool: &DbPool) -> Result<usize, MigrateError> {
    let before = applied_count(pool).await?;
    MIGRATOR.run(pool).await?;
    let after = applied_count(pool).await?;
    Ok(after.saturating_sub(before))
}

async fn applied_count(pool: &DbPool) -> Result<usize, sqlx::Error> {
    let ledger = sqlx::query(
        "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if ledger.get::<i64, _>("count") == 0 {
        return Ok(0);
    }

    let row = sqlx::query("SELECT COUNT(*) AS count FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;
    Ok(row.get::<i64, _>("count") as usize)
}

/// Managed tables not present in the connected database. Used by readiness
/// checks to tell an unmigrated database apart from a broken one.
pub async fn missing_tables(pool: &DbPool) -> Result<Vec<&'static str>, sqlx::Error> {
    let mut missing = Vec::new();
    for table in MANAGED_TABLES {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(pool)
        .await?;
        if row.get::<i64, _>("count") == 0 {
            missing.push(*table);
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::{missing_tables, run_pending, MANAGED_TABLES};
    use crate::{connect_with_settings, migrations::MIGRATOR};

    #[tokio::test]
    async fn migrations_create_baseline_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");

        assert_eq!(missing_tables(&pool).await.expect("inspect"), MANAGED_TABLES);

        let applied = run_pending(&pool).await.expect("run migrations");
        assert_eq!(applied, 1);
        assert!(missing_tables(&pool).await.expect("inspect").is_empty());

        // Idempotent: a second run applies nothing.
        assert_eq!(run_pending(&pool).await.expect("re-run migrations"), 0);
    }

    #[tokio::test]
    async fn migrations_are_reversible() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");
        assert_eq!(missing_tables(&pool).await.expect("inspect"), MANAGED_TABLES);

        run_pending(&pool).await.expect("re-run migrations");
        assert!(missing_tables(&pool).await.expect("inspect").is_empty());
    }
}
