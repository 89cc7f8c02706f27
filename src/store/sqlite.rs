//! SQLite-backed ledger: holdings, the transaction log and the watchlist.

use crate::core::ledger::{Holding, Transaction, TransactionKind, validate_quantity};
use crate::core::price::validate_price;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS portfolio (
        token TEXT PRIMARY KEY,
        quantity REAL NOT NULL,
        value REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        token TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        type TEXT NOT NULL,
        quantity REAL NOT NULL,
        price REAL NOT NULL,
        total_value REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS watchlist (
        token TEXT PRIMARY KEY
    )",
];

const UPSERT_HOLDING: &str = "INSERT INTO portfolio (token, quantity, value) VALUES (?, ?, ?)
    ON CONFLICT(token) DO UPDATE SET quantity = excluded.quantity, value = excluded.value";

pub struct Ledger {
    pool: SqlitePool,
    // Serializes writers; readers go straight to the pool.
    write_lock: Mutex<()>,
}

impl Ledger {
    /// Opens (creating if needed) the database file and its tables.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .context("Failed to initialize database schema")?;
        }
        debug!("Opened ledger at {}", path.display());

        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn holding(&self, token: &str) -> Result<Option<Holding>> {
        let row = sqlx::query("SELECT token, quantity, value FROM portfolio WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read holding for {token}"))?;
        row.as_ref().map(holding_from_row).transpose()
    }

    pub async fn holdings(&self) -> Result<Vec<Holding>> {
        let rows = sqlx::query("SELECT token, quantity, value FROM portfolio ORDER BY token")
            .fetch_all(&self.pool)
            .await
            .context("Failed to read holdings")?;
        rows.iter().map(holding_from_row).collect()
    }

    /// Adds `quantity` of `token` bought at `price` and logs the purchase.
    ///
    /// The holding update and the log entry commit together.
    pub async fn record_buy(
        &self,
        token: &str,
        quantity: f64,
        price: f64,
    ) -> Result<(Holding, Transaction)> {
        validate_quantity(quantity)?;
        validate_price(price)?;

        let _guard = self.write_lock.lock().await;
        let mut db_tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let existing = sqlx::query("SELECT token, quantity, value FROM portfolio WHERE token = ?")
            .bind(token)
            .fetch_optional(&mut *db_tx)
            .await?
            .as_ref()
            .map(holding_from_row)
            .transpose()?;

        let holding = Holding::accumulate(existing.as_ref(), token, quantity, price);
        holding.validate()?;
        let mut transaction = Transaction::buy(token, quantity, price);
        transaction.validate()?;

        sqlx::query(UPSERT_HOLDING)
            .bind(holding.token.as_str())
            .bind(holding.quantity)
            .bind(holding.value)
            .execute(&mut *db_tx)
            .await
            .with_context(|| format!("Failed to update holding for {token}"))?;

        let id = insert_transaction(&mut db_tx, &transaction).await?;
        transaction.id = Some(id);

        db_tx.commit().await.context("Failed to commit purchase")?;
        info!(
            token,
            quantity = holding.quantity,
            value = holding.value,
            "Recorded purchase"
        );

        Ok((holding, transaction))
    }

    /// Transaction log, oldest first, optionally restricted to one token.
    pub async fn transactions(&self, token: Option<&str>) -> Result<Vec<Transaction>> {
        let rows = match token {
            Some(token) => {
                sqlx::query(
                    "SELECT id, token, timestamp, type, quantity, price, total_value
                     FROM transactions WHERE token = ? ORDER BY id",
                )
                .bind(token)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, token, timestamp, type, quantity, price, total_value
                     FROM transactions ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to read transactions")?;

        rows.iter().map(transaction_from_row).collect()
    }

    /// Overwrites holdings from a snapshot. The transaction log is untouched.
    pub async fn import_holdings(&self, holdings: &[Holding]) -> Result<usize> {
        for holding in holdings {
            holding.validate()?;
        }

        let _guard = self.write_lock.lock().await;
        let mut db_tx = self.pool.begin().await.context("Failed to begin transaction")?;
        for holding in holdings {
            sqlx::query(UPSERT_HOLDING)
                .bind(holding.token.as_str())
                .bind(holding.quantity)
                .bind(holding.value)
                .execute(&mut *db_tx)
                .await
                .with_context(|| format!("Failed to import holding for {}", holding.token))?;
        }
        db_tx.commit().await.context("Failed to commit import")?;

        info!(count = holdings.len(), "Imported holdings");
        Ok(holdings.len())
    }

    /// Returns `true` when the token was not on the watchlist yet.
    pub async fn watchlist_add(&self, token: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query("INSERT OR IGNORE INTO watchlist (token) VALUES (?)")
            .bind(token)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to add {token} to watchlist"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `true` when the token was on the watchlist.
    pub async fn watchlist_remove(&self, token: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query("DELETE FROM watchlist WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove {token} from watchlist"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn watchlist(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT token FROM watchlist ORDER BY token")
            .fetch_all(&self.pool)
            .await
            .context("Failed to read watchlist")?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("token").map_err(Into::into))
            .collect()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn insert_transaction(
    db_tx: &mut sqlx::Transaction<'_, Sqlite>,
    transaction: &Transaction,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO transactions (token, timestamp, type, quantity, price, total_value)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(transaction.token.as_str())
    .bind(transaction.timestamp)
    .bind(transaction.kind.to_string())
    .bind(transaction.quantity)
    .bind(transaction.price)
    .bind(transaction.total_value)
    .execute(&mut **db_tx)
    .await
    .with_context(|| format!("Failed to log transaction for {}", transaction.token))?;
    Ok(result.last_insert_rowid())
}

fn holding_from_row(row: &SqliteRow) -> Result<Holding> {
    Ok(Holding {
        token: row.try_get("token")?,
        quantity: row.try_get("quantity")?,
        value: row.try_get("value")?,
    })
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction> {
    let kind: String = row.try_get("type")?;
    let timestamp: DateTime<Utc> = row.try_get("timestamp")?;
    Ok(Transaction {
        id: Some(row.try_get("id")?),
        token: row.try_get("token")?,
        timestamp,
        kind: kind.parse::<TransactionKind>()?,
        quantity: row.try_get("quantity")?,
        price: row.try_get("price")?,
        total_value: row.try_get("total_value")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_ledger() -> (TempDir, Ledger) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(&dir.path().join("portfolio.db")).await.unwrap();
        (dir, ledger)
    }

    #[tokio::test]
    async fn test_record_buy_creates_holding() {
        let (_dir, ledger) = open_ledger().await;

        let (holding, tx) = ledger.record_buy("DOGE", 100.0, 0.25).await.unwrap();
        assert_eq!(holding.quantity, 100.0);
        assert_eq!(holding.value, 25.0);
        assert_eq!(tx.id, Some(1));

        let stored = ledger.holding("DOGE").await.unwrap().unwrap();
        assert_eq!(stored, holding);
    }

    #[tokio::test]
    async fn test_record_buy_accumulates_and_revalues() {
        let (_dir, ledger) = open_ledger().await;

        ledger.record_buy("SHIB", 1000.0, 0.01).await.unwrap();
        let (holding, _) = ledger.record_buy("SHIB", 500.0, 0.02).await.unwrap();

        assert_eq!(holding.quantity, 1500.0);
        assert!((holding.value - 30.0).abs() < 1e-9);
        assert_eq!(ledger.holdings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transactions_are_appended_in_order() {
        let (_dir, ledger) = open_ledger().await;

        ledger.record_buy("DOGE", 10.0, 0.1).await.unwrap();
        ledger.record_buy("BONK", 1e6, 0.00002).await.unwrap();
        ledger.record_buy("DOGE", 5.0, 0.2).await.unwrap();

        let all = ledger.transactions(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(
            all.iter().map(|t| t.token.as_str()).collect::<Vec<_>>(),
            vec!["DOGE", "BONK", "DOGE"]
        );
        assert!(all.iter().all(|t| t.kind == TransactionKind::Buy));

        let doge = ledger.transactions(Some("DOGE")).await.unwrap();
        assert_eq!(doge.len(), 2);
        assert_eq!(doge[0].price, 0.1);
        assert!((doge[1].total_value - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_record_buy_rejects_invalid_input() {
        let (_dir, ledger) = open_ledger().await;

        assert!(ledger.record_buy("DOGE", 0.0, 0.1).await.is_err());
        assert!(ledger.record_buy("DOGE", 1.0, f64::NAN).await.is_err());
        assert!(ledger.holdings().await.unwrap().is_empty());
        assert!(ledger.transactions(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_buy_rejects_overflowing_value() {
        let (_dir, ledger) = open_ledger().await;

        let err = ledger.record_buy("BIG", 1e300, 1e10).await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid value inf for token BIG"));
        assert!(ledger.holding("BIG").await.unwrap().is_none());
        assert!(ledger.transactions(None).await.unwrap().is_empty());

        ledger.record_buy("BIG", 1e300, 1.0).await.unwrap();
        assert!(ledger.record_buy("BIG", f64::MAX, 1.0).await.is_err());
        let stored = ledger.holding("BIG").await.unwrap().unwrap();
        assert_eq!(stored.quantity, 1e300);
        assert_eq!(ledger.transactions(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_watchlist_set_semantics() {
        let (_dir, ledger) = open_ledger().await;

        assert!(ledger.watchlist_add("PEPE").await.unwrap());
        assert!(!ledger.watchlist_add("PEPE").await.unwrap());
        assert!(ledger.watchlist_add("BONK").await.unwrap());
        assert_eq!(ledger.watchlist().await.unwrap(), vec!["BONK", "PEPE"]);

        assert!(ledger.watchlist_remove("PEPE").await.unwrap());
        assert!(!ledger.watchlist_remove("PEPE").await.unwrap());
        assert_eq!(ledger.watchlist().await.unwrap(), vec!["BONK"]);
    }

    #[tokio::test]
    async fn test_import_holdings_leaves_log_alone() {
        let (_dir, ledger) = open_ledger().await;
        ledger.record_buy("DOGE", 10.0, 0.1).await.unwrap();

        let snapshot = vec![
            Holding {
                token: "DOGE".to_string(),
                quantity: 42.0,
                value: 4.2,
            },
            Holding {
                token: "BTC".to_string(),
                quantity: 2.0,
                value: 60000.0,
            },
        ];
        assert_eq!(ledger.import_holdings(&snapshot).await.unwrap(), 2);

        let holdings = ledger.holdings().await.unwrap();
        assert_eq!(holdings, vec![snapshot[1].clone(), snapshot[0].clone()]);
        assert_eq!(ledger.transactions(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_data_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("portfolio.db");
        {
            let ledger = Ledger::open(&path).await.unwrap();
            ledger.record_buy("FIDA", 3.0, 0.5).await.unwrap();
            ledger.close().await;
        }
        let ledger = Ledger::open(&path).await.unwrap();
        assert_eq!(ledger.holding("FIDA").await.unwrap().unwrap().quantity, 3.0);
    }
}
