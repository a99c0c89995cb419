//! SQLite-backed interaction store shared by `ingest`, `recommend` and
//! `status`.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use crate::model::{Dataset, Interaction, ItemRecord, StoreCounts};

pub const DB_SCHEMA_VERSION: &str = "0.1.0";

pub fn open_read_only(db_path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database read-only: {}", db_path.display()))
}

pub fn open_for_write(db_path: &Path) -> Result<Connection> {
    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open database: {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS items (
              item_id INTEGER PRIMARY KEY,
              kind TEXT NOT NULL DEFAULT '',
              features TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS interactions (
              seq INTEGER PRIMARY KEY AUTOINCREMENT,
              user_id INTEGER NOT NULL,
              item_id INTEGER NOT NULL,
              rating INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_interactions_user ON interactions(user_id, seq);
            ",
        )
        .context("failed to create store schema")?;
    Ok(())
}

/// Replaces the store contents with `dataset`. Interactions keep the order
/// they have in the dataset.
pub fn replace_dataset(connection: &mut Connection, dataset: &Dataset, loaded_at: &str) -> Result<()> {
    let tx = connection
        .transaction()
        .context("failed to begin ingest transaction")?;

    tx.execute_batch("DELETE FROM interactions; DELETE FROM items;")
        .context("failed to clear previous dataset")?;

    {
        let mut insert_item = tx.prepare(
            "INSERT OR REPLACE INTO items (item_id, kind, features) VALUES (?1, ?2, ?3)",
        )?;
        for item in &dataset.items {
            let features = serde_json::to_string(&item.features)
                .with_context(|| format!("failed to encode features for item {}", item.item_id))?;
            insert_item
                .execute(params![item.item_id, item.kind, features])
                .with_context(|| format!("failed to insert item {}", item.item_id))?;
        }

        let mut insert_interaction = tx.prepare(
            "INSERT INTO interactions (user_id, item_id, rating) VALUES (?1, ?2, ?3)",
        )?;
        for interaction in &dataset.interactions {
            insert_interaction
                .execute(params![
                    interaction.user_id,
                    interaction.item_id,
                    interaction.rating
                ])
                .with_context(|| {
                    format!(
                        "failed to insert interaction user={} item={}",
                        interaction.user_id, interaction.item_id
                    )
                })?;
        }
    }

    for (key, value) in [
        ("db_schema_version", DB_SCHEMA_VERSION),
        ("loaded_at", loaded_at),
    ] {
        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .with_context(|| format!("failed to write metadata key {key}"))?;
    }

    tx.commit().context("failed to commit ingest transaction")?;
    Ok(())
}

pub fn load_items(connection: &Connection) -> Result<Vec<ItemRecord>> {
    let mut statement =
        connection.prepare("SELECT item_id, kind, features FROM items ORDER BY item_id")?;
    let mut rows = statement.query([])?;

    let mut out = Vec::<ItemRecord>::new();
    while let Some(row) = rows.next()? {
        let item_id = row.get::<_, i64>(0)?;
        let raw_features = row.get::<_, String>(2)?;
        let features = serde_json::from_str::<Vec<f32>>(&raw_features)
            .with_context(|| format!("invalid feature vector for item {item_id}"))?;
        out.push(ItemRecord {
            item_id,
            kind: row.get(1)?,
            features,
        });
    }
    Ok(out)
}

/// All interactions, oldest first.
pub fn load_interactions(connection: &Connection) -> Result<Vec<Interaction>> {
    let mut statement =
        connection.prepare("SELECT user_id, item_id, rating FROM interactions ORDER BY seq")?;
    let rows = statement.query_map([], |row| {
        Ok(Interaction {
            user_id: row.get(0)?,
            item_id: row.get(1)?,
            rating: row.get(2)?,
        })
    })?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read interactions")
}

pub fn counts(connection: &Connection) -> Result<StoreCounts> {
    Ok(StoreCounts {
        items: query_count(connection, "SELECT COUNT(*) FROM items")?,
        users: query_count(connection, "SELECT COUNT(DISTINCT user_id) FROM interactions")?,
        interactions: query_count(connection, "SELECT COUNT(*) FROM interactions")?,
    })
}

pub fn metadata_value(connection: &Connection, key: &str) -> Result<Option<String>> {
    connection
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .with_context(|| format!("failed to read metadata key {key}"))
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection
        .query_row(sql, [], |row| row.get(0))
        .with_context(|| format!("failed to run count query: {sql}"))?;
    Ok(count)
}
