//! services/api/src/adapters/postgres.rs
//!
//! This module contains the PostgreSQL adapter, a concrete implementation of
//! the `DocumentStore` port from the `core` crate.
//!
//! Every write is stored as one row keyed by its path. A read reassembles the
//! subtree at a path from three kinds of rows: the nearest ancestor (whose
//! JSON may contain the path), the row at the path itself, and every row
//! below it.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};
use studio_booking_core::ports::{resolve_server_values, DocumentStore, PortError, PortResult};

use super::{push_key, segments};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DocumentStore` port.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new `PgDocumentStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn db_error(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Normalizes a path to `a/b/c` form, the shape used as the row key.
fn normalize(path: &str) -> String {
    segments(path).join("/")
}

//=========================================================================================
// Subtree assembly
//=========================================================================================

/// A row read back for a path, positioned relative to that path.
enum Placement {
    /// The row sits above the path; these segments lead down to it.
    Ancestor(Vec<String>),
    Exact,
    /// The row sits below the path at these relative segments.
    Descendant(Vec<String>),
}

fn place(target: &str, row_path: &str) -> Placement {
    let target: Vec<&str> = segments(target);
    let row: Vec<&str> = segments(row_path);
    if row.len() < target.len() {
        Placement::Ancestor(target[row.len()..].iter().map(|s| s.to_string()).collect())
    } else if row.len() == target.len() {
        Placement::Exact
    } else {
        Placement::Descendant(row[target.len()..].iter().map(|s| s.to_string()).collect())
    }
}

fn descend(mut node: Value, path: &[String]) -> Option<Value> {
    for key in path {
        node = match node {
            Value::Object(mut map) => map.remove(key)?,
            Value::Array(mut items) => {
                let index = key.parse::<usize>().ok()?;
                if index >= items.len() {
                    return None;
                }
                items.swap_remove(index)
            }
            _ => return None,
        };
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

fn graft(node: &mut Value, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        let map: Map<String, Value> = match node.take() {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Map::new(),
        };
        *node = Value::Object(map);
    }
    if let Value::Object(map) = node {
        let next = map.entry(first.clone()).or_insert(Value::Null);
        graft(next, rest, value);
    }
}

/// Folds rows (shallowest first) into the value at `target`.
fn assemble(target: &str, rows: Vec<(String, Value)>) -> Option<Value> {
    let mut result: Option<Value> = None;
    for (row_path, value) in rows {
        match place(target, &row_path) {
            Placement::Ancestor(rest) => {
                if let Some(found) = descend(value, &rest) {
                    result = Some(found);
                }
            }
            Placement::Exact => result = Some(value),
            Placement::Descendant(rest) => {
                let node = result.get_or_insert(Value::Null);
                graft(node, &rest, value);
            }
        }
    }
    result
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn read(&self, path: &str) -> PortResult<Option<Value>> {
        let path = normalize(path);
        let prefix = if path.is_empty() { String::new() } else { format!("{}/", path) };

        let rows = sqlx::query(
            "SELECT path, value FROM documents \
             WHERE path = $1 OR path = '' OR starts_with(path, $2) OR starts_with($1, path || '/') \
             ORDER BY length(path) ASC, path ASC",
        )
        .bind(&path)
        .bind(&prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let rows = rows
            .into_iter()
            .map(|row| -> Result<(String, Value), sqlx::Error> {
                Ok((row.try_get("path")?, row.try_get("value")?))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(db_error)?;

        Ok(assemble(&path, rows))
    }

    async fn write(&self, path: &str, mut value: Value) -> PortResult<()> {
        let path = normalize(path);
        resolve_server_values(&mut value, Utc::now().timestamp_millis());

        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let delete = if path.is_empty() {
            sqlx::query("DELETE FROM documents")
        } else {
            sqlx::query("DELETE FROM documents WHERE path = $1 OR starts_with(path, $1 || '/')").bind(&path)
        };
        delete.execute(&mut *tx).await.map_err(db_error)?;

        // Ancestor rows may still hold an older copy of this subtree.
        let parts = segments(&path);
        for depth in 0..parts.len() {
            let ancestor = parts[..depth].join("/");
            let inner: Vec<String> = parts[depth..].iter().map(|s| s.to_string()).collect();
            sqlx::query("UPDATE documents SET value = value #- $2 WHERE path = $1")
                .bind(&ancestor)
                .bind(&inner)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        if !value.is_null() {
            sqlx::query("INSERT INTO documents (path, value) VALUES ($1, $2)")
                .bind(&path)
                .bind(&value)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn generate_key(&self, _parent: &str) -> PortResult<String> {
        Ok(push_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(items: &[(&str, Value)]) -> Vec<(String, Value)> {
        items.iter().map(|(p, v)| (p.to_string(), v.clone())).collect()
    }

    #[test]
    fn assembles_descendant_rows_into_a_collection() {
        let value = assemble(
            "bookings/u1",
            rows(&[("bookings/u1/7", json!({ "price": 1 })), ("bookings/u1/9", json!({ "price": 2 }))]),
        );
        assert_eq!(value, Some(json!({ "7": { "price": 1 }, "9": { "price": 2 } })));
    }

    #[test]
    fn reads_into_an_ancestor_row() {
        let value = assemble("courses/1", rows(&[("courses", json!([null, { "id": 1 }]))]));
        assert_eq!(value, Some(json!({ "id": 1 })));

        let missing = assemble("courses/5", rows(&[("courses", json!([null, { "id": 1 }]))]));
        assert_eq!(missing, None);
    }

    #[test]
    fn deeper_rows_override_shallower_ones() {
        let value = assemble(
            "users",
            rows(&[
                ("", json!({ "users": { "a": { "name": "old" } } })),
                ("users", json!({ "a": { "name": "A" } })),
                ("users/b", json!({ "name": "B" })),
            ]),
        );
        assert_eq!(value, Some(json!({ "a": { "name": "A" }, "b": { "name": "B" } })));
    }

    #[test]
    fn nothing_stored_reads_as_none() {
        assert_eq!(assemble("classes", Vec::new()), None);
    }
}
