//! Plain-text schema descriptions and database URI resolution.
//!
//! Schema files look like:
//!
//! ```text
//! Database: shop
//! Table: users
//!   id INTEGER PRIMARY KEY
//!   email TEXT
//! Table: orders
//!   id INTEGER PRIMARY KEY
//!   user_id INTEGER REFERENCES users(id)
//! ```
//!
//! Every `Table: ` marker starts one chunk.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::IngestError;
use crate::store::Document;

/// Database name used when the text has no `Database:` line.
pub const UNKNOWN_DB: &str = "unknown_db";

const TABLE_MARKER: &str = "Table: ";

/// One `Table: ` section of a schema description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSection {
    /// Table name (first line of the section, trimmed).
    pub table: String,
    /// Chunk text, marker included.
    pub content: String,
}

/// A parsed schema description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaText {
    /// Logical database name.
    pub db: String,
    /// Table sections in file order.
    pub tables: Vec<TableSection>,
}

impl SchemaText {
    /// Parses schema text. Never fails; text without markers has no tables.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let db = text
            .lines()
            .find(|line| line.to_lowercase().starts_with("database:"))
            .and_then(|line| line.split_once(':'))
            .map_or_else(|| UNKNOWN_DB.to_string(), |(_, name)| name.trim().to_string());

        let tables = text
            .split(TABLE_MARKER)
            .skip(1)
            .map(|section| TableSection {
                table: section.lines().next().unwrap_or_default().trim().to_string(),
                content: format!("{TABLE_MARKER}{section}"),
            })
            .collect();

        Self { db, tables }
    }

    /// Converts the sections into store documents tagged with `db`, `table`,
    /// `uri` and `type: "schema"`.
    #[must_use]
    pub fn into_documents(self, uri: &str) -> Vec<Document> {
        let db = self.db;
        self.tables
            .into_iter()
            .map(|section| {
                let mut meta = Map::new();
                meta.insert("db".to_string(), Value::String(db.clone()));
                meta.insert("table".to_string(), Value::String(section.table));
                meta.insert("uri".to_string(), Value::String(uri.to_string()));
                meta.insert("type".to_string(), Value::String("schema".to_string()));
                Document::with_metadata(section.content, meta)
            })
            .collect()
    }
}

/// Maps a logical database name to a connection URI.
///
/// Looks `db_name` up in the JSON object at `registry_path` when that file
/// exists. Otherwise ensures `data_dir` exists and returns
/// `sqlite:///<absolute data_dir>/<db_name>.db`.
///
/// # Errors
///
/// Returns [`IngestError::Registry`] if the registry is not a JSON object of
/// strings, or [`IngestError::Io`] if `data_dir` cannot be created.
pub fn resolve_db_uri(
    db_name: &str,
    registry_path: &Path,
    data_dir: &Path,
) -> Result<String, IngestError> {
    if registry_path.exists() {
        let raw = std::fs::read_to_string(registry_path)?;
        let registry: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|e| IngestError::Registry {
                message: e.to_string(),
            })?;
        if let Some(uri) = registry.get(db_name) {
            return uri
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| IngestError::Registry {
                    message: format!("entry for '{db_name}' is not a string"),
                });
        }
    }

    std::fs::create_dir_all(data_dir)?;
    let abs = std::path::absolute(data_dir)?;
    Ok(format!(
        "sqlite:///{}",
        abs.join(format!("{db_name}.db")).display()
    ))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const SHOP: &str = "Database: mydb\n\
                        Table: users\n  id INTEGER\n  email TEXT\n\
                        Table: orders\n  id INTEGER\n  user_id INTEGER\n";

    #[test]
    fn test_two_tables_two_chunks() {
        let parsed = SchemaText::parse(SHOP);
        assert_eq!(parsed.db, "mydb");
        let names: Vec<&str> = parsed.tables.iter().map(|t| t.table.as_str()).collect();
        assert_eq!(names, vec!["users", "orders"]);

        let docs = parsed.into_documents("sqlite:///tmp/mydb.db");
        assert_eq!(docs.len(), 2);
        assert!(docs[0].content.starts_with("Table: users\n"));
        assert!(docs[1].content.starts_with("Table: orders\n"));
        for doc in &docs {
            assert_eq!(doc.metadata["db"], "mydb");
            assert_eq!(doc.metadata["type"], "schema");
            assert_eq!(doc.metadata["uri"], "sqlite:///tmp/mydb.db");
        }
    }

    #[test]
    fn test_database_line_is_case_insensitive() {
        assert_eq!(SchemaText::parse("DATABASE:  Sales \nTable: t\n").db, "Sales");
    }

    #[test]
    fn test_missing_database_line() {
        let parsed = SchemaText::parse("Table: only\n  x INT\n");
        assert_eq!(parsed.db, UNKNOWN_DB);
        assert_eq!(parsed.tables.len(), 1);
    }

    #[test]
    fn test_no_tables() {
        assert!(SchemaText::parse("Database: empty\n").tables.is_empty());
    }

    #[test]
    fn test_registry_hit() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let registry = tmp.path().join("db_registry.json");
        std::fs::write(&registry, r#"{"mydb": "postgresql://db.internal/mydb"}"#)
            .unwrap_or_else(|e| panic!("write failed: {e}"));
        let data_dir = tmp.path().join("data");

        let uri = resolve_db_uri("mydb", &registry, &data_dir)
            .unwrap_or_else(|e| panic!("resolve failed: {e}"));
        assert_eq!(uri, "postgresql://db.internal/mydb");
        assert!(!data_dir.exists());
    }

    #[test]
    fn test_registry_miss_falls_back_to_sqlite_file() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let registry = tmp.path().join("db_registry.json");
        std::fs::write(&registry, r#"{"other": "x"}"#).unwrap_or_else(|e| panic!("write failed: {e}"));
        let data_dir = tmp.path().join("data");

        let uri = resolve_db_uri("mydb", &registry, &data_dir)
            .unwrap_or_else(|e| panic!("resolve failed: {e}"));
        assert!(uri.starts_with("sqlite:///"));
        assert!(uri.ends_with("mydb.db"));
        assert!(data_dir.is_dir());
    }

    #[test]
    fn test_no_registry_file() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let uri = resolve_db_uri("shop", &tmp.path().join("missing.json"), &tmp.path().join("d"))
            .unwrap_or_else(|e| panic!("resolve failed: {e}"));
        assert!(uri.contains(&tmp.path().join("d").join("shop.db").display().to_string()));
    }

    #[test]
    fn test_malformed_registry() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let registry = tmp.path().join("db_registry.json");
        std::fs::write(&registry, "[1, 2]").unwrap_or_else(|e| panic!("write failed: {e}"));

        let result = resolve_db_uri("mydb", &registry, tmp.path());
        assert!(matches!(result, Err(IngestError::Registry { .. })));
    }
}
