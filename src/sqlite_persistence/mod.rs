//! Declarative SQLite schema handling shared by the stores.
//!
//! Each store declares its tables as consts and opens its database through
//! [`open_database`], which creates the schema on a fresh file and validates it
//! against the declaration on an existing one.

use anyhow::{bail, Result};
use rusqlite::{params, Connection};
use std::path::Path;

/// SQL default expression for unix-seconds timestamp columns.
pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

/// `PRAGMA user_version` of an initialized database is the schema version plus
/// this base, so that 0 always means "fresh file".
const BASE_DB_VERSION: usize = 1;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SqlType {
    Text,
    Integer,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub cascade_delete: bool,
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<&'static str>,
    pub foreign_key: Option<&'static ForeignKey>,
}

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {{
        #[allow(unused_mut)]
        let mut column = $crate::sqlite_persistence::Column {
            name: $name,
            sql_type: $sql_type,
            is_primary_key: false,
            non_null: false,
            is_unique: false,
            default_value: None,
            foreign_key: None,
        };
        $(column.$field = $value;)*
        column
    }};
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indices: &'static [(&'static str, &'static str)],
}

impl Table {
    fn create(&self, conn: &Connection) -> Result<()> {
        let mut column_defs = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let mut def = format!("{} {}", column.name, column.sql_type.as_sql());
            if column.is_primary_key {
                def.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                def.push_str(" NOT NULL");
            }
            if column.is_unique {
                def.push_str(" UNIQUE");
            }
            if let Some(default_value) = column.default_value {
                def.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(fk) = column.foreign_key {
                def.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    fk.foreign_table,
                    fk.foreign_column,
                    if fk.cascade_delete { "CASCADE" } else { "NO ACTION" }
                ));
            }
            column_defs.push(def);
        }
        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, column_defs.join(", ")),
            params![],
        )?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!("CREATE INDEX {} ON {}({});", index_name, self.name, column_name),
                params![],
            )?;
        }
        Ok(())
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual_columns: Vec<(String, String)> = stmt
            .query_map(params![], |row| Ok((row.get(1)?, row.get(2)?)))?
            .collect::<std::result::Result<_, _>>()?;

        if actual_columns.is_empty() {
            bail!("Table {} is missing", self.name);
        }
        if actual_columns.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}",
                self.name,
                actual_columns.len(),
                self.columns.len()
            );
        }
        for (expected, (actual_name, actual_type)) in self.columns.iter().zip(&actual_columns) {
            if expected.name != actual_name || expected.sql_type.as_sql() != actual_type {
                bail!(
                    "Table {}: expected column {} {}, found {} {}",
                    self.name,
                    expected.name,
                    expected.sql_type.as_sql(),
                    actual_name,
                    actual_type
                );
            }
        }
        Ok(())
    }
}

pub struct Schema {
    pub version: usize,
    pub tables: &'static [Table],
}

impl Schema {
    fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            params![],
        )?;
        Ok(())
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        let db_version: usize =
            conn.query_row("SELECT * FROM pragma_user_version;", params![], |row| row.get(0))?;
        let expected = BASE_DB_VERSION + self.version;
        if db_version != expected {
            bail!("Database version is {}, expected {}", db_version, expected);
        }
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}

/// Opens a database file, creating the schema when the file is fresh and
/// validating it otherwise. Foreign keys are always enabled.
pub fn open_database<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute("PRAGMA foreign_keys = ON;", params![])?;
    let db_version: usize =
        conn.query_row("SELECT * FROM pragma_user_version;", params![], |row| row.get(0))?;
    if db_version == 0 {
        schema.create(&conn)?;
    } else {
        schema.validate(&conn)?;
    }
    Ok(conn)
}
