use super::auth::{AuthToken, AuthTokenValue, PasswordCredentials, PasswordHasherKind};
use super::user_store::UserStore;
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_database, ForeignKey, Schema, SqlType, Table, DEFAULT_TIMESTAMP,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
    cascade_delete: true,
};

const TABLES: &[Table] = &[
    Table {
        name: "user",
        columns: &[
            sqlite_column!("id", SqlType::Integer, is_primary_key = true),
            sqlite_column!("email", SqlType::Text, non_null = true, is_unique = true),
            sqlite_column!("created", SqlType::Integer, default_value = Some(DEFAULT_TIMESTAMP)),
        ],
        indices: &[("idx_user_email", "email")],
    },
    Table {
        name: "password_credentials",
        columns: &[
            sqlite_column!(
                "user_id",
                SqlType::Integer,
                non_null = true,
                is_unique = true,
                foreign_key = Some(&USER_FK)
            ),
            sqlite_column!("salt", SqlType::Text, non_null = true),
            sqlite_column!("hash", SqlType::Text, non_null = true),
            sqlite_column!("hasher", SqlType::Text, non_null = true),
            sqlite_column!("created", SqlType::Integer, default_value = Some(DEFAULT_TIMESTAMP)),
        ],
        indices: &[],
    },
    Table {
        name: "auth_token",
        columns: &[
            sqlite_column!(
                "user_id",
                SqlType::Integer,
                non_null = true,
                foreign_key = Some(&USER_FK)
            ),
            sqlite_column!("value", SqlType::Text, non_null = true, is_unique = true),
            sqlite_column!("created", SqlType::Integer, default_value = Some(DEFAULT_TIMESTAMP)),
            sqlite_column!("last_used", SqlType::Integer),
        ],
        indices: &[("idx_auth_token_value", "value")],
    },
];

const USER_SCHEMA: Schema = Schema {
    version: 0,
    tables: TABLES,
};

pub struct SqliteUserStore {
    connection: Mutex<Connection>,
}

fn timestamp_from_seconds(seconds: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(seconds)
}

fn seconds_since_epoch(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

fn token_from_row(row: &Row) -> rusqlite::Result<AuthToken> {
    Ok(AuthToken {
        user_id: row.get(0)?,
        value: AuthTokenValue(row.get(1)?),
        created: timestamp_from_seconds(row.get(2)?),
        last_used: row.get::<_, Option<u64>>(3)?.map(timestamp_from_seconds),
    })
}

impl SqliteUserStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let connection = open_database(&db_path, &USER_SCHEMA)
            .with_context(|| format!("Failed to open user db at {:?}", db_path.as_ref()))?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, email: &str) -> Result<usize> {
        let conn = self.connection.lock().unwrap();
        conn.execute("INSERT INTO user (email) VALUES (?1);", params![email])?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user_id(&self, email: &str) -> Result<Option<usize>> {
        let conn = self.connection.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id FROM user WHERE email = ?1;",
                params![email],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get_user_email(&self, user_id: usize) -> Result<Option<String>> {
        let conn = self.connection.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT email FROM user WHERE id = ?1;",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>> {
        let conn = self.connection.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT user_id, salt, hash, hasher, created \
                 FROM password_credentials WHERE user_id = ?1;",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, usize>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, u64>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((user_id, salt, hash, hasher, created)) => Ok(Some(PasswordCredentials {
                user_id,
                salt,
                hash,
                hasher: PasswordHasherKind::from_str(&hasher)?,
                created: timestamp_from_seconds(created),
            })),
        }
    }

    fn set_password_credentials(&self, credentials: PasswordCredentials) -> Result<()> {
        let conn = self.connection.lock().unwrap();
        conn.execute(
            "INSERT INTO password_credentials (user_id, salt, hash, hasher, created) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(user_id) DO UPDATE SET salt = ?2, hash = ?3, hasher = ?4;",
            params![
                credentials.user_id,
                credentials.salt,
                credentials.hash,
                credentials.hasher.to_string(),
                seconds_since_epoch(credentials.created),
            ],
        )?;
        Ok(())
    }

    fn add_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.connection.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (user_id, value, created, last_used) VALUES (?1, ?2, ?3, ?4);",
            params![
                token.user_id,
                token.value.0,
                seconds_since_epoch(token.created),
                token.last_used.map(seconds_since_epoch),
            ],
        )?;
        Ok(())
    }

    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.connection.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT user_id, value, created, last_used FROM auth_token WHERE value = ?1;",
                params![value.0],
                token_from_row,
            )
            .optional()?)
    }

    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<bool> {
        let conn = self.connection.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM auth_token WHERE value = ?1;",
            params![value.0],
        )?;
        Ok(deleted > 0)
    }

    fn touch_auth_token(&self, value: &AuthTokenValue) -> Result<()> {
        let conn = self.connection.lock().unwrap();
        conn.execute(
            "UPDATE auth_token SET last_used = cast(strftime('%s','now') as int) WHERE value = ?1;",
            params![value.0],
        )?;
        Ok(())
    }
}
