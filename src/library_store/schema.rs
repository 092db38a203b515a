use crate::sqlite_column;
use crate::sqlite_persistence::{ForeignKey, Schema, SqlType, Table, DEFAULT_TIMESTAMP};

const SONG_SINGER_FK: ForeignKey = ForeignKey {
    foreign_table: "singer",
    foreign_column: "id",
    cascade_delete: true,
};

// user ids live in a separate database file, so there is no cross-db foreign key.
const TABLES: &[Table] = &[
    Table {
        name: "singer",
        columns: &[
            sqlite_column!("id", SqlType::Integer, is_primary_key = true),
            sqlite_column!("user_id", SqlType::Integer, non_null = true),
            sqlite_column!("name", SqlType::Text, non_null = true),
            sqlite_column!("image_url", SqlType::Text),
            sqlite_column!("created", SqlType::Integer, default_value = Some(DEFAULT_TIMESTAMP)),
            sqlite_column!("updated", SqlType::Integer, default_value = Some(DEFAULT_TIMESTAMP)),
        ],
        indices: &[("idx_singer_user_id", "user_id")],
    },
    Table {
        name: "song",
        columns: &[
            sqlite_column!("id", SqlType::Integer, is_primary_key = true),
            sqlite_column!(
                "singer_id",
                SqlType::Integer,
                non_null = true,
                foreign_key = Some(&SONG_SINGER_FK)
            ),
            sqlite_column!("title", SqlType::Text, non_null = true),
            sqlite_column!("language", SqlType::Text, non_null = true),
            sqlite_column!("created", SqlType::Integer, default_value = Some(DEFAULT_TIMESTAMP)),
            sqlite_column!("updated", SqlType::Integer, default_value = Some(DEFAULT_TIMESTAMP)),
        ],
        indices: &[("idx_song_singer_id", "singer_id")],
    },
];

pub const LIBRARY_SCHEMA: Schema = Schema {
    version: 0,
    tables: TABLES,
};
