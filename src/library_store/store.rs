use super::models::{Singer, SingerWithSongs, Song};
use super::schema::LIBRARY_SCHEMA;
use super::trait_def::LibraryStore;
use crate::sqlite_persistence::open_database;
use crate::text::Language;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub struct SqliteLibraryStore {
    connection: Mutex<Connection>,
}

fn timestamp_from_row(row: &Row, index: usize) -> rusqlite::Result<SystemTime> {
    let seconds: u64 = row.get(index)?;
    Ok(UNIX_EPOCH + Duration::from_secs(seconds))
}

fn singer_from_row(row: &Row) -> rusqlite::Result<Singer> {
    Ok(Singer {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        image_url: row.get(3)?,
        created: timestamp_from_row(row, 4)?,
        updated: timestamp_from_row(row, 5)?,
    })
}

fn song_from_row(row: &Row) -> rusqlite::Result<Song> {
    let language: String = row.get(3)?;
    Ok(Song {
        id: row.get(0)?,
        singer_id: row.get(1)?,
        title: row.get(2)?,
        language: Language::from_str(&language).map_err(|_| {
            rusqlite::Error::InvalidColumnType(3, "language".to_string(), rusqlite::types::Type::Text)
        })?,
        created: timestamp_from_row(row, 4)?,
        updated: timestamp_from_row(row, 5)?,
    })
}

impl SqliteLibraryStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let connection = open_database(&db_path, &LIBRARY_SCHEMA)
            .with_context(|| format!("Failed to open library db at {:?}", db_path.as_ref()))?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}

impl LibraryStore for SqliteLibraryStore {
    fn create_singer(
        &self,
        user_id: usize,
        name: &str,
        image_url: Option<&str>,
    ) -> Result<Singer> {
        let conn = self.connection.lock().unwrap();
        conn.execute(
            "INSERT INTO singer (user_id, name, image_url) VALUES (?1, ?2, ?3);",
            params![user_id, name, image_url],
        )?;
        let id = conn.last_insert_rowid();
        let singer = conn.query_row(
            "SELECT id, user_id, name, image_url, created, updated FROM singer WHERE id = ?1;",
            params![id],
            singer_from_row,
        )?;
        Ok(singer)
    }

    fn create_song(&self, singer_id: usize, title: &str, language: Language) -> Result<Song> {
        let conn = self.connection.lock().unwrap();
        conn.execute(
            "INSERT INTO song (singer_id, title, language) VALUES (?1, ?2, ?3);",
            params![singer_id, title, language.as_str()],
        )?;
        let id = conn.last_insert_rowid();
        let song = conn.query_row(
            "SELECT id, singer_id, title, language, created, updated FROM song WHERE id = ?1;",
            params![id],
            song_from_row,
        )?;
        Ok(song)
    }

    fn delete_singer(&self, singer_id: usize, user_id: usize) -> Result<bool> {
        let conn = self.connection.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM singer WHERE id = ?1 AND user_id = ?2;",
            params![singer_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    fn delete_song(&self, song_id: usize, user_id: usize) -> Result<bool> {
        let conn = self.connection.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM song WHERE id = ?1 \
             AND singer_id IN (SELECT id FROM singer WHERE user_id = ?2);",
            params![song_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    fn get_singers_with_songs(&self, user_id: usize) -> Result<Vec<SingerWithSongs>> {
        let conn = self.connection.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, image_url, created, updated \
             FROM singer WHERE user_id = ?1 ORDER BY name;",
        )?;
        let singers: Vec<Singer> = stmt
            .query_map(params![user_id], singer_from_row)?
            .collect::<std::result::Result<_, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT song.id, song.singer_id, song.title, song.language, song.created, song.updated \
             FROM song JOIN singer ON song.singer_id = singer.id \
             WHERE singer.user_id = ?1;",
        )?;
        let songs: Vec<Song> = stmt
            .query_map(params![user_id], song_from_row)?
            .collect::<std::result::Result<_, _>>()?;

        let mut songs_by_singer: HashMap<usize, Vec<Song>> = HashMap::new();
        for song in songs {
            songs_by_singer.entry(song.singer_id).or_default().push(song);
        }

        Ok(singers
            .into_iter()
            .map(|singer| {
                let songs = songs_by_singer.remove(&singer.id).unwrap_or_default();
                SingerWithSongs::new(singer, songs)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteLibraryStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = SqliteLibraryStore::new(tmp.path().join("library.db")).unwrap();
        (store, tmp)
    }

    #[test]
    fn creates_and_lists_singers_with_songs() {
        let (store, _tmp) = create_test_store();

        let singer = store
            .create_singer(1, "Freddie Mercury", Some("https://img/freddie.jpg"))
            .unwrap();
        store
            .create_song(singer.id, "Love Of My Life", Language::En)
            .unwrap();
        store
            .create_song(singer.id, "Somebody To Love", Language::En)
            .unwrap();

        let library = store.get_singers_with_songs(1).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library[0].name(), "Freddie Mercury");
        assert_eq!(
            library[0].singer.image_url.as_deref(),
            Some("https://img/freddie.jpg")
        );
        assert_eq!(library[0].songs.len(), 2);
    }

    #[test]
    fn singers_without_songs_get_an_empty_collection() {
        let (store, _tmp) = create_test_store();
        store.create_singer(1, "Dana", None).unwrap();

        let library = store.get_singers_with_songs(1).unwrap();
        assert_eq!(library.len(), 1);
        assert!(library[0].songs.is_empty());
    }

    #[test]
    fn libraries_are_scoped_per_user() {
        let (store, _tmp) = create_test_store();
        store.create_singer(1, "Dana", None).unwrap();
        store.create_singer(2, "Alon", None).unwrap();

        let user_1 = store.get_singers_with_songs(1).unwrap();
        assert_eq!(user_1.len(), 1);
        assert_eq!(user_1[0].name(), "Dana");
    }

    #[test]
    fn deleting_a_singer_cascades_to_its_songs() {
        let (store, _tmp) = create_test_store();
        let singer = store.create_singer(1, "Dana", None).unwrap();
        store.create_song(singer.id, "דיווה", Language::He).unwrap();

        assert!(store.delete_singer(singer.id, 1).unwrap());
        assert!(store.get_singers_with_songs(1).unwrap().is_empty());
    }

    #[test]
    fn deletes_are_refused_for_the_wrong_user() {
        let (store, _tmp) = create_test_store();
        let singer = store.create_singer(1, "Dana", None).unwrap();
        let song = store.create_song(singer.id, "דיווה", Language::He).unwrap();

        assert!(!store.delete_singer(singer.id, 2).unwrap());
        assert!(!store.delete_song(song.id, 2).unwrap());
        assert_eq!(store.get_singers_with_songs(1).unwrap().len(), 1);
    }

    #[test]
    fn deletes_a_single_song() {
        let (store, _tmp) = create_test_store();
        let singer = store.create_singer(1, "Queen", None).unwrap();
        let song = store
            .create_song(singer.id, "Bohemian Rhapsody", Language::En)
            .unwrap();
        store.create_song(singer.id, "Under Pressure", Language::En).unwrap();

        assert!(store.delete_song(song.id, 1).unwrap());
        let library = store.get_singers_with_songs(1).unwrap();
        assert_eq!(library[0].songs.len(), 1);
        assert_eq!(library[0].songs[0].title, "Under Pressure");
    }

    #[test]
    fn song_language_round_trips() {
        let (store, _tmp) = create_test_store();
        let singer = store.create_singer(1, "דנה", None).unwrap();
        let song = store.create_song(singer.id, "דיווה", Language::He).unwrap();
        assert_eq!(song.language, Language::He);

        let library = store.get_singers_with_songs(1).unwrap();
        assert_eq!(library[0].songs[0].language, Language::He);
    }
}
