use super::models::{Singer, SingerWithSongs, Song};
use crate::text::Language;
use anyhow::Result;

/// Storage backend for singers and their songs.
///
/// Delete operations are scoped to the owning user and report whether a row
/// was actually removed. Deleting a singer cascade-deletes its songs.
pub trait LibraryStore: Send + Sync {
    /// Creates a singer for the given user and returns the stored record.
    fn create_singer(&self, user_id: usize, name: &str, image_url: Option<&str>)
        -> Result<Singer>;

    /// Creates a song for the given singer and returns the stored record.
    fn create_song(&self, singer_id: usize, title: &str, language: Language) -> Result<Song>;

    /// Deletes a singer owned by the given user, with all of its songs.
    fn delete_singer(&self, singer_id: usize, user_id: usize) -> Result<bool>;

    /// Deletes a song whose singer is owned by the given user.
    fn delete_song(&self, song_id: usize, user_id: usize) -> Result<bool>;

    /// Returns all singers of the given user, each joined with its songs.
    fn get_singers_with_songs(&self, user_id: usize) -> Result<Vec<SingerWithSongs>>;
}
