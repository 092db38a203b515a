use super::snapshot::{LibrarySnapshot, SingerGroup};
use super::LibraryError;
use crate::library_store::{LibraryStore, SingerWithSongs};
use crate::text::{format_singer_name, format_song_title, karaoke_search_url, Language};
use crate::wikipedia::SingerImageResolver;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

const EMPTY_FIELDS_MESSAGE: &str = "Please fill in all fields";

#[derive(Debug)]
pub struct AddSingerOutcome {
    pub singer: SingerWithSongs,
    /// True when the song was merged into an already existing singer instead
    /// of creating a new one.
    pub merged: bool,
}

/// Owns the per-user library snapshots and applies the backend-then-snapshot
/// update sequence for every operation.
///
/// Each operation awaits its backend calls first and only then swaps the
/// snapshot, so a snapshot is never observed half-updated. Concurrent
/// operations for the same user race last-write-wins, as the backend does.
pub struct LibraryManager {
    store: Arc<dyn LibraryStore>,
    image_resolver: Arc<dyn SingerImageResolver>,
    snapshots: Mutex<HashMap<usize, LibrarySnapshot>>,
}

impl LibraryManager {
    pub fn new(store: Arc<dyn LibraryStore>, image_resolver: Arc<dyn SingerImageResolver>) -> Self {
        Self {
            store,
            image_resolver,
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the user's snapshot, loading it from the store on first access.
    fn snapshot(&self, user_id: usize) -> Result<LibrarySnapshot, LibraryError> {
        let mut snapshots = self.snapshots.lock().unwrap();
        if let Some(snapshot) = snapshots.get(&user_id) {
            return Ok(snapshot.clone());
        }
        let records = self.store.get_singers_with_songs(user_id)?;
        let snapshot = LibrarySnapshot::from_records(records);
        snapshots.insert(user_id, snapshot.clone());
        Ok(snapshot)
    }

    /// Applies a pure snapshot transformation to the user's current snapshot.
    /// A no-op when nothing is cached yet; callers load the snapshot first so
    /// the update never runs against a conjured empty library.
    fn update_snapshot<F>(&self, user_id: usize, update: F)
    where
        F: FnOnce(&LibrarySnapshot) -> LibrarySnapshot,
    {
        let mut snapshots = self.snapshots.lock().unwrap();
        if let Some(current) = snapshots.get_mut(&user_id) {
            *current = update(current);
        }
    }

    /// Drops the cached snapshot, e.g. when the user signs out.
    pub fn evict(&self, user_id: usize) {
        self.snapshots.lock().unwrap().remove(&user_id);
    }

    /// Adds a song under a singer name. A case-insensitive match against an
    /// existing singer merges into it; otherwise a new singer is created with
    /// a best-effort image and the song as its first one. If the song insert
    /// fails the freshly created singer is deleted again.
    pub async fn add_singer_with_song(
        &self,
        user_id: usize,
        singer_name: &str,
        song_title: &str,
    ) -> Result<AddSingerOutcome, LibraryError> {
        if singer_name.trim().is_empty() || song_title.trim().is_empty() {
            return Err(LibraryError::Validation(EMPTY_FIELDS_MESSAGE.to_string()));
        }

        let name = format_singer_name(singer_name);
        let title = format_song_title(song_title);

        let existing_id = self.snapshot(user_id)?.find_singer_by_name(&name).map(|s| s.id());
        if let Some(singer_id) = existing_id {
            let singer = self.add_song(user_id, singer_id, song_title)?;
            return Ok(AddSingerOutcome {
                singer,
                merged: true,
            });
        }

        // Image lookup is best effort and must not fail the creation.
        let image_url = self.image_resolver.resolve(&name).await;

        let singer = self.store.create_singer(user_id, &name, image_url.as_deref())?;
        let language = Language::of(&title);
        let song = match self.store.create_song(singer.id, &title, language) {
            Ok(song) => song,
            Err(song_err) => {
                // Compensate the singer insert. If the compensation fails too
                // we keep surfacing the original error and only log this one.
                match self.store.delete_singer(singer.id, user_id) {
                    Ok(_) => info!("Rolled back singer {} after song insert failure", singer.id),
                    Err(delete_err) => error!(
                        "Could not roll back singer {} after song insert failure: {}",
                        singer.id, delete_err
                    ),
                }
                return Err(LibraryError::Backend(song_err.to_string()));
            }
        };

        let record = SingerWithSongs::new(singer, vec![song]);
        self.update_snapshot(user_id, |snapshot| snapshot.with_new_singer(record.clone()));
        Ok(AddSingerOutcome {
            singer: record,
            merged: false,
        })
    }

    /// Adds a song to an existing singer and returns the updated record.
    pub fn add_song(
        &self,
        user_id: usize,
        singer_id: usize,
        song_title: &str,
    ) -> Result<SingerWithSongs, LibraryError> {
        if song_title.trim().is_empty() {
            return Err(LibraryError::Validation(EMPTY_FIELDS_MESSAGE.to_string()));
        }
        if self.snapshot(user_id)?.singer(singer_id).is_none() {
            return Err(LibraryError::NotFound(format!("No singer with id {}", singer_id)));
        }

        let title = format_song_title(song_title);
        let language = Language::of(&title);
        let song = self.store.create_song(singer_id, &title, language)?;

        self.update_snapshot(user_id, |snapshot| snapshot.with_song_added(singer_id, song));
        self.snapshot(user_id)?
            .singer(singer_id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(format!("No singer with id {}", singer_id)))
    }

    pub fn delete_singer(&self, user_id: usize, singer_id: usize) -> Result<(), LibraryError> {
        self.snapshot(user_id)?;
        if !self.store.delete_singer(singer_id, user_id)? {
            return Err(LibraryError::NotFound(format!("No singer with id {}", singer_id)));
        }
        self.update_snapshot(user_id, |snapshot| snapshot.without_singer(singer_id));
        Ok(())
    }

    pub fn delete_song(&self, user_id: usize, song_id: usize) -> Result<(), LibraryError> {
        self.snapshot(user_id)?;
        if !self.store.delete_song(song_id, user_id)? {
            return Err(LibraryError::NotFound(format!("No song with id {}", song_id)));
        }
        self.update_snapshot(user_id, |snapshot| snapshot.without_song(song_id));
        Ok(())
    }

    /// The grouped view plus the currently selected singer, if any.
    pub fn grouped(&self, user_id: usize) -> Result<(Vec<SingerGroup>, Option<usize>), LibraryError> {
        let snapshot = self.snapshot(user_id)?;
        Ok((snapshot.grouped(), snapshot.selected_singer_id()))
    }

    /// Karaoke search URL for a song in the user's library.
    pub fn karaoke_link(&self, user_id: usize, song_id: usize) -> Result<String, LibraryError> {
        let snapshot = self.snapshot(user_id)?;
        let (singer, song) = snapshot
            .find_song(song_id)
            .ok_or_else(|| LibraryError::NotFound(format!("No song with id {}", song_id)))?;
        Ok(karaoke_search_url(&song.title, singer.name(), song.language))
    }
}
