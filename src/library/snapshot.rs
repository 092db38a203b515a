//! Immutable view of a user's library.
//!
//! Every operation returns a new snapshot; the manager swaps the stored value
//! only after the backend call succeeded, so readers never observe a
//! half-applied operation.

use crate::library_store::{SingerWithSongs, Song};
use crate::text::{is_hebrew, Language};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SingerGroup {
    pub language: Language,
    pub singers: Vec<SingerWithSongs>,
}

#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    singers: Vec<SingerWithSongs>,
    selected_singer_id: Option<usize>,
}

impl LibrarySnapshot {
    pub fn from_records(singers: Vec<SingerWithSongs>) -> Self {
        Self {
            singers,
            selected_singer_id: None,
        }
    }

    pub fn selected_singer_id(&self) -> Option<usize> {
        self.selected_singer_id
    }

    pub fn singer(&self, singer_id: usize) -> Option<&SingerWithSongs> {
        self.singers.iter().find(|s| s.id() == singer_id)
    }

    /// Case-insensitive lookup by display name, ignoring surrounding whitespace.
    pub fn find_singer_by_name(&self, name: &str) -> Option<&SingerWithSongs> {
        let wanted = name.trim().to_lowercase();
        self.singers
            .iter()
            .find(|s| s.name().trim().to_lowercase() == wanted)
    }

    pub fn find_song(&self, song_id: usize) -> Option<(&SingerWithSongs, &Song)> {
        self.singers.iter().find_map(|singer| {
            singer
                .songs
                .iter()
                .find(|song| song.id == song_id)
                .map(|song| (singer, song))
        })
    }

    /// Appends a freshly created singer; the new singer becomes the selection.
    pub fn with_new_singer(&self, record: SingerWithSongs) -> Self {
        let selected = Some(record.id());
        let mut singers = self.singers.clone();
        singers.push(record);
        Self {
            singers,
            selected_singer_id: selected,
        }
    }

    /// Replaces the owning singer's record with one whose songs include the
    /// new song. The previous record is left untouched.
    pub fn with_song_added(&self, singer_id: usize, song: Song) -> Self {
        let singers = self
            .singers
            .iter()
            .map(|record| {
                if record.id() == singer_id {
                    let mut songs = record.songs.clone();
                    songs.push(song.clone());
                    SingerWithSongs::new(record.singer.clone(), songs)
                } else {
                    record.clone()
                }
            })
            .collect();
        Self {
            singers,
            selected_singer_id: self.selected_singer_id,
        }
    }

    /// Removes a singer; clears the selection if it pointed at the removed one.
    pub fn without_singer(&self, singer_id: usize) -> Self {
        let singers = self
            .singers
            .iter()
            .filter(|record| record.id() != singer_id)
            .cloned()
            .collect();
        let selected = self.selected_singer_id.filter(|id| *id != singer_id);
        Self {
            singers,
            selected_singer_id: selected,
        }
    }

    pub fn without_song(&self, song_id: usize) -> Self {
        let singers = self
            .singers
            .iter()
            .map(|record| {
                if record.songs.iter().any(|song| song.id == song_id) {
                    let songs = record
                        .songs
                        .iter()
                        .filter(|song| song.id != song_id)
                        .cloned()
                        .collect();
                    SingerWithSongs::new(record.singer.clone(), songs)
                } else {
                    record.clone()
                }
            })
            .collect();
        Self {
            singers,
            selected_singer_id: self.selected_singer_id,
        }
    }

    /// Partitions singers by the language of their *name* and sorts each group:
    /// Hebrew in א-ת order (code-point order over the Hebrew block), English
    /// case-insensitively. Empty groups are omitted, Hebrew comes first.
    pub fn grouped(&self) -> Vec<SingerGroup> {
        let (mut hebrew, mut english): (Vec<_>, Vec<_>) = self
            .singers
            .iter()
            .cloned()
            .partition(|record| is_hebrew(record.name()));

        hebrew.sort_by(|a, b| a.name().cmp(b.name()));
        english.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));

        let mut groups = Vec::new();
        if !hebrew.is_empty() {
            groups.push(SingerGroup {
                language: Language::He,
                singers: hebrew,
            });
        }
        if !english.is_empty() {
            groups.push(SingerGroup {
                language: Language::En,
                singers: english,
            });
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library_store::Singer;
    use std::time::SystemTime;

    fn record(id: usize, name: &str, songs: Vec<Song>) -> SingerWithSongs {
        SingerWithSongs::new(
            Singer {
                id,
                user_id: 1,
                name: name.to_string(),
                image_url: None,
                created: SystemTime::UNIX_EPOCH,
                updated: SystemTime::UNIX_EPOCH,
            },
            songs,
        )
    }

    fn song(id: usize, singer_id: usize, title: &str) -> Song {
        Song {
            id,
            singer_id,
            title: title.to_string(),
            language: Language::of(title),
            created: SystemTime::UNIX_EPOCH,
            updated: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn groups_hebrew_first_and_sorts_within_groups() {
        let snapshot = LibrarySnapshot::from_records(vec![
            record(1, "Alon", vec![]),
            record(2, "דנה", vec![]),
            record(3, "Ben", vec![]),
        ]);

        let groups = snapshot.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].language, Language::He);
        assert_eq!(
            groups[0].singers.iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["דנה"]
        );
        assert_eq!(groups[1].language, Language::En);
        assert_eq!(
            groups[1].singers.iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["Alon", "Ben"]
        );
    }

    #[test]
    fn hebrew_group_sorts_alef_to_tav() {
        let snapshot = LibrarySnapshot::from_records(vec![
            record(1, "תמר", vec![]),
            record(2, "אביב", vec![]),
            record(3, "משה", vec![]),
        ]);
        let groups = snapshot.grouped();
        assert_eq!(
            groups[0].singers.iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["אביב", "משה", "תמר"]
        );
    }

    #[test]
    fn english_sorting_ignores_case() {
        let snapshot = LibrarySnapshot::from_records(vec![
            record(1, "abba", vec![]),
            record(2, "Aerosmith", vec![]),
            record(3, "AC/DC", vec![]),
        ]);
        let groups = snapshot.grouped();
        assert_eq!(
            groups[0].singers.iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["abba", "AC/DC", "Aerosmith"]
        );
    }

    #[test]
    fn empty_groups_are_omitted() {
        assert!(LibrarySnapshot::default().grouped().is_empty());

        let only_english = LibrarySnapshot::from_records(vec![record(1, "Alon", vec![])]);
        let groups = only_english.grouped();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].language, Language::En);
    }

    #[test]
    fn finds_singers_case_insensitively() {
        let snapshot = LibrarySnapshot::from_records(vec![record(1, "Freddie Mercury", vec![])]);
        assert_eq!(
            snapshot.find_singer_by_name(" freddie mercury ").map(|s| s.id()),
            Some(1)
        );
        assert!(snapshot.find_singer_by_name("Freddie").is_none());
    }

    #[test]
    fn new_singer_becomes_the_selection() {
        let snapshot = LibrarySnapshot::default().with_new_singer(record(7, "Dana", vec![]));
        assert_eq!(snapshot.selected_singer_id(), Some(7));
    }

    #[test]
    fn adding_a_song_replaces_the_record_without_touching_the_old_snapshot() {
        let before = LibrarySnapshot::from_records(vec![record(1, "Queen", vec![])]);
        let after = before.with_song_added(1, song(10, 1, "Bohemian Rhapsody"));

        assert!(before.singer(1).unwrap().songs.is_empty());
        assert_eq!(after.singer(1).unwrap().songs.len(), 1);
    }

    #[test]
    fn removing_the_selected_singer_clears_the_selection() {
        let snapshot = LibrarySnapshot::default()
            .with_new_singer(record(1, "Dana", vec![]))
            .with_new_singer(record(2, "Alon", vec![]));
        assert_eq!(snapshot.selected_singer_id(), Some(2));

        let after = snapshot.without_singer(2);
        assert_eq!(after.selected_singer_id(), None);
        assert!(after.singer(1).is_some());

        // Removing a different singer keeps the selection.
        let other = snapshot.without_singer(1);
        assert_eq!(other.selected_singer_id(), Some(2));
    }

    #[test]
    fn removing_a_song_keeps_the_rest() {
        let snapshot = LibrarySnapshot::from_records(vec![record(
            1,
            "Queen",
            vec![song(10, 1, "Bohemian Rhapsody"), song(11, 1, "Under Pressure")],
        )]);
        let after = snapshot.without_song(10);
        let titles: Vec<_> = after.singer(1).unwrap().songs.iter().map(|s| &s.title).collect();
        assert_eq!(titles, vec!["Under Pressure"]);
    }

    #[test]
    fn finds_a_song_with_its_singer() {
        let snapshot = LibrarySnapshot::from_records(vec![record(
            1,
            "Queen",
            vec![song(10, 1, "Bohemian Rhapsody")],
        )]);
        let (singer, song) = snapshot.find_song(10).unwrap();
        assert_eq!(singer.name(), "Queen");
        assert_eq!(song.title, "Bohemian Rhapsody");
        assert!(snapshot.find_song(11).is_none());
    }
}
