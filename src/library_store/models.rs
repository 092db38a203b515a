//! Library record models.

use crate::text::Language;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Singer {
    pub id: usize,
    pub user_id: usize,
    pub name: String,
    pub image_url: Option<String>,
    pub created: SystemTime,
    pub updated: SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: usize,
    pub singer_id: usize,
    pub title: String,
    pub language: Language,
    pub created: SystemTime,
    pub updated: SystemTime,
}

/// Read composite of a singer joined with its songs. Assembled by the store,
/// never persisted as such.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingerWithSongs {
    #[serde(flatten)]
    pub singer: Singer,
    pub songs: Vec<Song>,
}

impl SingerWithSongs {
    pub fn new(singer: Singer, songs: Vec<Song>) -> Self {
        Self { singer, songs }
    }

    pub fn id(&self) -> usize {
        self.singer.id
    }

    pub fn name(&self) -> &str {
        &self.singer.name
    }
}
