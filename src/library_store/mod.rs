mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{Singer, SingerWithSongs, Song};
pub use store::SqliteLibraryStore;
pub use trait_def::LibraryStore;
