mod format;
mod karaoke;
mod language;

pub use format::{format_singer_name, format_song_title, title_case};
pub use karaoke::karaoke_search_url;
pub use language::{is_hebrew, Language};
