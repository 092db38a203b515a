use super::language::Language;

const SEARCH_URL_BASE: &str = "https://www.youtube.com/results?search_query=";

fn karaoke_keyword(language: Language) -> &'static str {
    match language {
        Language::He => "קריוקי",
        Language::En => "karaoke",
    }
}

/// Builds a YouTube search URL for a karaoke version of a song.
///
/// The whole `"{singer} {title} {keyword}"` query is encoded as one string so
/// the separators stay consistent, rather than encoding the parts separately.
pub fn karaoke_search_url<T: AsRef<str>, S: AsRef<str>>(
    song_title: T,
    singer_name: S,
    language: Language,
) -> String {
    let query = format!(
        "{} {} {}",
        singer_name.as_ref(),
        song_title.as_ref(),
        karaoke_keyword(language)
    );
    format!("{}{}", SEARCH_URL_BASE, urlencoding::encode(&query))
}
