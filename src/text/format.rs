use super::language::is_hebrew;

/// Title-cases a text: every whitespace-delimited word gets an uppercase first
/// character, the rest is lowercased. Whitespace is preserved as-is.
///
/// Hebrew text is returned unchanged since casing has no meaning there.
/// Idempotent: `title_case(title_case(t)) == title_case(t)`.
pub fn title_case<T: AsRef<str>>(text: T) -> String {
    let text = text.as_ref();
    if text.is_empty() || is_hebrew(text) {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            result.push(c);
        } else if at_word_start {
            result.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

/// Trims and title-cases a singer name for display.
pub fn format_singer_name<T: AsRef<str>>(name: T) -> String {
    title_case(name.as_ref().trim())
}

/// Trims and title-cases a song title for display.
pub fn format_song_title<T: AsRef<str>>(title: T) -> String {
    title_case(title.as_ref().trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(title_case("the dark side of the moon"), "The Dark Side Of The Moon");
    }

    #[test]
    fn lowercases_shouty_input() {
        assert_eq!(title_case("BOHEMIAN RHAPSODY"), "Bohemian Rhapsody");
    }

    #[test]
    fn preserves_whitespace_structure() {
        assert_eq!(title_case("hello   world"), "Hello   World");
        assert_eq!(title_case("hello\tworld"), "Hello\tWorld");
    }

    #[test]
    fn leaves_hebrew_untouched() {
        assert_eq!(title_case("שיר של יום"), "שיר של יום");
    }

    #[test]
    fn leaves_empty_and_blank_untouched() {
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("   "), "   ");
    }

    #[test]
    fn is_idempotent() {
        for input in ["the wall", "The Wall", "ABBA gold", "תוכנית א", "  mixed CASE  "] {
            let once = title_case(input);
            assert_eq!(title_case(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn format_helpers_trim() {
        assert_eq!(format_singer_name("  freddie mercury  "), "Freddie Mercury");
        assert_eq!(format_song_title("\tdon't stop me now "), "Don't Stop Me Now");
    }
}
