use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The Unicode block for Hebrew script.
const HEBREW_RANGE: std::ops::RangeInclusive<char> = '\u{0590}'..='\u{05FF}';

/// Returns true if the text contains at least one Hebrew character.
pub fn is_hebrew<T: AsRef<str>>(text: T) -> bool {
    text.as_ref().chars().any(|c| HEBREW_RANGE.contains(&c))
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    He,
}

impl Language {
    /// Classifies a text: Hebrew if any Hebrew character is present, English otherwise.
    /// Empty text classifies as English.
    pub fn of<T: AsRef<str>>(text: T) -> Language {
        if is_hebrew(text) {
            Language::He
        } else {
            Language::En
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::He => "he",
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "en" => Ok(Language::En),
            "he" => Ok(Language::He),
            _ => bail!("Unknown language {}", s),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
