//! Shared vocabularies (professions, titles)

use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A shared, deduplicated vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vocabulary {
    /// Professions and occupations
    Profession,

    /// Academic and honorary titles
    Title,
}

impl Vocabulary {
    /// Get the vocabulary name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Vocabulary::Profession => "profession",
            Vocabulary::Title => "title",
        }
    }

    /// Parse a stored vocabulary name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "profession" => Some(Vocabulary::Profession),
            "title" => Some(Vocabulary::Title),
            _ => None,
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry of a shared vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    /// Storage identifier
    pub id: i64,

    /// Vocabulary the entry belongs to
    pub vocabulary: Vocabulary,

    /// Label as first seen
    pub label: String,

    /// Source URI of the term, if it was imported from one
    pub uri: Option<String>,
}

/// Normalize a label for deduplication
///
/// Case-insensitive and diacritic-insensitive; internal whitespace is
/// collapsed.
///
/// # Examples
///
/// ```
/// use lodestar_domain::normalize_label;
///
/// assert_eq!(normalize_label("  Politikerin "), "politikerin");
/// assert_eq!(normalize_label("Ärztin"), normalize_label("arztin"));
/// ```
pub fn normalize_label(label: &str) -> String {
    let folded: String = label
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
