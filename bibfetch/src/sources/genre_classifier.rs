//! Genre Classifier
//!
//! Maps a source's raw subject strings to a few curated genre labels.
//! Used by sources whose subject taxonomy is unreliable (Open Library
//! subjects mix genres with places, people, awards and shelving tags).
//!
//! # Algorithm
//! 1. Discard subjects containing the metadata delimiter (e.g.
//!    `award:hugo_award=novel`)
//! 2. Scan subjects in input order; match each case-insensitively (substring)
//!    against the not-yet-used vocabulary keywords in vocabulary order
//! 3. On the first match, emit the subject with its first character upper
//!    cased and retire the keyword, so each keyword yields at most one label
//! 4. Stop at the label cap or when the vocabulary is used up

use tracing::debug;

/// Default ordered genre vocabulary
pub const DEFAULT_VOCABULARY: [&str; 25] = [
    "fiction",
    "novel",
    "fantasy",
    "mystery",
    "thriller",
    "romance",
    "horror",
    "dystopia",
    "biography",
    "history",
    "memoir",
    "self-help",
    "psychology",
    "philosophy",
    "religion",
    "mathematics",
    "engineering",
    "medicine",
    "art",
    "music",
    "sports",
    "cooking",
    "travel",
    "children",
    "young adult",
];

/// Maximum number of genre labels produced
pub const DEFAULT_GENRE_CAP: usize = 3;

/// Subjects containing this character are metadata, not genres
pub const METADATA_DELIMITER: char = ':';

/// Genre Classifier
#[derive(Debug, Clone)]
pub struct GenreClassifier {
    /// Lower-cased keywords in priority order
    vocabulary: Vec<String>,
    cap: usize,
}

impl GenreClassifier {
    /// Create classifier with the default vocabulary and cap
    pub fn new() -> Self {
        Self::with_vocabulary(DEFAULT_VOCABULARY, DEFAULT_GENRE_CAP)
    }

    /// Create classifier with a custom vocabulary and label cap
    pub fn with_vocabulary<I, S>(vocabulary: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            vocabulary: vocabulary
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            cap,
        }
    }

    /// Classify raw subjects into at most `cap` genre labels
    pub fn classify<S: AsRef<str>>(&self, subjects: &[S]) -> Vec<String> {
        let mut remaining: Vec<&str> = self.vocabulary.iter().map(String::as_str).collect();
        let mut labels = Vec::new();

        for subject in subjects {
            if labels.len() >= self.cap || remaining.is_empty() {
                break;
            }

            let subject = subject.as_ref();
            if subject.contains(METADATA_DELIMITER) {
                continue;
            }

            let lowered = subject.to_lowercase();
            if let Some(position) = remaining.iter().position(|k| lowered.contains(k)) {
                let keyword = remaining.remove(position);
                debug!(subject = %subject, keyword = %keyword, "Subject classified as genre");
                labels.push(capitalize_first(subject));
            }
        }

        labels
    }
}

impl Default for GenreClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper-case the first character, leave the rest unchanged
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_and_keyword_uniqueness() {
        let subjects = [
            "science fiction",
            "Fiction, general",
            "fantasy fiction",
            "epic fantasy",
            "Mystery and detective stories",
            "cozy mystery",
            "Horror tales",
            "history of science",
            "historical fiction",
            "gothic horror",
        ];

        let genres = GenreClassifier::new().classify(&subjects);

        // Five keywords match (fiction, fantasy, mystery, horror, history);
        // the cap keeps the first three, one per keyword, in input order.
        assert_eq!(
            genres,
            vec!["Science fiction", "Fantasy fiction", "Mystery and detective stories"]
        );
    }

    #[test]
    fn test_metadata_subjects_discarded() {
        let subjects = ["award:hugo_award=novel", "nyt:bestseller=fiction", "Fantasy"];
        let genres = GenreClassifier::new().classify(&subjects);
        assert_eq!(genres, vec!["Fantasy"]);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_keeps_remainder() {
        let genres = GenreClassifier::new().classify(&["sCIENCE FICTION"]);
        assert_eq!(genres, vec!["SCIENCE FICTION"]);
    }

    #[test]
    fn test_keyword_order_decides_attribution() {
        // "fantasy novel" matches both "novel" and "fantasy"; "novel" comes
        // first in the vocabulary so "fantasy" stays available.
        let genres = GenreClassifier::new().classify(&["fantasy novel", "Dark fantasy"]);
        assert_eq!(genres, vec!["Fantasy novel", "Dark fantasy"]);
    }

    #[test]
    fn test_unmatched_and_empty_input() {
        let classifier = GenreClassifier::new();
        assert!(classifier.classify::<&str>(&[]).is_empty());
        assert!(classifier.classify(&["Accessible book", "Protected DAISY", "Arrakis"]).is_empty());
    }

    #[test]
    fn test_stops_when_vocabulary_exhausted() {
        let classifier = GenreClassifier::with_vocabulary(["poetry"], 3);
        let genres = classifier.classify(&["Poetry", "Modern poetry", "poetry"]);
        assert_eq!(genres, vec!["Poetry"]);
    }

    #[test]
    fn test_deterministic() {
        let subjects = ["Travel writing", "Cooking", "Art history"];
        let classifier = GenreClassifier::new();
        assert_eq!(classifier.classify(&subjects), classifier.classify(&subjects));
    }
}
