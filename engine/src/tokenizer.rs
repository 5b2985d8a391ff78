use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    // A token is either a four-digit year (0000-2999) or a word of two
    // letters followed by at least one more letter or digit. Other
    // digit-only runs are noise and never match.
    static ref TOKEN_RE: Regex =
        Regex::new(r"(?:[0-2][0-9][0-9][0-9])|(?:[a-z][a-z][a-z0-9]+)").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
            "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below",
            "between", "both", "but", "by", "can", "cannot", "could", "couldn", "did", "didn",
            "do", "does", "doesn", "doing", "don", "down", "during", "each", "few", "for", "from",
            "further", "had", "hadn", "has", "hasn", "have", "haven", "having", "he", "her",
            "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into",
            "is", "isn", "it", "its", "itself", "let", "me", "more", "most", "mustn", "my",
            "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other",
            "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "shan", "she",
            "should", "shouldn", "so", "some", "such", "than", "that", "the", "their", "theirs",
            "them", "themselves", "then", "there", "these", "they", "this", "those", "through",
            "to", "too", "under", "until", "up", "very", "was", "wasn", "we", "were", "weren",
            "what", "when", "where", "which", "while", "who", "whom", "why", "with", "would",
            "wouldn", "you", "your", "yours", "yourself", "yourselves", "0", "1", "2", "3", "4",
            "5", "6", "7", "8", "9",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(term: &str) -> bool {
    STOPWORDS.contains(term)
}

/// Lowercase `text` and extract its indexable terms, dropping stopwords.
/// Build-time stopword exclusion lives here; the index stores whatever it
/// is given.
pub fn extract_terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|t| !is_stopword(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_need_three_characters() {
        let terms = extract_terms("go ox cat database x9");
        assert_eq!(terms, vec!["cat", "database"]);
    }

    #[test]
    fn years_pass_other_numbers_do_not() {
        let terms = extract_terms("founded 1995, revised 3001, room 42");
        assert_eq!(terms, vec!["founded", "1995", "revised", "room"]);
    }

    #[test]
    fn stopwords_are_dropped() {
        let terms = extract_terms("the quick brown fox and the lazy dog");
        assert!(!terms.contains(&"the".to_string()));
        assert!(!terms.contains(&"and".to_string()));
        assert!(terms.contains(&"quick".to_string()));
    }

    #[test]
    fn input_is_lowercased() {
        assert_eq!(extract_terms("Database SYSTEMS"), vec!["database", "systems"]);
    }
}
