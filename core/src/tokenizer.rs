use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}']+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "the", "and", "to", "of", "a", "in", "that", "is", "it", "for", "on", "as", "with",
            "was", "at", "by", "an", "be", "this", "are", "from", "or", "but", "not", "have",
            "had", "has", "were", "which", "i", "you", "he", "she", "we", "they", "his", "her",
            "their", "its", "my", "me", "our", "us",
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Tokenize text into index terms: NFKC normalization, lowercase, then maximal
/// runs of letters/digits/apostrophes. Tokens of length <= 1 and stopwords are
/// dropped. Always returns a (possibly empty) sequence; never fails.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let mut terms = Vec::new();
    for mat in RE.find_iter(&normalized) {
        let token = mat.as_str();
        if token.chars().count() <= 1 || is_stopword(token) {
            continue;
        }
        terms.push(token.to_string());
    }
    terms
}

/// Normalize a single query term the same way indexed text is normalized
/// (NFKC + lowercase). Stopword filtering is not applied: an explicit query
/// term is always looked up, even if indexing would have dropped it.
pub fn normalize_term(term: &str) -> String {
    term.nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("A sailor's life, for me!");
        assert_eq!(t, vec!["sailor's", "life"]);
    }

    #[test]
    fn drops_short_tokens() {
        let t = tokenize("x y z sea");
        assert_eq!(t, vec!["sea"]);
    }

    #[test]
    fn query_terms_keep_stopwords() {
        assert_eq!(normalize_term("The"), "the");
    }
}
