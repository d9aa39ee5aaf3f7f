use gutensearch_core::tokenizer::{normalize_term, tokenize};

#[test]
fn stopwords_and_short_tokens_drop() {
    assert_eq!(tokenize("The Sea and The Sky"), vec!["sea", "sky"]);
}

#[test]
fn apostrophes_stay_inside_tokens() {
    assert_eq!(tokenize("Don't stop believing"), vec!["don't", "stop", "believing"]);
}

#[test]
fn punctuation_splits_and_digits_survive() {
    assert_eq!(
        tokenize("wind-swept cliffs, 42 leagues"),
        vec!["wind", "swept", "cliffs", "42", "leagues"]
    );
}

#[test]
fn re_tokenizing_filtered_output_is_stable() {
    let first = tokenize("The Quick Brown Fox's 99 Jumps!");
    assert_eq!(first, vec!["quick", "brown", "fox's", "99", "jumps"]);
    assert_eq!(tokenize(&first.join(" ")), first);
}

#[test]
fn token_conservation_over_concatenation() {
    let a = "Whales of the deep ocean";
    let b = "Mountains beyond mountains";
    let mut combined = tokenize(a);
    combined.extend(tokenize(b));
    assert_eq!(tokenize(&format!("{a} {b}")), combined);
}

#[test]
fn nfkc_folds_fullwidth_and_ligatures() {
    // fullwidth letters and the fi ligature normalize to plain ascii
    assert_eq!(tokenize("ＡＢＣ ﬁne"), vec!["abc", "fine"]);
}

#[test]
fn normalization_unifies_decomposed_accents() {
    assert_eq!(tokenize("E\u{301}lan vital"), vec!["élan", "vital"]);
}

#[test]
fn query_normalization_skips_stopword_filtering() {
    assert_eq!(normalize_term("SEA"), "sea");
    assert_eq!(normalize_term("The"), "the");
}

#[test]
fn empty_and_all_stopword_inputs_yield_nothing() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("the and of a").is_empty());
    assert!(tokenize("... --- !!!").is_empty());
}
