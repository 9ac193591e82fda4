//! Normalizer and tokenizer properties.

use covex::{dedup_tokens, tokenize, Normalizer, DEFAULT_DELIMITERS};
use proptest::prelude::*;
use proptest::string::string_regex;

fn ascii_clean() -> impl Strategy<Value = String> {
    // Non-whitespace ASCII words joined by single spaces: already normalized.
    string_regex("[a-z0-9]{1,8}( [a-z0-9]{1,8}){0,4}").expect("valid regex")
}

fn messy_text() -> impl Strategy<Value = String> {
    string_regex("[a-zA-Z \t\n]{0,40}").expect("valid regex")
}

proptest! {
    #[test]
    fn normalizer_is_identity_on_clean_ascii(text in ascii_clean()) {
        let norm = Normalizer::default();
        let normalized = norm.normalize(&text);
        prop_assert_eq!(normalized.as_ref(), text.as_str());
    }

    #[test]
    fn normalizer_is_idempotent(text in messy_text()) {
        let norm = Normalizer::default();
        let once = norm.normalize(&text).into_owned();
        let twice = norm.normalize(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_text_has_no_whitespace_runs(text in messy_text()) {
        let norm = Normalizer::default();
        let out = norm.normalize(&text).into_owned();
        prop_assert!(!out.contains("  "));
        prop_assert!(!out.contains('\t'));
        prop_assert!(!out.contains('\n'));
    }

    #[test]
    fn dedup_is_idempotent(text in messy_text()) {
        let tokens = tokenize(&text, 2, DEFAULT_DELIMITERS);
        let once = dedup_tokens(&text, &tokens);
        let twice = dedup_tokens(&text, &once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn dedup_has_no_equal_pairs(text in messy_text()) {
        let tokens = tokenize(&text, 2, DEFAULT_DELIMITERS);
        let unique = dedup_tokens(&text, &tokens);
        for (i, a) in unique.iter().enumerate() {
            for b in &unique[i + 1..] {
                prop_assert_ne!(
                    a.resolve(&text).to_lowercase(),
                    b.resolve(&text).to_lowercase()
                );
            }
        }
    }

    #[test]
    fn token_positions_strictly_increase(text in messy_text()) {
        let tokens = tokenize(&text, 2, DEFAULT_DELIMITERS);
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].position < pair[1].position);
        }
    }
}
