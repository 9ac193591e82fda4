//! Core scoring invariants over arbitrary query/document pairs.

use super::common::{make_engine, score_pair};
use covex::FusionScorer;
use proptest::prelude::*;
use proptest::string::string_regex;

fn word() -> impl Strategy<Value = String> {
    string_regex("[a-z]{1,8}").expect("valid regex")
}

fn phrase() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 0..6).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn precedence_bits_are_consistent_with_features(query in phrase(), doc in phrase()) {
        let engine = make_engine();
        let (features, score, _) = score_pair(&engine, &query, &doc);
        let precedence = score >> 8;
        // The complete bit requires full coverage or stem evidence.
        if precedence & 128 != 0 {
            prop_assert!(
                features.terms_with_any_match == features.terms_count
                    || features.signals.has_stem_evidence
            );
        }
        // The clean bit is strictly stronger than completeness of matching.
        if precedence & 64 != 0 {
            prop_assert_eq!(features.terms_prefix_matched, features.terms_count);
        }
        // Zero matched terms on a non-empty query caps the score at the
        // semantic byte.
        if features.terms_count > 0 && features.terms_with_any_match == 0 {
            prop_assert_eq!(precedence & (128 | 64 | 32), 0);
        }
    }

    #[test]
    fn counter_chain_always_holds(query in phrase(), doc in phrase()) {
        let engine = make_engine();
        let (features, _, _) = score_pair(&engine, &query, &doc);
        prop_assert!(features.terms_strict_matched <= features.terms_prefix_matched);
        prop_assert!(features.terms_prefix_matched <= features.terms_with_any_match);
        prop_assert!(features.terms_with_any_match <= features.terms_count);
    }

    #[test]
    fn per_term_credit_stays_bounded(query in phrase(), doc in phrase()) {
        let engine = make_engine();
        let (features, _, _) = score_pair(&engine, &query, &doc);
        for &ci in &features.term_ci {
            prop_assert!((0.0..=1.0).contains(&ci));
        }
        prop_assert!(features.sum_ci <= features.terms_count as f64 + 1e-9);
        prop_assert!(features.missing_idf <= features.total_idf + 1e-9);
    }

    #[test]
    fn phrase_run_fields_are_consistent(query in phrase(), doc in phrase()) {
        let engine = make_engine();
        let (features, _, _) = score_pair(&engine, &query, &doc);
        prop_assert!(features.suffix_prefix_run <= features.longest_prefix_run);
        prop_assert!(features.longest_prefix_run <= features.terms_count);
        if features.terms_with_any_match == 0 {
            prop_assert_eq!(features.phrase_span, 0);
            prop_assert_eq!(features.first_match_index, -1);
        }
    }

    #[test]
    fn empty_query_is_always_zero(doc in phrase()) {
        let engine = make_engine();
        let (features, score, tiebreaker) = score_pair(&engine, "", &doc);
        prop_assert_eq!(features.terms_count, 0);
        prop_assert_eq!(features.coverage_score, 0);
        prop_assert_eq!((score, tiebreaker), (0, 0));
    }

    #[test]
    fn identical_doc_matches_completely(query in phrase()) {
        let engine = make_engine();
        let (features, _, _) = score_pair(&engine, &query, &query);
        prop_assert_eq!(features.terms_with_any_match, features.terms_count);
        prop_assert_eq!(features.terms_strict_matched, features.terms_count);
    }

    #[test]
    fn dominance_implies_score_order(base in phrase(), extra in word()) {
        // A doc equal to the query dominates the same doc with a word
        // appended: same matches, same positions, lower match density.
        prop_assume!(!base.is_empty());
        let engine = make_engine();
        let full = score_pair(&engine, &base, &base).1;
        let diluted_doc = format!("{} {}", base, extra);
        let diluted = score_pair(&engine, &base, &diluted_doc).1;
        prop_assert!(full >= diluted);
    }

    #[test]
    fn bm25_never_changes_complete_matches(query in phrase(), bm25 in 0.0f64..1.0) {
        prop_assume!(!query.trim().is_empty());
        let engine = make_engine();
        let context = engine.prepare_query(&query);
        let features = engine.calculate_features(&context, &query, 0, 0);
        let scorer = FusionScorer::new();
        let baseline = scorer.calculate(&query, &query, &features, 0.0);
        let blended = scorer.calculate(&query, &query, &features, bm25);
        prop_assert_eq!(baseline, blended);
    }
}
