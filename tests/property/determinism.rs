//! Bit-reproducibility of the scoring pipeline.
//!
//! Floating-point accumulation order is fixed in the implementation; these
//! tests pin that down by demanding identical results across repeated runs
//! and across fresh engines.

use super::common::{make_engine, score_pair};
use proptest::prelude::*;
use proptest::string::string_regex;

fn phrase() -> impl Strategy<Value = String> {
    string_regex("[a-z]{1,6}( [a-z]{1,6}){0,4}").expect("valid regex")
}

proptest! {
    #[test]
    fn repeated_scoring_is_bit_identical(query in phrase(), doc in phrase()) {
        let engine = make_engine();
        let first = score_pair(&engine, &query, &doc);
        for _ in 0..3 {
            let again = score_pair(&engine, &query, &doc);
            prop_assert_eq!(&again.0, &first.0);
            prop_assert_eq!((again.1, again.2), (first.1, first.2));
        }
    }

    #[test]
    fn fresh_engines_agree(query in phrase(), doc in phrase()) {
        let first = score_pair(&make_engine(), &query, &doc);
        let second = score_pair(&make_engine(), &query, &doc);
        prop_assert_eq!(&first.0, &second.0);
        prop_assert_eq!((first.1, first.2), (second.1, second.2));
    }

    #[test]
    fn float_features_are_bitwise_stable(query in phrase(), doc in phrase()) {
        let engine = make_engine();
        let (a, _, _) = score_pair(&engine, &query, &doc);
        let (b, _, _) = score_pair(&engine, &query, &doc);
        prop_assert_eq!(a.sum_ci.to_bits(), b.sum_ci.to_bits());
        prop_assert_eq!(a.idf_coverage.to_bits(), b.idf_coverage.to_bits());
        prop_assert_eq!(a.missing_idf.to_bits(), b.missing_idf.to_bits());
        prop_assert_eq!(a.weighted_coverage.to_bits(), b.weighted_coverage.to_bits());
    }
}
