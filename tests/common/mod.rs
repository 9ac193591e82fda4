//! Shared test utilities and fixtures.

#![allow(dead_code)]

use covex::{CoverageEngine, CoverageSetup, FusionScorer};

// Re-export canonical test utilities from covex::testing
pub use covex::testing::{make_document, make_engine, score_pair, StaticTermCollection};

/// An engine with the fuzzy pass disabled, for tests that want clean-only
/// semantics.
pub fn make_engine_without_fuzzy() -> CoverageEngine {
    CoverageEngine::new(CoverageSetup {
        cover_fuzzy_words: false,
        ..CoverageSetup::default()
    })
}

/// Packed score only, for ordering assertions.
pub fn score_of(engine: &CoverageEngine, query: &str, doc: &str) -> u16 {
    let (_, score, _) = score_pair(engine, query, doc);
    score
}

/// The 24-bit sort key for one pair.
pub fn sort_key_of(engine: &CoverageEngine, query: &str, doc: &str) -> u32 {
    let context = engine.prepare_query(query);
    let features = engine.calculate_features(&context, doc, 0, 0);
    let (score, tiebreaker) = FusionScorer::new().calculate(query, doc, &features, 0.0);
    (u32::from(score) << 8) | u32::from(tiebreaker)
}
