//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical implementations of test helpers to avoid duplication.

#![doc(hidden)]

use crate::engine::CoverageEngine;
use crate::fusion::FusionScorer;
use crate::idf::TermCollection;
use crate::types::{CoverageFeatures, CoverageSetup, Document, DocumentCollection};
use std::collections::HashMap;

/// A term collection backed by a fixed document-frequency table.
pub struct StaticTermCollection {
    total: u64,
    frequencies: HashMap<String, u64>,
}

impl StaticTermCollection {
    pub fn new(total: u64, frequencies: &[(&str, u64)]) -> Self {
        Self {
            total,
            frequencies: frequencies
                .iter()
                .map(|(gram, df)| ((*gram).to_string(), *df))
                .collect(),
        }
    }
}

impl TermCollection for StaticTermCollection {
    fn document_frequency(&self, ngram: &str) -> Option<u64> {
        self.frequencies.get(ngram).copied()
    }

    fn total_documents(&self) -> u64 {
        self.total
    }
}

/// A document collection backed by a fixed list of rows.
pub struct StaticDocumentCollection(pub Vec<Document>);

impl DocumentCollection for StaticDocumentCollection {
    fn document_by_key(&self, id: i64) -> Option<Document> {
        self.0.iter().find(|d| d.id == id).cloned()
    }

    fn documents_for_key(&self, key: i64) -> Vec<Document> {
        self.0
            .iter()
            .filter(|d| d.document_key == key)
            .cloned()
            .collect()
    }

    fn document_of_segment(&self, key: i64, segment: i32) -> Option<Document> {
        self.0
            .iter()
            .find(|d| d.document_key == key && d.segment_number == segment)
            .cloned()
    }
}

/// Create a document row with one segment.
///
/// This is the canonical implementation used across all tests.
pub fn make_document(id: i64, key: i64, segment: i32, text: &str) -> Document {
    Document {
        id,
        document_key: key,
        segment_number: segment,
        indexed_text: text.to_string(),
        deleted: false,
    }
}

/// An engine with default setup and no collaborators.
pub fn make_engine() -> CoverageEngine {
    CoverageEngine::new(CoverageSetup::default())
}

/// Run the full pipeline for one pair: features plus packed score.
pub fn score_pair(engine: &CoverageEngine, query: &str, doc: &str) -> (CoverageFeatures, u16, u8) {
    let context = engine.prepare_query(query);
    let features = engine.calculate_features(&context, doc, 0, 0);
    let (score, tiebreaker) = FusionScorer::new().calculate(query, doc, &features, 0.0);
    (features, score, tiebreaker)
}
