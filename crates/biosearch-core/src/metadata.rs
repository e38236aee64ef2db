//! # Metadata Projector
//!
//! Projects backend documents into fixed-shape `FlatRecord`s.
//!
//! Core fields are copied from the document body as they are. Annotation
//! attributes go through the normalizer. The output preserves input order and
//! depends on nothing but the input batch.

use crate::annotation::normalize_annotation;
use crate::primitives::{ANNOTATION_ATTRIBUTES, CORE_FIELDS};
use crate::{FlatRecord, RawDocument};
use serde_json::Value;

/// Project a batch of documents, one record per document, in input order.
#[must_use]
pub fn project_metadata(documents: &[RawDocument]) -> Vec<FlatRecord> {
    documents.iter().map(FlatRecord::from_document).collect()
}

impl FlatRecord {
    /// Build the record for a single document.
    #[must_use]
    pub fn from_document(document: &RawDocument) -> Self {
        let mut record = Self::default();
        let mut slots = record.slots_mut();
        let (core, annotated) = slots.split_at_mut(CORE_FIELDS.len());

        for (slot, name) in core.iter_mut().zip(CORE_FIELDS) {
            **slot = document.field(name).and_then(scalar_text);
        }
        if let Some(annotations) = document.annotations() {
            for (slot, name) in annotated.iter_mut().zip(ANNOTATION_ATTRIBUTES) {
                **slot = normalize_annotation(annotations, name);
            }
        }
        record
    }
}

/// Core fields are taken as-is: strings verbatim, other values in JSON text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
