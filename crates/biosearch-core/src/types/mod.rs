//! # Core Type Definitions
//!
//! This module contains all types flowing through the shaping pipeline:
//! - Backend input (`RawDocument`)
//! - Flat metadata output (`FlatRecord`)
//! - Composition input and chart output (`CompositionEntry`, `CategoryValue`, `Series`)
//! - Error types (`ShapingError`)
//!
//! All structures are transient and request-scoped.

use crate::primitives::{ANNOTATION_FIELD, FLAT_RECORD_WIDTH};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// =============================================================================
// RAW DOCUMENT
// =============================================================================

/// One hit returned by the search backend.
///
/// The body (`_source`) is kept as an opaque ordered mapping; the transforms
/// pick the fields they need from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Backend document identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Index the document was found in.
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Document body.
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

impl RawDocument {
    /// Create a document from an identifier and a body.
    #[must_use]
    pub fn new(id: impl Into<String>, source: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            index: None,
            source,
        }
    }

    /// Look up a top-level body field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.source.get(name)
    }

    /// The annotation map, if the document carries one as a mapping.
    #[must_use]
    pub fn annotations(&self) -> Option<&Map<String, Value>> {
        self.source.get(ANNOTATION_FIELD).and_then(Value::as_object)
    }
}

// =============================================================================
// FLAT RECORD
// =============================================================================

/// Fixed-shape metadata record for one document.
///
/// Every instance carries the same fields, so a batch always has a uniform
/// key set. Annotation attributes are `None` when the source document has no
/// annotation map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub organism: Option<String>,
    pub organization: Option<String>,
    pub sample_organism: Option<String>,
    pub sample_taxid: Option<String>,
    pub sample_host_organism: Option<String>,
    pub sample_host_organism_id: Option<String>,
    pub sample_host_disease: Option<String>,
    pub sample_host_disease_id: Option<String>,
    pub sample_host_location: Option<String>,
    pub sample_ph_range: Option<String>,
    pub sample_temperature_range: Option<String>,
}

impl FlatRecord {
    /// Field values in `FLAT_RECORD_COLUMNS` order.
    #[must_use]
    pub fn values(&self) -> [Option<&str>; FLAT_RECORD_WIDTH] {
        [
            self.identifier.as_deref(),
            self.title.as_deref(),
            self.description.as_deref(),
            self.organism.as_deref(),
            self.organization.as_deref(),
            self.sample_organism.as_deref(),
            self.sample_taxid.as_deref(),
            self.sample_host_organism.as_deref(),
            self.sample_host_organism_id.as_deref(),
            self.sample_host_disease.as_deref(),
            self.sample_host_disease_id.as_deref(),
            self.sample_host_location.as_deref(),
            self.sample_ph_range.as_deref(),
            self.sample_temperature_range.as_deref(),
        ]
    }

    /// Mutable field slots in `FLAT_RECORD_COLUMNS` order.
    pub(crate) fn slots_mut(&mut self) -> [&mut Option<String>; FLAT_RECORD_WIDTH] {
        [
            &mut self.identifier,
            &mut self.title,
            &mut self.description,
            &mut self.organism,
            &mut self.organization,
            &mut self.sample_organism,
            &mut self.sample_taxid,
            &mut self.sample_host_organism,
            &mut self.sample_host_organism_id,
            &mut self.sample_host_disease,
            &mut self.sample_host_disease_id,
            &mut self.sample_host_location,
            &mut self.sample_ph_range,
            &mut self.sample_temperature_range,
        ]
    }
}

// =============================================================================
// COMPOSITION
// =============================================================================

/// One (category, value) pair of an entity's composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    /// Category name.
    pub taxon: String,
    /// Numeric value for this category.
    pub value: f64,
}

impl CategoryValue {
    #[must_use]
    pub fn new(taxon: impl Into<String>, value: f64) -> Self {
        Self {
            taxon: taxon.into(),
            value,
        }
    }
}

/// One entity's composition record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionEntry {
    /// Backend document id, matched against the requested id order.
    #[serde(default)]
    pub id: String,
    /// Entity label, used on the chart's x axis.
    pub name: String,
    /// Ordered category/value pairs.
    #[serde(default)]
    pub composition: Vec<CategoryValue>,
}

impl CompositionEntry {
    #[must_use]
    /// An entry whose id is its name.
    #[must_use]
    pub fn new(name: impl Into<String>, composition: Vec<CategoryValue>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            composition,
        }
    }

    /// Replace the document id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

// =============================================================================
// SERIES
// =============================================================================

/// Chart kind tag attached to every series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
}

/// One category's values aligned to the shared entity axis.
///
/// Serializes as `{x, y, name, type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Entity identifiers, shared across all series of a batch.
    pub x: Vec<String>,
    /// One value per entity, same length as `x`.
    pub y: Vec<f64>,
    /// Category name.
    pub name: String,
    /// Chart kind tag.
    #[serde(rename = "type")]
    pub kind: ChartKind,
}

impl Series {
    /// Create a bar series with an empty value axis.
    #[must_use]
    pub fn bar(name: impl Into<String>, x: Vec<String>) -> Self {
        let capacity = x.len();
        Self {
            x,
            y: Vec::with_capacity(capacity),
            name: name.into(),
            kind: ChartKind::Bar,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the shaping transforms.
///
/// All of them are batch validation failures: the input violates a shape
/// contract. None of them are transient, so callers must not retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapingError {
    /// The batch is empty or not record-shaped.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// An entity's categories diverge from the batch template.
    #[error("Misaligned category for entity '{entity}': {detail}")]
    MisalignedCategory { entity: String, detail: String },

    /// A record's key set differs from the header.
    #[error("Inconsistent record shape at row {row}: {detail}")]
    InconsistentRecordShape { row: usize, detail: String },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_record_values_follow_column_order() {
        let record = FlatRecord {
            identifier: Some("PRJDB1".into()),
            sample_temperature_range: Some("20-30".into()),
            ..FlatRecord::default()
        };
        let values = record.values();
        assert_eq!(values[0], Some("PRJDB1"));
        assert_eq!(values[13], Some("20-30"));
        assert_eq!(values.iter().filter(|v| v.is_some()).count(), 2);
    }

    #[test]
    fn raw_document_deserializes_backend_hit() {
        let hit = json!({
            "_index": "bioproject",
            "_id": "PRJDB1",
            "_score": 1.0,
            "_source": {"title": "t", "_annotation": {"sample_taxid": "9606"}}
        });
        let doc: RawDocument = serde_json::from_value(hit).expect("parse");
        assert_eq!(doc.id, "PRJDB1");
        assert_eq!(doc.index.as_deref(), Some("bioproject"));
        assert_eq!(doc.field("title"), Some(&json!("t")));
        assert!(doc.annotations().is_some());
    }

    #[test]
    fn non_mapping_annotation_is_ignored() {
        let mut source = Map::new();
        source.insert("_annotation".into(), json!(["a"]));
        let doc = RawDocument::new("x", source);
        assert!(doc.annotations().is_none());
    }

    #[test]
    fn series_serializes_with_type_tag() {
        let mut series = Series::bar("X", vec!["e1".into()]);
        series.y.push(1.5);
        let value = serde_json::to_value(&series).expect("serialize");
        assert_eq!(
            value,
            json!({"x": ["e1"], "y": [1.5], "name": "X", "type": "bar"})
        );
    }

    #[test]
    fn shaping_error_messages() {
        let err = ShapingError::MisalignedCategory {
            entity: "e2".into(),
            detail: "missing category 'Y'".into(),
        };
        assert_eq!(
            err.to_string(),
            "Misaligned category for entity 'e2': missing category 'Y'"
        );
    }
}
