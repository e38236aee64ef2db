//! # Shaping Primitives
//!
//! Fixed field names and wire constants shared by the shaping transforms.
//!
//! These describe the document layout the search backend returns and the
//! output format clients expect. They are compiled in and immutable.

/// Name of the sub-mapping holding derived/enriched attributes of a document.
pub const ANNOTATION_FIELD: &str = "_annotation";

/// Name of the sub-mapping holding per-entity composition data.
pub const COMPOSITION_FIELD: &str = "taxonomic_comparison";

/// Core fields copied from the document body into every flat record.
pub const CORE_FIELDS: [&str; 5] = [
    "identifier",
    "title",
    "description",
    "organism",
    "organization",
];

/// Annotation attributes projected through the normalizer.
///
/// Every flat record carries all of them, null when the document has no
/// annotation map.
pub const ANNOTATION_ATTRIBUTES: [&str; 9] = [
    "sample_organism",
    "sample_taxid",
    "sample_host_organism",
    "sample_host_organism_id",
    "sample_host_disease",
    "sample_host_disease_id",
    "sample_host_location",
    "sample_ph_range",
    "sample_temperature_range",
];

/// Number of columns of a flat metadata record.
pub const FLAT_RECORD_WIDTH: usize = CORE_FIELDS.len() + ANNOTATION_ATTRIBUTES.len();

/// Column names of a flat metadata record: core fields, then annotation
/// attributes.
pub const FLAT_RECORD_COLUMNS: [&str; FLAT_RECORD_WIDTH] = flat_record_columns();

const fn flat_record_columns() -> [&'static str; FLAT_RECORD_WIDTH] {
    let mut columns = [""; FLAT_RECORD_WIDTH];
    let mut i = 0;
    while i < CORE_FIELDS.len() {
        columns[i] = CORE_FIELDS[i];
        i += 1;
    }
    let mut j = 0;
    while j < ANNOTATION_ATTRIBUTES.len() {
        columns[CORE_FIELDS.len() + j] = ANNOTATION_ATTRIBUTES[j];
        j += 1;
    }
    columns
}

/// Separator used when a list-valued annotation is joined into one value.
pub const LIST_SEPARATOR: &str = ",";

/// Column delimiter of the tabular export.
pub const COLUMN_DELIMITER: char = '\t';

/// Row delimiter of the tabular export.
pub const ROW_DELIMITER: char = '\n';
