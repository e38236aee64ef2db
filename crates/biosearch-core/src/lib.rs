//! # biosearch-core
//!
//! The result-shaping pipeline for biosearch - THE LOGIC.
//!
//! The proxy in `apps/biosearch` fetches documents from the search backend and
//! hands them to this crate, which reshapes them for clients:
//!
//! - `annotation` flattens one document's nested annotation map into text values
//! - `metadata` projects a batch of documents into fixed-shape `FlatRecord`s
//! - `tabular` serializes flat records into tab-separated text
//! - `composition` pivots per-entity compositions into per-category chart series
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Holds no state between calls; every transform is request-scoped
//! - Shape violations fail fast with `ShapingError` instead of producing
//!   partially-correct output

// =============================================================================
// MODULES
// =============================================================================

pub mod annotation;
pub mod composition;
pub mod metadata;
pub mod primitives;
pub mod tabular;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CategoryValue, ChartKind, CompositionEntry, FlatRecord, RawDocument, Series, ShapingError,
};

// =============================================================================
// RE-EXPORTS: Transforms
// =============================================================================

pub use annotation::{normalize_annotation, normalize_value};
pub use composition::pivot_composition;
pub use metadata::project_metadata;
pub use tabular::{TabularRecord, encode_maps, encode_records};
