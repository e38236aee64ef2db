//! # Composition Pivot
//!
//! Reshapes "entity → list of (category, value)" records into one chart series
//! per category, each holding one value per entity.
//!
//! ## Alignment
//!
//! The category template is taken from the first entity. Every other entity is
//! joined to it by category name, not by position: an entity listing the same
//! categories in another order still lands in the right series, while an
//! entity with a missing, extra or duplicated category fails the whole batch
//! with `ShapingError::MisalignedCategory`.
//!
//! ## Entity Order
//!
//! The search backend does not return documents in request order. When the
//! caller passes its requested id order, entities are arranged to follow it.
//! The order is matched against each entity's document id, not its label.
//! Requested ids absent from the batch are skipped and entities not named in
//! the order keep their backend order after the named ones. The x axis shows
//! the labels of the entities actually present.

use crate::primitives::COMPOSITION_FIELD;
use crate::{CategoryValue, CompositionEntry, RawDocument, Series, ShapingError};
use serde_json::Value;
use std::collections::BTreeMap;

impl CompositionEntry {
    /// Read the composition block of a backend document.
    ///
    /// The entity name falls back to the document id when the block has none.
    pub fn from_document(document: &RawDocument) -> Result<Self, ShapingError> {
        let block = document
            .field(COMPOSITION_FIELD)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ShapingError::MalformedInput(format!(
                    "document '{}' has no {} block",
                    document.id, COMPOSITION_FIELD
                ))
            })?;

        let name = block
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&document.id)
            .to_string();

        let composition = block.get("composition").cloned().ok_or_else(|| {
            ShapingError::MalformedInput(format!("document '{}' has no composition", document.id))
        })?;
        let composition: Vec<CategoryValue> =
            serde_json::from_value(composition).map_err(|e| {
                ShapingError::MalformedInput(format!(
                    "document '{}' has an invalid composition: {}",
                    document.id, e
                ))
            })?;

        Ok(Self {
            id: document.id.clone(),
            name,
            composition,
        })
    }
}

/// Pivot a batch of entities into per-category series.
///
/// An empty batch yields an empty list.
pub fn pivot_composition(
    entries: &[CompositionEntry],
    order: Option<&[String]>,
) -> Result<Vec<Series>, ShapingError> {
    let entries = arrange(entries, order);
    let Some(first) = entries.first() else {
        return Ok(Vec::new());
    };

    let template: Vec<&str> = first.composition.iter().map(|c| c.taxon.as_str()).collect();
    let x: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
    let mut series: Vec<Series> = template
        .iter()
        .map(|taxon| Series::bar(*taxon, x.clone()))
        .collect();

    for entry in &entries {
        let values = index_by_category(entry)?;
        if values.len() != template.len() {
            return Err(ShapingError::MisalignedCategory {
                entity: entry.name.clone(),
                detail: format!(
                    "expected {} categories, found {}",
                    template.len(),
                    values.len()
                ),
            });
        }
        for (slot, taxon) in series.iter_mut().zip(&template) {
            let value = values
                .get(taxon)
                .ok_or_else(|| ShapingError::MisalignedCategory {
                    entity: entry.name.clone(),
                    detail: format!("missing category '{taxon}'"),
                })?;
            slot.y.push(*value);
        }
    }

    Ok(series)
}

/// Map category name to value for one entity, rejecting duplicates.
fn index_by_category(entry: &CompositionEntry) -> Result<BTreeMap<&str, f64>, ShapingError> {
    let mut values = BTreeMap::new();
    for CategoryValue { taxon, value } in &entry.composition {
        if values.insert(taxon.as_str(), *value).is_some() {
            return Err(ShapingError::MisalignedCategory {
                entity: entry.name.clone(),
                detail: format!("duplicate category '{taxon}'"),
            });
        }
    }
    Ok(values)
}

/// Arrange entries to follow the requested document id order.
fn arrange<'a>(
    entries: &'a [CompositionEntry],
    order: Option<&[String]>,
) -> Vec<&'a CompositionEntry> {
    let Some(order) = order else {
        return entries.iter().collect();
    };

    let mut used = vec![false; entries.len()];
    let mut arranged = Vec::with_capacity(entries.len());
    for id in order {
        let found = entries
            .iter()
            .enumerate()
            .find(|(i, e)| !used[*i] && e.id == *id);
        if let Some((i, entry)) = found {
            used[i] = true;
            arranged.push(entry);
        }
    }
    arranged.extend(
        entries
            .iter()
            .zip(&used)
            .filter(|(_, taken)| !**taken)
            .map(|(entry, _)| entry),
    );
    arranged
}

// =============================================================================
// TESTS
// =============================================================================
