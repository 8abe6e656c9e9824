use std::collections::HashMap;

use crate::models::{Field, FieldMapping};
use crate::normalize::normalize;

/// Match raw column names against the field vocabulary.
///
/// Only exact matches after normalization count. If several columns normalize to the
/// same text, the right-most one wins.
pub fn map_fields<S: AsRef<str>>(column_names: &[S]) -> FieldMapping {
    let by_normalized: HashMap<String, &str> = column_names
        .iter()
        .map(|c| (normalize(c.as_ref()), c.as_ref()))
        .collect();

    let columns = Field::ALL.map(|field| {
        by_normalized
            .get(&normalize(field.label()))
            .map(|c| (*c).to_string())
    });
    FieldMapping::from_array(columns)
}
