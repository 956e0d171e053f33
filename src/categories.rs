// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Category Extraction
//!
//! Derives the sorted set of distinct categories present in a collection
//! of resources. The result is recomputed on every call; nothing is
//! cached, so it always reflects the resources it was given.
//!
//! ```
//! use sitetaxon::categories::extract_categories;
//! use sitetaxon::resource::CategoryValue;
//!
//! let resources = vec![
//!     Some(CategoryValue::from("b")),
//!     Some(CategoryValue::from("a")),
//!     None,
//!     Some(CategoryValue::from("b")),
//! ];
//! assert_eq!(extract_categories(&resources).unwrap(), vec!["a", "b"]);
//! ```

use crate::core::traits::Categorized;
use crate::resource::CategoryValue;
use crate::{Result, SiteError};
use log::debug;
use std::cmp::Ordering;

/// Returns the distinct categories of `resources`, sorted ascending.
///
/// Resources without a category are skipped. Fails with
/// [`SiteError::ComparisonError`] when two distinct categories cannot be
/// ordered, e.g. a text category next to a numeric one.
pub fn extract_categories<R: Categorized>(
    resources: &[R],
) -> Result<Vec<String>> {
    Ok(extract_category_values(resources)?
        .iter()
        .map(ToString::to_string)
        .collect())
}

/// Like [`extract_categories`], but keeps the typed values.
///
/// Values that compare equal count once, keeping the first one met, so
/// `1` and `1.0` yield a single category.
pub fn extract_category_values<R: Categorized>(
    resources: &[R],
) -> Result<Vec<CategoryValue>> {
    let mut values: Vec<&CategoryValue> =
        resources.iter().filter_map(Categorized::category).collect();
    ensure_comparable(&values)?;

    values.sort_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal));
    values.dedup_by(|later, earlier| {
        earlier.compare(*later) == Some(Ordering::Equal)
    });

    debug!(
        "Extracted {} categories from {} resources",
        values.len(),
        resources.len()
    );
    Ok(values.into_iter().cloned().collect())
}

/// Fails unless every value compares with the first one.
///
/// That puts all values in one kind family with no NaN next to another
/// value, where [`CategoryValue::compare`] is a total order.
fn ensure_comparable(values: &[&CategoryValue]) -> Result<()> {
    let Some((first, rest)) = values.split_first() else {
        return Ok(());
    };
    match rest.iter().find(|value| first.compare(value).is_none()) {
        Some(value) => Err(SiteError::comparison_error(
            first.describe(),
            value.describe(),
        )),
        None => Ok(()),
    }
}
