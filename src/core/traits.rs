//! # Core Traits Module
//!
//! Seams between the content model and the category extractor.
//!
//! - [`Categorized`]: anything that carries an optional category attribute

use crate::resource::CategoryValue;

/// A content item that may carry a category.
///
/// The extractor only reads this attribute; it never creates, mutates or
/// drops the items it is given. Implement it for resource types supplied
/// by another build pipeline to reuse
/// [`extract_categories`](crate::categories::extract_categories).
pub trait Categorized: std::fmt::Debug {
    /// Returns the category of this item, or `None` when it has none.
    fn category(&self) -> Option<&CategoryValue>;
}

impl<T: Categorized + ?Sized> Categorized for &T {
    fn category(&self) -> Option<&CategoryValue> {
        (**self).category()
    }
}

impl Categorized for Option<CategoryValue> {
    fn category(&self) -> Option<&CategoryValue> {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_is_categorized() {
        let some = Some(CategoryValue::Text("news".to_string()));
        let none: Option<CategoryValue> = None;

        assert_eq!(
            some.category(),
            Some(&CategoryValue::Text("news".to_string()))
        );
        assert!(none.category().is_none());
    }

    #[test]
    fn test_reference_is_categorized() {
        let value = Some(CategoryValue::Integer(7));
        let by_ref = &value;
        assert_eq!(by_ref.category(), Some(&CategoryValue::Integer(7)));
    }
}
