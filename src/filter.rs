use crate::models::{EntityType, WikiPage};
use rustc_hash::FxHashSet;

/// Keeps only pages carrying at least one of the configured categories.
///
/// An empty filter keeps everything. Property pages always pass, since the
/// datatypes they declare apply to whatever pages remain.
#[derive(Debug, Default, Clone)]
pub struct CategoryFilter {
    categories: FxHashSet<String>,
}

impl CategoryFilter {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn accepts(&self, page: &WikiPage) -> bool {
        if self.categories.is_empty() || page.entity_type == EntityType::Predicate {
            return true;
        }
        page.categories.iter().any(|c| self.categories.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(categories: &[&str], entity_type: EntityType) -> WikiPage {
        let mut page = WikiPage::new("P", entity_type);
        for c in categories {
            page.add_category_unique(*c);
        }
        page
    }

    #[test]
    fn empty_filter_accepts_all() {
        let filter = CategoryFilter::default();
        assert!(filter.is_empty());
        assert!(filter.accepts(&page_with(&[], EntityType::Undefined)));
    }

    #[test]
    fn matches_any_category() {
        let filter = CategoryFilter::new(["DataEntry", "Compound"]);
        assert!(filter.accepts(&page_with(&["Thing", "Compound"], EntityType::Undefined)));
        assert!(!filter.accepts(&page_with(&["Thing"], EntityType::Undefined)));
        assert!(!filter.accepts(&page_with(&[], EntityType::Class)));
    }

    #[test]
    fn property_pages_always_pass() {
        let filter = CategoryFilter::new(["DataEntry"]);
        assert!(filter.accepts(&page_with(&[], EntityType::Predicate)));
    }
}
