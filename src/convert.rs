use crate::category::CategoryResolver;
use crate::classify::classify;
use crate::config::{CONVERT_BATCH_SIZE, EQUIVALENT_URI, HAS_TYPE};
use crate::index::ResourceIndex;
use crate::models::{EntityType, Fact, Term, TripleAggregate, WikiPage};
use crate::title::{resolve_title, strip_decorations};
use crate::vocab::{is_category_predicate, smw_datatype};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

/// Datatype recorded on a property page for IRI-valued uses.
const PAGE_DATATYPE: &str = "Page";

/// One sighting of a predicate while converting a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyUse {
    pub uri: String,
    pub title: String,
    pub datatype: Option<&'static str>,
}

/// A converted resource together with the property sightings it produced.
#[derive(Debug, Clone)]
pub struct PageConversion {
    pub page: WikiPage,
    pub property_uses: Vec<PropertyUse>,
}

pub struct WikiPageConverter {
    index: Arc<ResourceIndex>,
    categories: CategoryResolver,
}

impl WikiPageConverter {
    pub fn new(index: Arc<ResourceIndex>) -> Self {
        let categories = CategoryResolver::new(Arc::clone(&index));
        Self { index, categories }
    }

    pub fn index(&self) -> &ResourceIndex {
        &self.index
    }

    /// Builds the page for one resource. Does not touch any shared state
    /// beyond the read-only index, so batches can be converted in parallel.
    pub fn convert(&self, aggregate: &TripleAggregate) -> PageConversion {
        let page_type = classify(Some(aggregate));
        let title = resolve_title(&aggregate.subject, page_type, &self.index);
        let mut page = WikiPage::new(title.page_title, page_type);
        let mut property_uses = Vec::with_capacity(aggregate.triples.len());
        let mut top_depth = 0;

        for triple in &aggregate.triples {
            // Anything in predicate position is a property, whatever its own type says.
            let property = resolve_title(&triple.predicate, EntityType::Predicate, &self.index);

            let (value, datatype) = match &triple.object {
                Term::Iri(uri) | Term::Blank(uri) => {
                    let value_type = self.index.entity_type(uri);
                    let value = resolve_title(uri, value_type, &self.index).fact_title;
                    (value, Some(PAGE_DATATYPE))
                }
                Term::Literal {
                    value, datatype, ..
                } => (strip_decorations(value), smw_datatype(datatype)),
            };

            property_uses.push(PropertyUse {
                uri: triple.predicate.clone(),
                title: property.page_title,
                datatype,
            });

            if is_category_predicate(&triple.predicate) {
                page.add_category_unique(value.clone());
                let depth = self.categories.depth(triple);
                if depth > top_depth {
                    top_depth = depth;
                    page.specific_category = Some(value);
                }
            } else {
                page.add_fact_unique(Fact::new(property.fact_title, value));
            }
        }

        page.add_fact_unique(Fact::new(EQUIVALENT_URI, aggregate.subject.as_str()));

        PageConversion {
            page,
            property_uses,
        }
    }

    pub fn convert_batch(&self, batch: &[TripleAggregate]) -> Vec<PageConversion> {
        batch.par_iter().map(|a| self.convert(a)).collect()
    }
}

/// Property pages keyed by page title, filled in while resources are converted
/// and released only once every resource has been seen.
#[derive(Default)]
pub struct PropertyPages {
    pages: FxHashMap<String, WikiPage>,
}

impl PropertyPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, property: &PropertyUse) {
        let page = self
            .pages
            .entry(property.title.clone())
            .or_insert_with(|| {
                let mut page = WikiPage::new(property.title.clone(), EntityType::Predicate);
                page.add_fact(Fact::new(EQUIVALENT_URI, property.uri.as_str()));
                page
            });
        if let Some(datatype) = property.datatype {
            page.add_fact_unique(Fact::new(HAS_TYPE, datatype));
        }
    }

    /// Unions a predicate resource's own page into the accumulated one.
    pub fn merge(&mut self, page: WikiPage) {
        match self.pages.get_mut(&page.title) {
            Some(existing) => {
                // The page already names the URI it was first seen under.
                for fact in page.facts {
                    if fact.property == EQUIVALENT_URI {
                        continue;
                    }
                    existing.add_fact_unique(fact);
                }
                for category in page.categories {
                    existing.add_category_unique(category);
                }
                if existing.specific_category.is_none() {
                    existing.specific_category = page.specific_category;
                }
            }
            None => {
                self.pages.insert(page.title.clone(), page);
            }
        }
    }

    /// Records the sightings of `conversion` and hands back its page unless
    /// it is itself a property, which stays here until [`into_pages`](Self::into_pages).
    pub fn absorb(&mut self, conversion: PageConversion) -> Option<WikiPage> {
        for property in &conversion.property_uses {
            self.observe(property);
        }
        if conversion.page.entity_type == EntityType::Predicate {
            self.merge(conversion.page);
            None
        } else {
            Some(conversion.page)
        }
    }

    pub fn get(&self, title: &str) -> Option<&WikiPage> {
        self.pages.get(title)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Sorted by title so output is stable between runs.
    pub fn into_pages(self) -> Vec<WikiPage> {
        let mut pages: Vec<WikiPage> = self.pages.into_values().collect();
        pages.sort_by(|a, b| a.title.cmp(&b.title));
        pages
    }
}

pub struct ConvertedPages {
    pub pages: Vec<WikiPage>,
    pub properties: Vec<WikiPage>,
}

/// Converts every aggregate of `index`, passing finished pages to `emit` in
/// aggregate order, then returns the accumulated property pages. The first
/// error from `emit` stops the conversion.
pub fn convert_index<F, E>(index: Arc<ResourceIndex>, mut emit: F) -> Result<Vec<WikiPage>, E>
where
    F: FnMut(WikiPage) -> Result<(), E>,
{
    let converter = WikiPageConverter::new(Arc::clone(&index));
    let mut properties = PropertyPages::new();

    for batch in index.aggregates().chunks(CONVERT_BATCH_SIZE) {
        for conversion in converter.convert_batch(batch) {
            if let Some(page) = properties.absorb(conversion) {
                emit(page)?;
            }
        }
    }

    debug!(properties = properties.len(), "Flushing property pages");
    Ok(properties.into_pages())
}

pub fn convert_all(index: Arc<ResourceIndex>) -> ConvertedPages {
    let mut pages = Vec::with_capacity(index.len());
    let properties = convert_index(index, |page| {
        pages.push(page);
        Ok::<(), Infallible>(())
    });
    let properties = match properties {
        Ok(properties) => properties,
        Err(never) => match never {},
    };
    ConvertedPages { pages, properties }
}
