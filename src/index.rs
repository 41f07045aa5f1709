use crate::classify::classify;
use crate::models::{EntityType, TripleAggregate};
use rustc_hash::FxHashMap;
use tracing::info;

/// Subject-keyed lookup over every aggregate of the run.
///
/// Built once after all aggregates have arrived and never mutated afterwards,
/// so it can be shared behind an `Arc` by any number of readers.
pub struct ResourceIndex {
    aggregates: Vec<TripleAggregate>,
    slots: FxHashMap<String, usize>,
    types: Vec<EntityType>,
}

impl ResourceIndex {
    pub fn build(aggregates: impl IntoIterator<Item = TripleAggregate>) -> Self {
        let mut index = Self {
            aggregates: Vec::new(),
            slots: FxHashMap::default(),
            types: Vec::new(),
        };

        for aggregate in aggregates {
            match index.slots.get(&aggregate.subject) {
                // Same subject delivered twice: keep one aggregate holding both.
                Some(&slot) => index.aggregates[slot].triples.extend(aggregate.triples),
                None => {
                    index
                        .slots
                        .insert(aggregate.subject.clone(), index.aggregates.len());
                    index.aggregates.push(aggregate);
                }
            }
        }

        index.types = index
            .aggregates
            .iter()
            .map(|aggregate| classify(Some(aggregate)))
            .collect();

        info!(
            subjects = index.aggregates.len(),
            triples = index.triple_count(),
            "Resource index built"
        );

        index
    }

    pub fn get(&self, uri: &str) -> Option<&TripleAggregate> {
        self.slots.get(uri).map(|&slot| &self.aggregates[slot])
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.slots.contains_key(uri)
    }

    /// Cached classification; unknown resources are `Undefined`.
    pub fn entity_type(&self, uri: &str) -> EntityType {
        self.slots
            .get(uri)
            .map(|&slot| self.types[slot])
            .unwrap_or_default()
    }

    /// Aggregates in the order their subjects were first seen.
    pub fn aggregates(&self) -> &[TripleAggregate] {
        &self.aggregates
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    pub fn triple_count(&self) -> usize {
        self.aggregates.iter().map(|a| a.triples.len()).sum()
    }
}
