use crate::models::{EntityType, TripleAggregate};
use crate::vocab::{CLASS_TYPES, PROPERTY_TYPES, RDF_TYPE};

/// Decides what kind of wiki entity a resource becomes.
///
/// Looks only at the resource's own `rdf:type` triples; the first one naming an
/// OWL property kind or `owl:Class` decides. Absent resources are `Undefined`.
pub fn classify(aggregate: Option<&TripleAggregate>) -> EntityType {
    let Some(aggregate) = aggregate else {
        return EntityType::Undefined;
    };
    for triple in &aggregate.triples {
        if triple.predicate != RDF_TYPE {
            continue;
        }
        let Some(object) = triple.object.resource_key() else {
            continue;
        };
        if PROPERTY_TYPES.contains(&object) {
            return EntityType::Predicate;
        }
        if CLASS_TYPES.contains(&object) {
            return EntityType::Class;
        }
    }
    EntityType::Undefined
}
