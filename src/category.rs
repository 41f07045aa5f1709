use crate::index::ResourceIndex;
use crate::models::Triple;
use crate::vocab::is_category_predicate;
use dashmap::DashMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::trace;

/// Ranks categories by how many super-category levels sit above them.
///
/// Walks `rdf:type` / `rdfs:subClassOf` edges through the resource index. An
/// edge back into the node chain currently being walked counts as one level
/// and ends that branch, so cyclic hierarchies terminate. Every node is walked
/// at most once per query. Depths that did not depend on such a cut are
/// memoized across queries; the memo is concurrent so one resolver can serve
/// parallel converters.
pub struct CategoryResolver {
    index: Arc<ResourceIndex>,
    memo: DashMap<String, usize>,
}

impl CategoryResolver {
    pub fn new(index: Arc<ResourceIndex>) -> Self {
        Self {
            index,
            memo: DashMap::new(),
        }
    }

    /// Depth of the category named by `triple`'s object. Literal objects have none.
    pub fn depth(&self, triple: &Triple) -> usize {
        match triple.object.resource_key() {
            Some(uri) => self.depth_of(uri),
            None => 0,
        }
    }

    pub fn depth_of(&self, uri: &str) -> usize {
        let mut walk = Walk::default();
        self.walk(uri, &mut walk).0
    }

    /// Returns the depth and whether a cycle was cut below `uri`.
    fn walk(&self, uri: &str, walk: &mut Walk) -> (usize, bool) {
        if let Some(depth) = self.memo.get(uri) {
            return (*depth, false);
        }
        if let Some(&depth) = walk.cut.get(uri) {
            return (depth, true);
        }
        let Some(aggregate) = self.index.get(uri) else {
            return (0, false);
        };

        walk.path.insert(uri.to_string());
        let mut depth = 0;
        let mut cyclic = false;
        for triple in &aggregate.triples {
            if !is_category_predicate(&triple.predicate) {
                continue;
            }
            let Some(parent) = triple.object.resource_key() else {
                continue;
            };
            let parent_depth = if walk.path.contains(parent) {
                trace!(from = uri, to = parent, "Category cycle cut");
                cyclic = true;
                0
            } else {
                let (d, c) = self.walk(parent, walk);
                cyclic |= c;
                d
            };
            depth = depth.max(parent_depth + 1);
        }
        walk.path.remove(uri);

        if cyclic {
            walk.cut.insert(uri.to_string(), depth);
        } else {
            self.memo.insert(uri.to_string(), depth);
        }
        (depth, cyclic)
    }
}

/// State of one top-level depth query.
#[derive(Default)]
struct Walk {
    /// Nodes on the chain currently being walked
    path: FxHashSet<String>,
    /// Depths that depended on a cut cycle; valid only within this query,
    /// so each node is still visited at most once
    cut: FxHashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_triples;
    use crate::models::Term;
    use crate::vocab::{RDFS_SUBCLASS_OF, RDF_TYPE, XSD_STRING};

    const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";

    fn resolver(edges: Vec<(&str, &str, &str)>) -> CategoryResolver {
        let triples = edges
            .into_iter()
            .map(|(s, p, o)| Triple::new(s, p, Term::iri(o)));
        CategoryResolver::new(Arc::new(ResourceIndex::build(aggregate_triples(triples))))
    }

    #[test]
    fn chain_is_deeper_than_leaf() {
        let r = resolver(vec![
            ("A", RDFS_SUBCLASS_OF, "B"),
            ("B", RDFS_SUBCLASS_OF, "C"),
            ("L", RDF_TYPE, "X"),
        ]);
        assert_eq!(r.depth_of("C"), 0);
        assert_eq!(r.depth_of("B"), 1);
        assert_eq!(r.depth_of("A"), 2);

        let to_a = Triple::new("item", RDF_TYPE, Term::iri("A"));
        let to_leaf = Triple::new("item", RDF_TYPE, Term::iri("C"));
        assert!(r.depth(&to_a) > r.depth(&to_leaf));
    }

    #[test]
    fn absent_category_has_zero_depth() {
        let r = resolver(vec![]);
        assert_eq!(r.depth_of("http://example.org/Nowhere"), 0);
    }

    #[test]
    fn takes_maximum_over_parents() {
        let r = resolver(vec![
            ("A", RDFS_SUBCLASS_OF, "Shallow"),
            ("A", RDFS_SUBCLASS_OF, "Deep"),
            ("Deep", RDFS_SUBCLASS_OF, "Deeper"),
            ("Deeper", RDF_TYPE, OWL_CLASS),
        ]);
        assert_eq!(r.depth_of("A"), 3);
    }

    #[test]
    fn ignores_non_category_edges() {
        let r = resolver(vec![
            ("A", "http://example.org/related", "B"),
            ("B", RDFS_SUBCLASS_OF, "C"),
        ]);
        assert_eq!(r.depth_of("A"), 0);
    }

    #[test]
    fn cycles_saturate_instead_of_recursing() {
        let r = resolver(vec![("A", RDFS_SUBCLASS_OF, "B"), ("B", RDFS_SUBCLASS_OF, "A")]);
        assert_eq!(r.depth_of("A"), 2);
        assert_eq!(r.depth_of("B"), 2);
        // Repeatable: cyclic results are not memoized with a stale path.
        assert_eq!(r.depth_of("A"), 2);
    }

    #[test]
    fn dense_cycle_visits_each_class_once() {
        let n = 40;
        let names: Vec<String> = (0..n).map(|i| format!("C{}", i)).collect();
        let mut edges = Vec::new();
        for a in &names {
            for b in &names {
                if a != b {
                    edges.push((a.as_str(), RDFS_SUBCLASS_OF, b.as_str()));
                }
            }
        }
        let r = resolver(edges);

        // C0 -> C1 -> ... -> C39 is the first chain explored; every other
        // edge lands on the chain or on a class already finished.
        assert_eq!(r.depth_of("C0"), n);
        assert_eq!(r.depth_of("C0"), n);
        assert!(r.memo.is_empty());
    }

    #[test]
    fn self_loop_terminates() {
        let r = resolver(vec![("A", RDFS_SUBCLASS_OF, "A")]);
        assert_eq!(r.depth_of("A"), 1);
    }

    #[test]
    fn literal_objects_have_no_depth() {
        let r = resolver(vec![]);
        let t = Triple::new("x", RDF_TYPE, Term::literal("Thing", XSD_STRING));
        assert_eq!(r.depth(&t), 0);
    }

    #[test]
    fn memoized_depth_is_reused() {
        let r = resolver(vec![("A", RDFS_SUBCLASS_OF, "B"), ("B", RDFS_SUBCLASS_OF, "C")]);
        assert_eq!(r.depth_of("A"), 2);
        assert_eq!(r.memo.get("B").map(|d| *d), Some(1));
        assert_eq!(r.depth_of("B"), 1);
    }
}
