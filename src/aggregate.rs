use crate::models::{Triple, TripleAggregate};
use rustc_hash::FxHashMap;

/// Groups triples by subject.
///
/// Aggregates come out in the order their subject was first seen; triples
/// inside an aggregate keep their arrival order.
#[derive(Default)]
pub struct TripleAggregator {
    slots: FxHashMap<String, usize>,
    aggregates: Vec<TripleAggregate>,
    triples: u64,
}

impl TripleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, triple: Triple) {
        self.triples += 1;
        match self.slots.get(&triple.subject) {
            Some(&slot) => self.aggregates[slot].triples.push(triple),
            None => {
                let slot = self.aggregates.len();
                self.slots.insert(triple.subject.clone(), slot);
                self.aggregates
                    .push(TripleAggregate::new(triple.subject.clone(), vec![triple]));
            }
        }
    }

    pub fn subjects(&self) -> usize {
        self.aggregates.len()
    }

    pub fn triples(&self) -> u64 {
        self.triples
    }

    pub fn finish(self) -> Vec<TripleAggregate> {
        self.aggregates
    }
}

pub fn aggregate_triples(triples: impl IntoIterator<Item = Triple>) -> Vec<TripleAggregate> {
    let mut aggregator = TripleAggregator::new();
    for triple in triples {
        aggregator.push(triple);
    }
    aggregator.finish()
}
