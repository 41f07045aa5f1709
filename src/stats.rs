use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected while a conversion runs
#[derive(Debug, Default)]
pub struct ConversionStats {
    pub triples_read: AtomicU64,
    pub subjects: AtomicU64,
    pub pages_written: AtomicU64,
    pub property_pages_written: AtomicU64,
    pub template_pages_written: AtomicU64,
    pub pages_filtered: AtomicU64,
    pub facts_written: AtomicU64,
    pub categories_written: AtomicU64,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_triples(&self, count: u64) {
        self.triples_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_subjects(&self, count: u64) {
        self.subjects.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_pages(&self) {
        self.pages_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_property_pages(&self) {
        self.property_pages_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_template_pages(&self) {
        self.template_pages_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_filtered(&self) {
        self.pages_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_facts(&self, count: u64) {
        self.facts_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_categories(&self, count: u64) {
        self.categories_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn triples(&self) -> u64 {
        self.triples_read.load(Ordering::Relaxed)
    }

    pub fn subject_count(&self) -> u64 {
        self.subjects.load(Ordering::Relaxed)
    }

    pub fn pages(&self) -> u64 {
        self.pages_written.load(Ordering::Relaxed)
    }

    pub fn property_pages(&self) -> u64 {
        self.property_pages_written.load(Ordering::Relaxed)
    }

    pub fn template_pages(&self) -> u64 {
        self.template_pages_written.load(Ordering::Relaxed)
    }

    pub fn filtered(&self) -> u64 {
        self.pages_filtered.load(Ordering::Relaxed)
    }

    pub fn facts(&self) -> u64 {
        self.facts_written.load(Ordering::Relaxed)
    }

    pub fn categories(&self) -> u64 {
        self.categories_written.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_zero() {
        let stats = ConversionStats::new();
        assert_eq!(stats.triples(), 0);
        assert_eq!(stats.subject_count(), 0);
        assert_eq!(stats.pages(), 0);
        assert_eq!(stats.property_pages(), 0);
        assert_eq!(stats.template_pages(), 0);
        assert_eq!(stats.filtered(), 0);
        assert_eq!(stats.facts(), 0);
        assert_eq!(stats.categories(), 0);
    }

    #[test]
    fn counters_accumulate() {
        let stats = ConversionStats::new();
        stats.add_triples(10);
        stats.add_triples(5);
        stats.add_subjects(3);
        stats.inc_pages();
        stats.inc_pages();
        stats.inc_property_pages();
        stats.inc_template_pages();
        stats.inc_filtered();
        stats.add_facts(7);
        stats.add_categories(2);

        assert_eq!(stats.triples(), 15);
        assert_eq!(stats.subject_count(), 3);
        assert_eq!(stats.pages(), 2);
        assert_eq!(stats.property_pages(), 1);
        assert_eq!(stats.template_pages(), 1);
        assert_eq!(stats.filtered(), 1);
        assert_eq!(stats.facts(), 7);
        assert_eq!(stats.categories(), 2);
    }

    #[test]
    fn shared_across_threads() {
        let stats = ConversionStats::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        stats.inc_pages();
                    }
                });
            }
        });
        assert_eq!(stats.pages(), 400);
    }
}
