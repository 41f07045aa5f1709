use crate::aggregate::{aggregate_triples, TripleAggregator};
use crate::config::{CHANNEL_CAPACITY, PROGRESS_INTERVAL};
use crate::convert::{convert_all, convert_index, ConvertedPages};
use crate::filter::CategoryFilter;
use crate::index::ResourceIndex;
use crate::models::{Triple, TripleAggregate, WikiPage};
use crate::parser::TripleReader;
use crate::serialize::{DumpPaths, DumpWriter, PendingDump};
use crate::stats::ConversionStats;
use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub use_templates: bool,
    /// Only pages in one of these categories are written (empty keeps all)
    pub categories: Vec<String>,
    pub dump_pages: Option<PathBuf>,
    pub show_progress: bool,
}

impl ConvertConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            use_templates: true,
            categories: Vec::new(),
            dump_pages: None,
            show_progress: false,
        }
    }
}

/// A stage stopped because its neighbour went away. Only reported when no
/// stage failed for a real reason.
#[derive(Debug)]
struct Disconnected(&'static str);

impl fmt::Display for Disconnected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage stopped unexpectedly", self.0)
    }
}

impl std::error::Error for Disconnected {}

/// Runs the whole conversion: read, aggregate, index, convert, write.
///
/// Each stage runs on its own thread, joined by bounded queues. Output files
/// are moved into place only when every stage succeeded.
pub fn run(config: &ConvertConfig) -> Result<ConversionStats> {
    let stats = ConversionStats::new();
    let paths = DumpPaths::from_output(&config.output);

    let (triple_tx, triple_rx) = sync_channel::<Triple>(CHANNEL_CAPACITY);
    let (aggregate_tx, aggregate_rx) = sync_channel::<TripleAggregate>(CHANNEL_CAPACITY);
    let (index_tx, index_rx) = sync_channel::<Arc<ResourceIndex>>(1);
    let (page_tx, page_rx) = sync_channel::<WikiPage>(CHANNEL_CAPACITY);

    let pending = thread::scope(|s| -> Result<PendingDump> {
        let stats = &stats;
        let paths = &paths;

        let reader = spawn_stage(s, "rdf-reader", move || {
            read_stage(config, triple_tx, stats)
        })?;
        let aggregator = spawn_stage(s, "aggregator", move || {
            aggregate_stage(triple_rx, aggregate_tx, stats)
        })?;
        let indexer = spawn_stage(s, "index-builder", move || {
            index_stage(aggregate_rx, vec![index_tx])
        })?;
        let converter = spawn_stage(s, "converter", move || convert_stage(index_rx, page_tx))?;
        let writer = spawn_stage(s, "xml-writer", move || {
            write_stage(page_rx, paths, config, stats)
        })?;

        let upstream = [
            join_stage(reader),
            join_stage(aggregator),
            join_stage(indexer),
            join_stage(converter),
        ];
        let written = join_stage(writer);

        let mut errors: Vec<anyhow::Error> = upstream.into_iter().filter_map(Result::err).collect();
        let pending = match written {
            Ok(pending) => Some(pending),
            Err(e) => {
                errors.push(e);
                None
            }
        };
        match (first_cause(errors), pending) {
            (Some(e), _) => Err(e),
            (None, Some(pending)) => Ok(pending),
            (None, None) => Err(anyhow!("xml-writer stage produced no output")),
        }
    })?;

    debug!(files = ?pending.paths(), "All stages finished");
    pending.commit()?;

    info!(
        triples = stats.triples(),
        subjects = stats.subject_count(),
        pages = stats.pages(),
        properties = stats.property_pages(),
        templates = stats.template_pages(),
        "Conversion finished"
    );
    Ok(stats)
}

/// Same conversion without threads or files, for callers that already hold
/// their triples in memory.
pub fn convert_triples(triples: impl IntoIterator<Item = Triple>) -> ConvertedPages {
    let index = ResourceIndex::build(aggregate_triples(triples));
    convert_all(Arc::new(index))
}

fn spawn_stage<'scope, 'env, F, T>(
    scope: &'scope Scope<'scope, 'env>,
    name: &str,
    stage: F,
) -> Result<ScopedJoinHandle<'scope, Result<T>>>
where
    F: FnOnce() -> Result<T> + Send + 'scope,
    T: Send + 'scope,
{
    debug!(stage = name, "Starting stage");
    thread::Builder::new()
        .name(name.to_string())
        .spawn_scoped(scope, stage)
        .map_err(|e| anyhow!("Failed to spawn {} thread: {}", name, e))
}

fn join_stage<T>(handle: ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    let name = handle.thread().name().unwrap_or("unnamed").to_string();
    handle
        .join()
        .map_err(|_| anyhow!("{} thread panicked", name))?
}

/// Prefers a real failure over the disconnections it caused in other stages.
fn first_cause(mut errors: Vec<anyhow::Error>) -> Option<anyhow::Error> {
    let real = errors
        .iter()
        .position(|e| e.downcast_ref::<Disconnected>().is_none());
    match real {
        Some(i) => Some(errors.swap_remove(i)),
        None => errors.into_iter().next(),
    }
}

fn progress_bar(show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn read_stage(
    config: &ConvertConfig,
    out: SyncSender<Triple>,
    stats: &ConversionStats,
) -> Result<()> {
    let reader = TripleReader::open(&config.input)?;
    info!(input = reader.source(), "Reading triples");
    let pb = progress_bar(config.show_progress);

    let mut count = 0u64;
    for triple in reader {
        out.send(triple?).map_err(|_| Disconnected("aggregator"))?;
        count += 1;
        if count % PROGRESS_INTERVAL == 0 {
            pb.set_message(format!("{} triples read", count));
        }
    }

    pb.finish_and_clear();
    stats.add_triples(count);
    info!(triples = count, "Finished reading triples");
    Ok(())
}

fn aggregate_stage(
    input: Receiver<Triple>,
    out: SyncSender<TripleAggregate>,
    stats: &ConversionStats,
) -> Result<()> {
    let mut aggregator = TripleAggregator::new();
    for triple in input {
        aggregator.push(triple);
    }
    stats.add_subjects(aggregator.subjects() as u64);
    debug!(subjects = aggregator.subjects(), "Aggregated triples by subject");

    for aggregate in aggregator.finish() {
        out.send(aggregate)
            .map_err(|_| Disconnected("index-builder"))?;
    }
    Ok(())
}

/// Drains every aggregate before publishing the index to all consumers.
fn index_stage(
    input: Receiver<TripleAggregate>,
    consumers: Vec<SyncSender<Arc<ResourceIndex>>>,
) -> Result<()> {
    let index = Arc::new(ResourceIndex::build(input));
    for consumer in consumers {
        consumer
            .send(Arc::clone(&index))
            .map_err(|_| Disconnected("converter"))?;
    }
    Ok(())
}

fn convert_stage(index: Receiver<Arc<ResourceIndex>>, out: SyncSender<WikiPage>) -> Result<()> {
    let index = index.recv().map_err(|_| Disconnected("index-builder"))?;
    let properties = convert_index(index, |page| {
        out.send(page)
            .map_err(|_| anyhow::Error::new(Disconnected("xml-writer")))
    })?;
    for page in properties {
        out.send(page).map_err(|_| Disconnected("xml-writer"))?;
    }
    Ok(())
}

fn write_stage(
    input: Receiver<WikiPage>,
    paths: &DumpPaths,
    config: &ConvertConfig,
    stats: &ConversionStats,
) -> Result<PendingDump> {
    let filter = CategoryFilter::new(config.categories.iter().cloned());
    let mut writer = DumpWriter::create(
        paths,
        config.use_templates,
        filter,
        config.dump_pages.as_deref(),
        stats,
    )?;
    for page in input {
        writer.write(&page)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cause_skips_disconnections() {
        let errors = vec![
            anyhow::Error::new(Disconnected("aggregator")),
            anyhow!("disk full"),
            anyhow::Error::new(Disconnected("converter")),
        ];
        assert_eq!(first_cause(errors).unwrap().to_string(), "disk full");
    }

    #[test]
    fn first_cause_falls_back_to_disconnection() {
        let errors = vec![anyhow::Error::new(Disconnected("converter"))];
        assert!(first_cause(errors)
            .unwrap()
            .to_string()
            .contains("converter"));
        assert!(first_cause(Vec::new()).is_none());
    }

    #[test]
    fn in_memory_conversion() {
        use crate::models::Term;
        let out = convert_triples(vec![Triple::new(
            "http://example.org/s",
            "http://example.org/p",
            Term::iri("http://example.org/o"),
        )]);
        assert_eq!(out.pages.len(), 1);
        assert_eq!(out.properties.len(), 1);
    }
}
