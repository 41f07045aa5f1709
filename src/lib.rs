//! rdf2smw: RDF to Semantic MediaWiki import dumps
//!
//! This crate turns an unordered set of RDF triples into MediaWiki XML dumps that
//! can be loaded with `importDump.php` into a wiki running Semantic MediaWiki.
//!
//! 1. **Read** -- Decode Turtle / N-Triples (optionally BZ2-compressed) into triples
//! 2. **Aggregate** -- Group triples by subject
//! 3. **Index** -- Build one immutable subject-to-aggregate index over the whole input;
//!    nothing downstream starts resolving until it exists
//! 4. **Convert** -- Turn each aggregate into a wiki page: classify it, resolve titles,
//!    pick categories and the most specific one, and accumulate property pages
//!    with inferred datatypes
//! 5. **Write** -- Emit page, property and template dumps
//!
//! # Architecture
//!
//! - **Stage threads** -- Each step runs on its own thread, joined by bounded queues
//!   for backpressure
//! - **Shared index** -- The resource index is published once behind an `Arc` and only
//!   read afterwards, so resolvers need no locking
//! - **Parallel conversion** -- Aggregates are converted in rayon batches; results are
//!   applied in order so output stays deterministic
//! - **All-or-nothing output** -- Files are staged under temporary names and moved into
//!   place only if every stage succeeded
//!
//! # Key Modules
//!
//! - [`parser`] -- Streaming Turtle / N-Triples reader
//! - [`aggregate`] -- Per-subject grouping
//! - [`index`] -- Resource index with cached classification
//! - [`classify`] -- Entity type classification
//! - [`title`] -- Wiki title resolution and sanitation
//! - [`category`] -- Category specificity ranking
//! - [`convert`] -- Wiki page conversion and property page accumulation
//! - [`filter`] -- Category-based page filter
//! - [`serialize`] -- Wikitext rendering and MediaWiki XML output
//! - [`pipeline`] -- Stage threads and channels
//! - [`models`] -- Core data types (Triple, TripleAggregate, WikiPage, Fact)
//! - [`stats`] -- Thread-safe counters for the run summary
//! - [`config`] -- Constants
//! - [`vocab`] -- Recognized RDF vocabulary
//!
//! # Example Usage
//!
//! ```bash
//! rdf2smw -i mydata.nt -o mydata.xml
//! # writes mydata.xml, mydata_properties.xml and mydata_templates.xml
//! ```

pub mod aggregate;
pub mod category;
pub mod classify;
pub mod config;
pub mod convert;
pub mod filter;
pub mod index;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod serialize;
pub mod stats;
pub mod title;
pub mod vocab;
