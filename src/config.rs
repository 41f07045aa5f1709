/// Capacity of the bounded queues between pipeline stages
pub const CHANNEL_CAPACITY: usize = 16;

/// Titles at or above this many bytes are shortened (MediaWiki caps titles at 255 bytes)
pub const MAX_TITLE_LEN: usize = 250;

/// Appended to titles that had words removed
pub const ELLIPSIS: &str = " …";

/// Aggregates converted per parallel batch
pub const CONVERT_BATCH_SIZE: usize = 256;

/// Progress update interval (tick every N triples)
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Revision comment written on every generated page
pub const REVISION_COMMENT: &str = "Page created by rdf2smw";

/// Contributor recorded on every generated revision
pub const CONTRIBUTOR_IP: &str = "127.0.0.1";

/// Fact holding the subject's original URI
pub const EQUIVALENT_URI: &str = "Equivalent URI";

/// Property page fact recording the inferred datatype
pub const HAS_TYPE: &str = "Has type";

/// Template parameter carrying the page's categories
pub const CATEGORIES_PARAM: &str = "Categories";
