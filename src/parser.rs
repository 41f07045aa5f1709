use crate::models::{Term, Triple};
use anyhow::{bail, Context, Result};
use bzip2::read::BzDecoder;
use oxrdf::{NamedOrBlankNode, Term as OxTerm};
use oxttl::TurtleParser;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

type RawTriples = Box<dyn Iterator<Item = Result<oxrdf::Triple>>>;

/// Streams decoded triples out of a Turtle or N-Triples source.
///
/// Any decode failure is returned as an error naming the source; callers treat
/// it as fatal for the whole run.
pub struct TripleReader {
    inner: RawTriples,
    source: String,
    read: u64,
    failed: bool,
}

impl TripleReader {
    /// Opens `path`, decompressing on the fly when it ends in `.bz2`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open RDF input at: {}", path.display()))?;
        let source = path.display().to_string();
        let is_bz2 = path.extension().is_some_and(|ext| ext == "bz2");
        if is_bz2 {
            Ok(Self::from_reader(BzDecoder::new(BufReader::new(file)), source))
        } else {
            Ok(Self::from_reader(BufReader::new(file), source))
        }
    }

    pub fn from_reader<R: Read + 'static>(reader: R, source: impl Into<String>) -> Self {
        let inner = TurtleParser::new()
            .for_reader(reader)
            .map(|r| r.map_err(anyhow::Error::from));
        Self {
            inner: Box::new(inner),
            source: source.into(),
            read: 0,
            failed: false,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of triples decoded so far.
    pub fn triples_read(&self) -> u64 {
        self.read
    }
}

impl Iterator for TripleReader {
    type Item = Result<Triple>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.inner.next()?;
        let result = next
            .and_then(convert_triple)
            .with_context(|| {
                format!(
                    "Could not decode triple #{} in {}",
                    self.read + 1,
                    self.source
                )
            });
        match result {
            Ok(triple) => {
                self.read += 1;
                Some(Ok(triple))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn convert_triple(triple: oxrdf::Triple) -> Result<Triple> {
    let subject = match triple.subject {
        NamedOrBlankNode::NamedNode(node) => node.into_string(),
        NamedOrBlankNode::BlankNode(node) => format!("_:{}", node.as_str()),
        #[allow(unreachable_patterns)]
        other => bail!("Unsupported subject term: {}", other),
    };
    let predicate = triple.predicate.into_string();
    let object = match triple.object {
        OxTerm::NamedNode(node) => Term::Iri(node.into_string()),
        OxTerm::BlankNode(node) => Term::Blank(format!("_:{}", node.as_str())),
        OxTerm::Literal(literal) => {
            let datatype = literal.datatype().as_str().to_string();
            let language = literal.language().map(str::to_string);
            Term::Literal {
                value: literal.value().to_string(),
                datatype,
                language,
            }
        }
        #[allow(unreachable_patterns)]
        other => bail!("Unsupported object term: {}", other),
    };
    Ok(Triple {
        subject,
        predicate,
        object,
    })
}
