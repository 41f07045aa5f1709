use crate::config::{CATEGORIES_PARAM, CONTRIBUTOR_IP, REVISION_COMMENT};
use crate::filter::CategoryFilter;
use crate::models::{EntityType, Fact, WikiPage};
use crate::stats::ConversionStats;
use anyhow::{Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rustc_hash::FxHashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Escapes characters that would break a fact annotation or template call.
/// XML escaping is left to the writer.
pub fn escape_wiki_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '[' => out.push('('),
            ']' => out.push(')'),
            '|' => out.push(','),
            '=' => out.push('-'),
            _ => out.push(c),
        }
    }
    out
}

pub fn spaces_to_underscores(s: &str) -> String {
    s.replace(' ', "_")
}

pub fn fact_wikitext(fact: &Fact) -> String {
    format!("[[{}::{}]]\n", fact.property, escape_wiki_value(&fact.value))
}

pub fn category_wikitext(category: &str) -> String {
    format!("[[Category:{}]]\n", category)
}

/// Renders `page` as a call of `template`; consecutive facts of the same
/// property collapse into one comma-separated parameter.
pub fn template_call(page: &WikiPage, template: &str) -> String {
    let mut text = format!("{{{{{}\n", template);
    let mut last_property: Option<&str> = None;
    for fact in &page.facts {
        let value = escape_wiki_value(&fact.value);
        if last_property == Some(fact.property.as_str()) {
            text.push_str(&format!(",{}\n", value));
        } else {
            text.push_str(&format!(
                "|{}={}\n",
                spaces_to_underscores(&fact.property),
                value
            ));
        }
        last_property = Some(&fact.property);
    }
    text.push_str(&format!(
        "|{}={}\n}}}}",
        CATEGORIES_PARAM,
        page.categories.join(",")
    ));
    text
}

/// Plain annotation form: one `[[Property::Value]]` per fact, then categories.
pub fn annotation_wikitext(page: &WikiPage) -> String {
    let mut text = String::new();
    for fact in &page.facts {
        text.push_str(&fact_wikitext(fact));
    }
    for category in &page.categories {
        text.push_str(&category_wikitext(category));
    }
    text
}

/// Template call when templates are on and the page has a category,
/// plain annotations otherwise.
pub fn page_wikitext(page: &WikiPage, use_templates: bool) -> String {
    match page.template_name().filter(|_| use_templates) {
        Some(template) => template_call(page, template),
        None => annotation_wikitext(page),
    }
}

/// Properties used per template, in first-use order.
#[derive(Default)]
pub struct TemplateIndex {
    slots: FxHashMap<String, usize>,
    templates: Vec<(String, Vec<String>)>,
}

impl TemplateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, template: &str, page: &WikiPage) {
        let slot = match self.slots.get(template) {
            Some(&slot) => slot,
            None => {
                let slot = self.templates.len();
                self.slots.insert(template.to_string(), slot);
                self.templates.push((template.to_string(), Vec::new()));
                slot
            }
        };
        let properties = &mut self.templates[slot].1;
        for fact in &page.facts {
            if !properties.contains(&fact.property) {
                properties.push(fact.property.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn properties(&self, template: &str) -> Option<&[String]> {
        self.slots
            .get(template)
            .map(|&slot| self.templates[slot].1.as_slice())
    }

    /// Template pages, one per template name recorded.
    pub fn pages(&self) -> Vec<(String, String)> {
        self.templates
            .iter()
            .map(|(name, properties)| {
                let title = format!("{}{}", EntityType::Template.title_prefix(), name);
                (title, template_text(name, properties))
            })
            .collect()
    }
}

pub fn template_text(name: &str, properties: &[String]) -> String {
    let mut text = format!(
        "{{|class=\"wikitable smwtable\"\n!colspan=\"2\"| {}: {{{{PAGENAMEE}}}}\n",
        name
    );
    for property in properties {
        let arg = spaces_to_underscores(property);
        text.push_str(&format!(
            "|-\n!{}\n|{{{{#arraymap:{{{{{{{}|}}}}}}|,|x|[[{}::x]]|,}}}}\n",
            property, arg, property
        ));
    }
    text.push_str("|}\n\n");
    text.push_str(&format!(
        "{{{{#arraymap:{{{{{{{}}}}}}}|,|x|[[Category:x]]|}}}}\n",
        CATEGORIES_PARAM
    ));
    text
}

/// Writes `<mediawiki>` import documents.
pub struct MediaWikiXmlWriter<W: Write> {
    writer: Writer<W>,
    timestamp: String,
}

impl<W: Write> MediaWikiXmlWriter<W> {
    pub fn new(inner: W, timestamp: impl Into<String>) -> Result<Self> {
        let mut writer = Writer::new_with_indent(inner, b' ', 2);
        writer
            .write_event(Event::Start(BytesStart::new("mediawiki")))
            .context("Failed to write <mediawiki>")?;
        Ok(Self {
            writer,
            timestamp: timestamp.into(),
        })
    }

    pub fn write_page(&mut self, title: &str, namespace: i32, text: &str) -> Result<()> {
        let ns = namespace.to_string();
        let timestamp = self.timestamp.as_str();
        self.writer
            .create_element("page")
            .write_inner_content(|w| {
                w.create_element("title")
                    .write_text_content(BytesText::new(title))?;
                w.create_element("ns")
                    .write_text_content(BytesText::new(&ns))?;
                w.create_element("revision").write_inner_content(|w| {
                    w.create_element("timestamp")
                        .write_text_content(BytesText::new(timestamp))?;
                    w.create_element("contributor").write_inner_content(|w| {
                        w.create_element("ip")
                            .write_text_content(BytesText::new(CONTRIBUTOR_IP))?;
                        Ok::<(), quick_xml::Error>(())
                    })?;
                    w.create_element("comment")
                        .write_text_content(BytesText::new(REVISION_COMMENT))?;
                    w.create_element("model")
                        .write_text_content(BytesText::new("wikitext"))?;
                    w.create_element("format")
                        .write_text_content(BytesText::new("text/x-wiki"))?;
                    w.create_element("text")
                        .with_attribute(("xml:space", "preserve"))
                        .write_text_content(BytesText::new(text))?;
                    Ok::<(), quick_xml::Error>(())
                })?;
                Ok::<(), quick_xml::Error>(())
            })
            .with_context(|| format!("Failed to write page: {}", title))?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer
            .write_event(Event::End(BytesEnd::new("mediawiki")))
            .context("Failed to write </mediawiki>")?;
        let mut inner = self.writer.into_inner();
        inner.write_all(b"\n")?;
        inner.flush()?;
        Ok(inner)
    }
}

/// A file written under a temporary name and moved into place on commit.
/// Dropped without commit, the temporary file is removed.
pub struct StagedFile {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl StagedFile {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        let file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create output file: {}", tmp_path.display()))?;
        Ok(Self {
            path,
            tmp_path,
            writer: Some(BufWriter::with_capacity(128 * 1024, file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn commit(mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        fs::rename(&self.tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to move {} into place",
                self.tmp_path.display()
            )
        })?;
        debug!(path = %self.path.display(), "Output committed");
        Ok(())
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.writer.as_mut() {
            Some(w) => w.write(buf),
            None => Err(std::io::Error::other("staged file already committed")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            if let Err(e) = fs::remove_file(&self.tmp_path) {
                warn!(error = %e, path = %self.tmp_path.display(), "Failed to remove partial output");
            }
        }
    }
}

/// Output locations for the three dump files.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpPaths {
    pub pages: PathBuf,
    pub properties: PathBuf,
    pub templates: PathBuf,
}

impl DumpPaths {
    /// `out.xml` gives `out.xml`, `out_properties.xml` and `out_templates.xml`.
    pub fn from_output(output: impl AsRef<Path>) -> Self {
        let output = output.as_ref();
        let raw = output.to_string_lossy();
        let stem = raw.strip_suffix(".xml").unwrap_or(&raw);
        Self {
            pages: output.to_path_buf(),
            properties: PathBuf::from(format!("{}_properties.xml", stem)),
            templates: PathBuf::from(format!("{}_templates.xml", stem)),
        }
    }
}

/// Consumes finished pages and writes the page, property and template dumps.
pub struct DumpWriter<'a> {
    pages: MediaWikiXmlWriter<StagedFile>,
    properties: MediaWikiXmlWriter<StagedFile>,
    templates_path: PathBuf,
    json: Option<StagedFile>,
    template_index: TemplateIndex,
    use_templates: bool,
    filter: CategoryFilter,
    timestamp: String,
    stats: &'a ConversionStats,
}

impl<'a> DumpWriter<'a> {
    pub fn create(
        paths: &DumpPaths,
        use_templates: bool,
        filter: CategoryFilter,
        json_dump: Option<&Path>,
        stats: &'a ConversionStats,
    ) -> Result<Self> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let pages = MediaWikiXmlWriter::new(StagedFile::create(&paths.pages)?, timestamp.as_str())?;
        let properties =
            MediaWikiXmlWriter::new(StagedFile::create(&paths.properties)?, timestamp.as_str())?;
        let json = json_dump.map(StagedFile::create).transpose()?;
        Ok(Self {
            pages,
            properties,
            templates_path: paths.templates.clone(),
            json,
            template_index: TemplateIndex::new(),
            use_templates,
            filter,
            timestamp,
            stats,
        })
    }

    pub fn write(&mut self, page: &WikiPage) -> Result<()> {
        if !self.filter.accepts(page) {
            self.stats.inc_filtered();
            return Ok(());
        }

        if let Some(template) = page.template_name().filter(|_| self.use_templates) {
            self.template_index.record(template, page);
        }
        let text = page_wikitext(page, self.use_templates);

        let namespace = page.entity_type.namespace();
        if page.entity_type == EntityType::Predicate {
            self.properties.write_page(&page.title, namespace, &text)?;
            self.stats.inc_property_pages();
        } else {
            self.pages.write_page(&page.title, namespace, &text)?;
            self.stats.inc_pages();
        }
        self.stats.add_facts(page.facts.len() as u64);
        self.stats.add_categories(page.categories.len() as u64);

        if let Some(json) = self.json.as_mut() {
            serde_json::to_writer(&mut *json, page).context("Failed to dump page as JSON")?;
            json.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Writes the template dump and closes every document. Nothing is
    /// visible at the final paths until [`PendingDump::commit`].
    pub fn finish(self) -> Result<PendingDump> {
        let mut templates = MediaWikiXmlWriter::new(
            StagedFile::create(&self.templates_path)?,
            self.timestamp.as_str(),
        )?;
        for (title, text) in self.template_index.pages() {
            templates.write_page(&title, EntityType::Template.namespace(), &text)?;
            self.stats.inc_template_pages();
        }

        Ok(PendingDump {
            files: [
                Some(self.pages.finish()?),
                Some(self.properties.finish()?),
                Some(templates.finish()?),
                self.json,
            ]
            .into_iter()
            .flatten()
            .collect(),
        })
    }
}

/// Completed output still sitting under temporary names.
pub struct PendingDump {
    files: Vec<StagedFile>,
}

impl PendingDump {
    pub fn paths(&self) -> Vec<&Path> {
        self.files.iter().map(StagedFile::path).collect()
    }

    pub fn commit(self) -> Result<()> {
        for file in self.files {
            info!(path = %file.path().display(), "Writing output file");
            file.commit()?;
        }
        Ok(())
    }
}
