use serde::Serialize;
use std::fmt;

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(String),
    /// Blank node label, stored as `_:label` so it shares the subject key space
    Blank(String),
    Literal {
        value: String,
        datatype: String,
        language: Option<String>,
    },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// Key under which a referenced resource is looked up in the index.
    pub fn resource_key(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Blank(label) => Some(label),
            Term::Literal { .. } => None,
        }
    }

    /// Lexical form for literals, the IRI (or blank label) otherwise.
    pub fn as_str(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::Blank(label) => label,
            Term::Literal { value, .. } => value,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Blank(label) => f.write_str(label),
            Term::Literal {
                value,
                language: Some(lang),
                ..
            } => write!(f, "{:?}@{}", value, lang),
            Term::Literal {
                value, datatype, ..
            } => write!(f, "{:?}^^<{}>", value, datatype),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = if self.subject.starts_with("_:") {
            self.subject.clone()
        } else {
            format!("<{}>", self.subject)
        };
        write!(f, "{} <{}> {} .", subject, self.predicate, self.object)
    }
}

/// All triples sharing one subject, in the order they were read.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleAggregate {
    pub subject: String,
    pub triples: Vec<Triple>,
}

impl TripleAggregate {
    pub fn new(subject: impl Into<String>, triples: Vec<Triple>) -> Self {
        Self {
            subject: subject.into(),
            triples,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum EntityType {
    #[default]
    Undefined,
    Predicate,
    Class,
    Template,
}

impl EntityType {
    /// MediaWiki namespace id the page is imported into.
    pub fn namespace(self) -> i32 {
        match self {
            EntityType::Undefined => 0,
            EntityType::Template => 10,
            EntityType::Class => 14,
            EntityType::Predicate => 102,
        }
    }

    pub fn title_prefix(self) -> &'static str {
        match self {
            EntityType::Predicate => "Property:",
            EntityType::Class => "Category:",
            EntityType::Template => "Template:",
            EntityType::Undefined => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fact {
    pub property: String,
    pub value: String,
}

impl Fact {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WikiPage {
    pub title: String,
    pub entity_type: EntityType,
    pub facts: Vec<Fact>,
    pub categories: Vec<String>,
    pub specific_category: Option<String>,
}

impl WikiPage {
    pub fn new(title: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            title: title.into(),
            entity_type,
            facts: Vec::new(),
            categories: Vec::new(),
            specific_category: None,
        }
    }

    /// Appends unconditionally; repeated properties are how multi-valued
    /// template parameters are expressed.
    pub fn add_fact(&mut self, fact: Fact) {
        self.facts.push(fact);
    }

    pub fn add_fact_unique(&mut self, fact: Fact) -> bool {
        if self.facts.contains(&fact) {
            return false;
        }
        self.facts.push(fact);
        true
    }

    pub fn add_category_unique(&mut self, category: impl Into<String>) -> bool {
        let category = category.into();
        if self.categories.contains(&category) {
            return false;
        }
        self.categories.push(category);
        true
    }

    pub fn has_fact(&self, property: &str, value: &str) -> bool {
        self.facts
            .iter()
            .any(|f| f.property == property && f.value == value)
    }

    /// Template selector: the specific category, else the last category added.
    pub fn template_name(&self) -> Option<&str> {
        self.specific_category
            .as_deref()
            .or_else(|| self.categories.last().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_fact_unique_skips_duplicates() {
        let mut page = WikiPage::new("Page", EntityType::Undefined);
        assert!(page.add_fact_unique(Fact::new("Name", "Rust")));
        assert!(!page.add_fact_unique(Fact::new("Name", "Rust")));
        assert!(page.add_fact_unique(Fact::new("Name", "Python")));
        assert!(!page.add_fact_unique(Fact::new("Name", "Rust")));
        assert_eq!(page.facts.len(), 2);
    }

    #[test]
    fn add_fact_allows_duplicates() {
        let mut page = WikiPage::new("Page", EntityType::Undefined);
        page.add_fact(Fact::new("Author", "A"));
        page.add_fact(Fact::new("Author", "A"));
        assert_eq!(page.facts.len(), 2);
    }

    #[test]
    fn add_category_unique_keeps_first_order() {
        let mut page = WikiPage::new("Page", EntityType::Undefined);
        page.add_category_unique("B");
        page.add_category_unique("A");
        page.add_category_unique("B");
        assert_eq!(page.categories, vec!["B", "A"]);
    }

    #[test]
    fn template_name_prefers_specific_category() {
        let mut page = WikiPage::new("Page", EntityType::Undefined);
        assert_eq!(page.template_name(), None);
        page.add_category_unique("Thing");
        page.add_category_unique("Animal");
        assert_eq!(page.template_name(), Some("Animal"));
        page.specific_category = Some("Thing".to_string());
        assert_eq!(page.template_name(), Some("Thing"));
    }

    #[test]
    fn namespaces_match_mediawiki() {
        assert_eq!(EntityType::Undefined.namespace(), 0);
        assert_eq!(EntityType::Template.namespace(), 10);
        assert_eq!(EntityType::Class.namespace(), 14);
        assert_eq!(EntityType::Predicate.namespace(), 102);
    }

    #[test]
    fn triple_display_is_ntriples_like() {
        let t = Triple::new(
            "http://example.org/s",
            "http://example.org/p",
            Term::literal("x", "http://www.w3.org/2001/XMLSchema#string"),
        );
        assert_eq!(
            t.to_string(),
            "<http://example.org/s> <http://example.org/p> \"x\"^^<http://www.w3.org/2001/XMLSchema#string> ."
        );
    }
}
