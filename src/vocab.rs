//! Fixed RDF vocabulary recognized by the converter.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

/// Predicates whose object names a page, tried in this order.
pub const TITLE_PROPERTIES: &[&str] = &[
    "http://semantic-mediawiki.org/swivt/1.0#page",
    "http://www.w3.org/2000/01/rdf-schema#label",
    "http://purl.org/dc/elements/1.1/title",
    "http://purl.org/dc/terms/title",
    "http://www.w3.org/2004/02/skos/core#preferredLabel",
    "http://xmlns.com/foaf/0.1/name",
];

pub const PROPERTY_TYPES: &[&str] = &[
    "http://www.w3.org/2002/07/owl#AnnotationProperty",
    "http://www.w3.org/2002/07/owl#DatatypeProperty",
    "http://www.w3.org/2002/07/owl#ObjectProperty",
];

pub const CLASS_TYPES: &[&str] = &["http://www.w3.org/2002/07/owl#Class"];

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

/// Structural predicates that turn their object into a category of the subject.
pub fn is_category_predicate(predicate: &str) -> bool {
    predicate == RDF_TYPE || predicate == RDFS_SUBCLASS_OF
}

/// Semantic MediaWiki datatype for a literal datatype IRI, if it is one we map.
pub fn smw_datatype(datatype: &str) -> Option<&'static str> {
    match datatype {
        XSD_STRING | RDF_LANG_STRING => Some("Text"),
        XSD_INTEGER | XSD_FLOAT => Some("Number"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datatype_mapping() {
        assert_eq!(smw_datatype(XSD_STRING), Some("Text"));
        assert_eq!(smw_datatype(RDF_LANG_STRING), Some("Text"));
        assert_eq!(smw_datatype(XSD_INTEGER), Some("Number"));
        assert_eq!(smw_datatype(XSD_FLOAT), Some("Number"));
        assert_eq!(smw_datatype("http://www.w3.org/2001/XMLSchema#date"), None);
    }

    #[test]
    fn category_predicates() {
        assert!(is_category_predicate(RDF_TYPE));
        assert!(is_category_predicate(RDFS_SUBCLASS_OF));
        assert!(!is_category_predicate(TITLE_PROPERTIES[1]));
    }
}
