use crate::config::{ELLIPSIS, MAX_TITLE_LEN};
use crate::index::ResourceIndex;
use crate::models::{EntityType, Triple};
use crate::vocab::TITLE_PROPERTIES;
use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing ` (ns:local)` and ` [ns:local]` decorations.
static DECORATION_REGEXES: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r" [(][^)]*:[^)]*[)]").unwrap(),
        Regex::new(r" [\[][^\]]*:[^\]]*[\]]").unwrap(),
    ]
});

const REPLACEMENTS: &[(char, &str)] = &[
    ('[', "("),
    (']', ")"),
    ('{', "("),
    ('}', ")"),
    ('|', " "),
    ('#', " "),
    ('<', "less than"),
    ('>', "greater than"),
    ('?', " "),
    ('&', " "),
    // Commas separate values of multi-valued template parameters.
    (',', " "),
    ('.', " "),
    ('=', "-"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    /// Full page name, prefixed with `Property:` or `Category:` where applicable
    pub page_title: String,
    /// Name used as a fact value when the resource is referenced
    pub fact_title: String,
}

/// Resolves the wiki titles for `uri`, treating it as `entity_type`.
///
/// Pure with respect to its inputs: the same uri, type and index always give
/// the same titles.
pub fn resolve_title(uri: &str, entity_type: EntityType, index: &ResourceIndex) -> ResolvedTitle {
    let candidate = index
        .get(uri)
        .and_then(|aggregate| find_title_in_triples(&aggregate.triples))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| local_name(uri));

    let fact_title = sanitize_title(candidate);
    let page_title = match entity_type {
        EntityType::Predicate | EntityType::Class => {
            format!("{}{}", entity_type.title_prefix(), fact_title)
        }
        EntityType::Undefined | EntityType::Template => fact_title.clone(),
    };

    ResolvedTitle {
        page_title,
        fact_title,
    }
}

/// First object of a configured title predicate, in priority order.
pub fn find_title_in_triples(triples: &[Triple]) -> Option<&str> {
    TITLE_PROPERTIES.iter().find_map(|property| {
        triples
            .iter()
            .find(|t| t.predicate == *property)
            .map(|t| t.object.as_str())
    })
}

/// Last `#` segment, then last `/` segment of that.
pub fn local_name(uri: &str) -> &str {
    let after_hash = uri.rsplit('#').next().unwrap_or(uri);
    let name = after_hash.rsplit('/').next().unwrap_or(after_hash);
    if !name.is_empty() {
        return name;
    }
    uri.rsplit(['#', '/'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(uri)
}

/// Makes `raw` usable as a wiki title and as a template parameter value.
pub fn sanitize_title(raw: &str) -> String {
    let mut title = String::with_capacity(raw.len());
    for c in raw.chars() {
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => title.push_str(to),
            None => title.push(c),
        }
    }

    let title = strip_decorations(&title);
    // Upper-casing can grow the title, so it has to happen before the clamp.
    let title = upper_case_first(title.trim());
    clamp_length(&title)
}

/// Removes ` (ns:local)` style decorations until none are left.
pub fn strip_decorations(text: &str) -> String {
    let mut out = text.to_string();
    for re in DECORATION_REGEXES.iter() {
        while re.is_match(&out) {
            out = re.replace_all(&out, "").into_owned();
        }
    }
    out
}

/// Drops trailing words until the title, ellipsis included, fits below
/// [`MAX_TITLE_LEN`] bytes. Titles already short enough are returned as-is.
pub fn clamp_length(title: &str) -> String {
    if title.len() < MAX_TITLE_LEN {
        return title.to_string();
    }

    let budget = MAX_TITLE_LEN - ELLIPSIS.len();
    let mut kept = title;
    while kept.len() >= budget {
        let trimmed = kept.trim_end();
        kept = match trimmed.rfind(char::is_whitespace) {
            Some(pos) => trimmed[..pos].trim_end(),
            None => {
                // One unbroken word: nothing left to drop, cut it instead.
                let mut cut = budget - 1;
                while !trimmed.is_char_boundary(cut) {
                    cut -= 1;
                }
                &trimmed[..cut]
            }
        };
    }

    format!("{}{}", kept, ELLIPSIS)
}

pub fn upper_case_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_triples;
    use crate::models::Term;
    use crate::vocab::XSD_STRING;

    const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";

    fn index_of(triples: Vec<Triple>) -> ResourceIndex {
        ResourceIndex::build(aggregate_triples(triples))
    }

    fn lit(s: &str, p: &str, v: &str) -> Triple {
        Triple::new(s, p, Term::literal(v, XSD_STRING))
    }

    #[test]
    fn local_name_prefers_fragment() {
        assert_eq!(local_name("http://example.org/onto#Thing"), "Thing");
        assert_eq!(local_name("http://example.org/a/b/c"), "c");
        assert_eq!(local_name("http://example.org/a#b/c"), "c");
        assert_eq!(local_name("urn:isbn:123"), "urn:isbn:123");
    }

    #[test]
    fn local_name_skips_empty_segments() {
        assert_eq!(local_name("http://example.org/things/"), "things");
        assert_eq!(local_name("http://example.org/onto#"), "onto");
    }

    #[test]
    fn falls_back_to_local_name() {
        let index = index_of(vec![]);
        let t = resolve_title("http://example.org/people/alice", EntityType::Undefined, &index);
        assert_eq!(t.fact_title, "Alice");
        assert_eq!(t.page_title, "Alice");
    }

    #[test]
    fn title_properties_follow_priority_order() {
        let index = index_of(vec![
            lit("http://example.org/x", FOAF_NAME, "foaf name"),
            lit("http://example.org/x", LABEL, "the label"),
        ]);
        let t = resolve_title("http://example.org/x", EntityType::Undefined, &index);
        assert_eq!(t.fact_title, "The label");
    }

    #[test]
    fn empty_title_property_falls_back() {
        let index = index_of(vec![lit("http://example.org/x", LABEL, "")]);
        let t = resolve_title("http://example.org/x", EntityType::Undefined, &index);
        assert_eq!(t.fact_title, "X");
    }

    #[test]
    fn prefixes_by_entity_type() {
        let index = index_of(vec![]);
        let p = resolve_title("http://example.org/hasName", EntityType::Predicate, &index);
        assert_eq!(p.page_title, "Property:HasName");
        assert_eq!(p.fact_title, "HasName");
        let c = resolve_title("http://example.org/Animal", EntityType::Class, &index);
        assert_eq!(c.page_title, "Category:Animal");
        assert_eq!(c.fact_title, "Animal");
    }

    #[test]
    fn sanitizes_problem_characters() {
        assert_eq!(sanitize_title("a[b]{c}"), "A(b)(c)");
        assert_eq!(sanitize_title("x<y>z"), "Xless thanygreater thanz");
        assert_eq!(sanitize_title("k=v"), "K-v");
        assert_eq!(sanitize_title("a,b.c?d&e|f#g"), "A b c d e f g");
    }

    #[test]
    fn strips_namespace_decorations() {
        assert_eq!(sanitize_title("Benzene (chebi:16716)"), "Benzene");
        assert_eq!(strip_decorations("Value [ns:local] rest"), "Value rest");
        assert_eq!(strip_decorations("Plain (no colon)"), "Plain (no colon)");
    }

    #[test]
    fn sanitation_is_idempotent() {
        let long = "word ".repeat(80);
        // 248 bytes raw; the upper-case first letter takes 6 bytes instead of 2.
        let grows = format!("ΐ{}", "a".repeat(246));
        let inputs = [
            "simple",
            "a.b,c",
            "x <tag> [y] {z}",
            "Thing (ns:local) more",
            "nested (a (b:c) d:e)",
            long.as_str(),
            "ßtraße",
            grows.as_str(),
        ];
        for input in inputs {
            let once = sanitize_title(input);
            assert!(once.len() < MAX_TITLE_LEN, "input: {:?}", input);
            assert_eq!(sanitize_title(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn long_titles_drop_whole_words() {
        let words: Vec<String> = (0..100).map(|i| format!("w{:03}", i)).collect();
        let title = words.join(" ");
        assert!(title.len() >= MAX_TITLE_LEN);

        let clamped = clamp_length(&title);
        assert!(clamped.len() < MAX_TITLE_LEN);
        assert!(clamped.ends_with(ELLIPSIS));

        let body = clamped.strip_suffix(ELLIPSIS).unwrap();
        for word in body.split(' ') {
            assert!(words.contains(&word.to_string()), "split word: {}", word);
        }
    }

    #[test]
    fn short_titles_are_untouched() {
        let title = "a".repeat(MAX_TITLE_LEN - 1);
        assert_eq!(clamp_length(&title), title);
    }

    #[test]
    fn single_long_word_is_cut() {
        let clamped = clamp_length(&"é".repeat(200));
        assert!(clamped.len() < MAX_TITLE_LEN);
        assert!(clamped.ends_with(ELLIPSIS));
    }

    #[test]
    fn upper_cases_first_char_only() {
        assert_eq!(upper_case_first("abc def"), "Abc def");
        assert_eq!(upper_case_first("élan"), "Élan");
        assert_eq!(upper_case_first(""), "");
    }
}
