use super::OWN_SELLER_IDENTITY;
use crate::catalog::types::ExclusionInput;

/// Normalized set of excluded search terms. Built once at the boundary so no
/// downstream logic has to inspect the raw string-or-list input shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionSet {
    terms: Vec<String>,
}

impl ExclusionSet {
    /// Parsing policy: a string containing a comma splits on commas (keeping
    /// multi-word phrases together), a comma-free string splits on
    /// whitespace, and a list is taken verbatim. Tokens are trimmed and
    /// blank tokens dropped, so malformed input degrades to "no exclusions".
    pub fn parse(input: &ExclusionInput) -> Self {
        let terms: Vec<String> = match input {
            ExclusionInput::List(items) => items
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            ExclusionInput::Text(raw) => {
                if raw.contains(',') {
                    raw.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                } else {
                    raw.split_whitespace().map(|t| t.to_string()).collect()
                }
            }
        };

        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Composes the marketplace search string: the item name, a negation of the
/// operator's own seller identity, then one negated term per item-level and
/// global exclusion, in that order.
pub fn build_search_query(
    name: &str,
    item_exclusions: &ExclusionSet,
    global_exclusions: &ExclusionSet,
) -> String {
    let mut query = name.trim().to_string();
    query.push_str(" -");
    query.push_str(OWN_SELLER_IDENTITY);

    for term in item_exclusions
        .terms()
        .iter()
        .chain(global_exclusions.terms())
    {
        query.push(' ');
        query.push_str(&negate(term));
    }

    query
}

// Multi-word terms are quoted so the search engine excludes the phrase
// rather than each word independently.
fn negate(term: &str) -> String {
    if term.contains(' ') {
        format!("-\"{}\"", term)
    } else {
        format!("-{}", term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(raw: &str) -> ExclusionInput {
        ExclusionInput::Text(raw.to_string())
    }

    #[test]
    fn test_comma_string_splits_on_commas() {
        let set = ExclusionSet::parse(&text("damaged, box only, reprint"));
        assert_eq!(set.terms(), ["damaged", "box only", "reprint"]);
    }

    #[test]
    fn test_comma_free_string_splits_on_whitespace() {
        let set = ExclusionSet::parse(&text("damaged reprint proxy"));
        assert_eq!(set.terms(), ["damaged", "reprint", "proxy"]);
    }

    #[test]
    fn test_list_input_taken_verbatim() {
        let set = ExclusionSet::parse(&ExclusionInput::List(vec![
            "box only".to_string(),
            "damaged".to_string(),
        ]));
        assert_eq!(set.terms(), ["box only", "damaged"]);
    }

    #[test]
    fn test_blank_tokens_dropped() {
        let set = ExclusionSet::parse(&text("damaged, , reprint,  ,"));
        assert_eq!(set.terms(), ["damaged", "reprint"]);

        let set = ExclusionSet::parse(&ExclusionInput::List(vec![
            "  ".to_string(),
            "damaged".to_string(),
            "".to_string(),
        ]));
        assert_eq!(set.terms(), ["damaged"]);
    }

    #[test]
    fn test_empty_input_degrades_to_no_exclusions() {
        assert!(ExclusionSet::parse(&text("")).is_empty());
        assert!(ExclusionSet::parse(&text("   ")).is_empty());
        assert!(ExclusionSet::parse(&ExclusionInput::List(vec![])).is_empty());
    }

    #[test]
    fn test_query_always_excludes_own_seller() {
        let none = ExclusionSet::default();
        let query = build_search_query("Charizard Base Set", &none, &none);
        assert_eq!(query, format!("Charizard Base Set -{}", OWN_SELLER_IDENTITY));
    }

    #[test]
    fn test_multi_word_phrases_are_quoted() {
        let item = ExclusionSet::parse(&text("box only, damaged"));
        let global = ExclusionSet::parse(&text("reprint, near mint"));
        let query = build_search_query("Charizard", &item, &global);

        assert_eq!(
            query,
            format!(
                "Charizard -{} -\"box only\" -damaged -reprint -\"near mint\"",
                OWN_SELLER_IDENTITY
            )
        );
    }

    #[test]
    fn test_no_blank_negated_terms_for_any_input() {
        let inputs = [
            text(""),
            text(",,,"),
            text("  ,  , "),
            ExclusionInput::List(vec!["".to_string(), " ".to_string()]),
        ];

        for input in &inputs {
            let set = ExclusionSet::parse(input);
            let query = build_search_query("Item", &set, &ExclusionSet::default());
            assert!(!query.contains("- "), "blank negation in '{}'", query);
            assert!(!query.ends_with('-'), "dangling negation in '{}'", query);
        }
    }
}
