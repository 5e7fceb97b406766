//! Filter string grammar
//!
//! A stored filter is an `&`-joined list of `key=value` pairs. The reserved
//! `_filter` key carries a parenthesized boolean expression used for two
//! things the plain grammar cannot express:
//!
//! - "value or missing" composites: `(k ge a and k le b) or k pr false`
//! - questionnaire answers: `(item.linkId eq F_01 and item.answer.valueDate ge 2020-01-01)`,
//!   with "or missing" alternatives each selecting the item again
//!
//! Parsing expands both back into synthetic `key, value` pairs.

use octofhir_cohort_mapper::{
    ANSWER_PREFIX, FILTER_KEY, Fragment, LINK_ID, NULL_VALUE, ResolvedKey, parse_prefixed,
};

// ============================================================================
// Rendering
// ============================================================================

/// Render one build fragment under its resolved key
///
/// Comparator prefixes of question answers are only honored for ordered
/// answer types; text and coded answers always compare for equality.
pub fn render_fragment(key: &ResolvedKey, fragment: &Fragment) -> String {
    match (key, fragment) {
        (_, Fragment::Composite { filter_key, filter_value }) => format!("{}={}", filter_key, filter_value),
        (ResolvedKey::Plain { key, .. }, Fragment::Raw(value)) => format!("{}={}", key, value),
        (ResolvedKey::Question { answer_type, .. }, Fragment::Raw(value)) => {
            let (operator, value) = if answer_type.is_ordered() {
                let (comparator, value) = parse_prefixed(value);
                (comparator.and_then(|c| c.fhir_prefix()).unwrap_or("eq"), value)
            } else {
                ("eq", value.as_str())
            };
            format!("{}=({})", FILTER_KEY, key.expression(&[(operator, value)]))
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Split a filter into `key, value` pairs, expanding `_filter` expressions
pub fn parse_filter(filter: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for part in filter.split('&').filter(|part| !part.is_empty()) {
        let Some((key, value)) = part.split_once('=') else {
            log::debug!("Skipping filter fragment without value: {:?}", part);
            continue;
        };
        if key == FILTER_KEY {
            expand_expression(value, &mut pairs);
        } else {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

fn expand_expression(expression: &str, pairs: &mut Vec<(String, String)>) {
    for alternative in split_top_level(strip_enclosing(expression), " or ") {
        let conditions: Vec<Condition<'_>> = split_top_level(strip_enclosing(alternative), " and ")
            .into_iter()
            .filter_map(Condition::parse)
            .collect();

        match conditions.split_first() {
            Some((first, answers)) if first.key == LINK_ID && first.operator == "eq" => {
                for answer in answers.iter().filter(|c| c.key.starts_with(ANSWER_PREFIX)) {
                    pairs.push((first.value.to_string(), answer.raw_value()));
                }
            }
            _ => {
                for condition in conditions {
                    pairs.push((condition.key.to_string(), condition.raw_value()));
                }
            }
        }
    }
}

/// `key operator value` triple of a `_filter` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Condition<'a> {
    key: &'a str,
    operator: &'a str,
    value: &'a str,
}

impl<'a> Condition<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let mut parts = strip_enclosing(text).splitn(3, ' ');
        let condition = Condition {
            key: parts.next()?,
            operator: parts.next()?,
            value: parts.next()?.trim(),
        };
        if condition.key.is_empty() {
            return None;
        }
        Some(condition)
    }

    /// Value in unbuild form: `eq` drops its prefix, `pr false` is the null marker
    fn raw_value(&self) -> String {
        match (self.operator, self.value) {
            ("pr", "false") => NULL_VALUE.to_string(),
            ("eq", value) => value.to_string(),
            (operator, value) => format!("{}{}", operator, value),
        }
    }
}

/// Remove parentheses that wrap the whole expression
fn strip_enclosing(mut text: &str) -> &str {
    loop {
        text = text.trim();
        let inner = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            Some(inner) if closes_at_end(text) => inner,
            _ => return text,
        };
        text = inner;
    }
}

/// Whether the first `(` of `text` is closed by its last character
fn closes_at_end(text: &str) -> bool {
    let mut depth = 0usize;
    for (index, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return index == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Split on a separator outside of parentheses
fn split_top_level<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut index = 0;
    while index < text.len() {
        let rest = &text[index..];
        if depth == 0 && rest.starts_with(separator) {
            parts.push(&text[start..index]);
            index += separator.len();
            start = index;
            continue;
        }
        match rest.chars().next() {
            Some('(') => depth += 1,
            Some(')') => depth = depth.saturating_sub(1),
            _ => {}
        }
        index += rest.chars().next().map_or(1, char::len_utf8);
    }
    parts.push(&text[start..]);
    parts
}
