//! Field values carried by criteria

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// DataValue
// ============================================================================

/// Value of one criterion field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum DataValue {
    /// No value
    #[default]
    Null,
    /// Checkbox
    Boolean(bool),
    /// Free text
    Text(String),
    /// Selected options, codes or entities
    Labels(Vec<LabelItem>),
    /// Number with a comparator (occurrences, counts, measures)
    Comparison(NumericComparison),
    /// Date interval
    DateRange(DateRange),
    /// Age or duration interval
    DurationRange(DurationRange),
}

impl DataValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        DataValue::Text(value.into())
    }

    /// Create a label list from `(id, label)` pairs
    pub fn labels<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        DataValue::Labels(
            items
                .into_iter()
                .map(|(id, label)| LabelItem::new(id, label))
                .collect(),
        )
    }

    /// Create a comparison value
    pub fn comparison(comparator: Comparator, value: impl Into<Decimal>) -> Self {
        DataValue::Comparison(NumericComparison::new(comparator, value))
    }

    /// Whether the value carries nothing worth filtering on
    pub fn is_empty(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::Boolean(_) | DataValue::Comparison(_) => false,
            DataValue::Text(text) => text.trim().is_empty(),
            DataValue::Labels(items) => items.is_empty(),
            DataValue::DateRange(range) => range.start.is_none() && range.end.is_none(),
            DataValue::DurationRange(range) => range.start.is_none() && range.end.is_none(),
        }
    }

    /// Truthiness used by predicates and gated mappers
    pub fn is_truthy(&self) -> bool {
        match self {
            DataValue::Boolean(b) => *b,
            other => !other.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_labels(&self) -> Option<&[LabelItem]> {
        match self {
            DataValue::Labels(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_comparison(&self) -> Option<&NumericComparison> {
        match self {
            DataValue::Comparison(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_date_range(&self) -> Option<&DateRange> {
        match self {
            DataValue::DateRange(range) => Some(range),
            _ => None,
        }
    }

    pub fn as_duration_range(&self) -> Option<&DurationRange> {
        match self {
            DataValue::DurationRange(range) => Some(range),
            _ => None,
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Text(value)
    }
}

impl From<NumericComparison> for DataValue {
    fn from(value: NumericComparison) -> Self {
        DataValue::Comparison(value)
    }
}

impl From<DateRange> for DataValue {
    fn from(value: DateRange) -> Self {
        DataValue::DateRange(value)
    }
}

impl From<DurationRange> for DataValue {
    fn from(value: DurationRange) -> Self {
        DataValue::DurationRange(value)
    }
}

impl From<Vec<LabelItem>> for DataValue {
    fn from(value: Vec<LabelItem>) -> Self {
        DataValue::Labels(value)
    }
}

// ============================================================================
// Labels
// ============================================================================

/// One selected option, code or entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelItem {
    /// Identifier sent to the query engine (option value, code, entity id)
    pub id: String,
    /// Display label
    pub label: String,
    /// Code system, when the id is a code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Whether the code is a leaf of its hierarchy, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_leaf: Option<bool>,
}

impl LabelItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            system: None,
            is_leaf: None,
        }
    }

    /// Set the code system
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the leaf status
    pub fn with_leaf(mut self, is_leaf: bool) -> Self {
        self.is_leaf = Some(is_leaf);
        self
    }
}

// ============================================================================
// Comparisons
// ============================================================================

/// Comparison operator used by numeric fields and occurrences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    Greater,
    #[default]
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "between")]
    Between,
}

impl Comparator {
    /// Symbol shown to users and used by occurrence nodes
    pub const fn symbol(self) -> &'static str {
        match self {
            Comparator::LessOrEqual => "<=",
            Comparator::Less => "<",
            Comparator::Equal => "=",
            Comparator::Greater => ">",
            Comparator::GreaterOrEqual => ">=",
            Comparator::Between => "between",
        }
    }

    /// FHIR search prefix; `None` for `Between`, which needs two prefixes
    pub const fn fhir_prefix(self) -> Option<&'static str> {
        match self {
            Comparator::LessOrEqual => Some("le"),
            Comparator::Less => Some("lt"),
            Comparator::Equal => Some("eq"),
            Comparator::Greater => Some("gt"),
            Comparator::GreaterOrEqual => Some("ge"),
            Comparator::Between => None,
        }
    }

    /// Parse a FHIR search prefix
    pub fn from_fhir_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "le" => Some(Comparator::LessOrEqual),
            "lt" => Some(Comparator::Less),
            "eq" => Some(Comparator::Equal),
            "gt" => Some(Comparator::Greater),
            "ge" => Some(Comparator::GreaterOrEqual),
            _ => None,
        }
    }

    /// Parse a symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<=" => Some(Comparator::LessOrEqual),
            "<" => Some(Comparator::Less),
            "=" => Some(Comparator::Equal),
            ">" => Some(Comparator::Greater),
            ">=" => Some(Comparator::GreaterOrEqual),
            "between" => Some(Comparator::Between),
            _ => None,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A number compared with a comparator; `max_value` is only used by `Between`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericComparison {
    pub value: Decimal,
    pub comparator: Comparator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Decimal>,
}

impl NumericComparison {
    pub fn new(comparator: Comparator, value: impl Into<Decimal>) -> Self {
        Self {
            value: value.into(),
            comparator,
            max_value: None,
        }
    }

    /// Create a `Between` comparison
    pub fn between(min: impl Into<Decimal>, max: impl Into<Decimal>) -> Self {
        Self {
            value: min.into(),
            comparator: Comparator::Between,
            max_value: Some(max.into()),
        }
    }
}

// ============================================================================
// Ranges
// ============================================================================

/// Date interval; `include_null` also accepts resources without a date
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub include_null: bool,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start,
            end,
            include_null: false,
        }
    }

    pub fn with_include_null(mut self, include_null: bool) -> Self {
        self.include_null = include_null;
        self
    }
}

/// Calendar duration as entered in forms (years, months, days)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarDuration {
    #[serde(default)]
    pub years: u32,
    #[serde(default)]
    pub months: u32,
    #[serde(default)]
    pub days: u32,
}

impl CalendarDuration {
    pub const fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    /// Whole duration in days (365-day years, 30-day months)
    pub const fn to_days(self) -> u32 {
        self.years * 365 + self.months * 30 + self.days
    }

    /// Whole duration in months, days dropped
    pub const fn to_months(self) -> u32 {
        self.years * 12 + self.months
    }

    pub const fn from_days(total: u32) -> Self {
        let years = total / 365;
        let rest = total % 365;
        Self {
            years,
            months: rest / 30,
            days: rest % 30,
        }
    }

    pub const fn from_months(total: u32) -> Self {
        Self {
            years: total / 12,
            months: total % 12,
            days: 0,
        }
    }
}

impl fmt::Display for CalendarDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.years > 0 {
            parts.push(format!("{}y", self.years));
        }
        if self.months > 0 {
            parts.push(format!("{}m", self.months));
        }
        if self.days > 0 || parts.is_empty() {
            parts.push(format!("{}d", self.days));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Duration interval (e.g. patient age)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<CalendarDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<CalendarDuration>,
}

impl DurationRange {
    pub fn new(start: Option<CalendarDuration>, end: Option<CalendarDuration>) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DataValue::Null.is_empty());
        assert!(DataValue::text("  ").is_empty());
        assert!(DataValue::Labels(vec![]).is_empty());
        assert!(DataValue::DateRange(DateRange::default()).is_empty());
        assert!(!DataValue::Boolean(false).is_empty());
        assert!(!DataValue::Boolean(false).is_truthy());
        assert!(!DataValue::comparison(Comparator::GreaterOrEqual, 1).is_empty());
    }

    #[test]
    fn test_calendar_duration_days() {
        let d = CalendarDuration::new(18, 6, 3);
        assert_eq!(d.to_days(), 18 * 365 + 180 + 3);
        assert_eq!(CalendarDuration::from_days(d.to_days()), d);
        assert_eq!(CalendarDuration::from_months(30), CalendarDuration::new(2, 6, 0));
    }

    #[test]
    fn test_comparator_serialization() {
        let json = serde_json::to_string(&Comparator::GreaterOrEqual).unwrap();
        assert_eq!(json, "\">=\"");
        let parsed: Comparator = serde_json::from_str("\"between\"").unwrap();
        assert_eq!(parsed, Comparator::Between);
    }

    #[test]
    fn test_data_value_tagged_json() {
        let value = DataValue::labels([("male", "Male")]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "labels");
        assert_eq!(json["value"][0]["id"], "male");
    }
}
