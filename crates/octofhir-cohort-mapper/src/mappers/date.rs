//! Date ranges
//!
//! Bounds are emitted as `ge{start}` / `le{end}`. When resources without a
//! date are accepted too, both bounds move into one `_filter` composite:
//! `(k ge s and k le e) or k pr false`. Question keys test the typed answer of
//! the item in both alternatives.

use super::parse_prefixed;
use crate::error::MapperResult;
use crate::key::ResolvedKey;
use crate::registry::{BuildInput, Chip, ChipInput, Fragment, Fragments, NULL_VALUE, UnbuildInput};
use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::BoxFuture;
use octofhir_cohort_model::{Comparator, DataValue, DateRange};

/// Key of composite filter fragments
pub const FILTER_KEY: &str = "_filter";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(super) fn build_date_range(input: &BuildInput<'_>) -> Fragments {
    let Some(range) = input.value.as_date_range() else {
        return Fragments::new();
    };
    let bounds: Vec<(&str, NaiveDate)> = [("ge", range.start), ("le", range.end)]
        .into_iter()
        .filter_map(|(prefix, date)| date.map(|d| (prefix, d)))
        .collect();
    if bounds.is_empty() {
        return Fragments::new();
    }

    if range.include_null {
        let dates: Vec<(&str, String)> = bounds
            .iter()
            .map(|(prefix, date)| (*prefix, date.format(DATE_FORMAT).to_string()))
            .collect();
        let conditions: Vec<(&str, &str)> = dates.iter().map(|(prefix, date)| (*prefix, date.as_str())).collect();
        let present = input.key.expression(&conditions);
        let missing = input.key.expression(&[("pr", "false")]);
        let filter_value = match input.key {
            ResolvedKey::Question { .. } => format!("({}) or ({})", present, missing),
            ResolvedKey::Plain { .. } => format!("({}) or {}", present, missing),
        };
        return Fragments::from_iter([Fragment::Composite {
            filter_key: FILTER_KEY.to_string(),
            filter_value,
        }]);
    }

    bounds
        .into_iter()
        .map(|(prefix, date)| Fragment::Raw(format!("{}{}", prefix, date.format(DATE_FORMAT))))
        .collect()
}

pub(super) fn unbuild_date_range(input: UnbuildInput<'_>) -> BoxFuture<'_, MapperResult<DataValue>> {
    async move {
        let mut range = input.existing.as_date_range().cloned().unwrap_or_default();
        if input.raw == NULL_VALUE {
            range.include_null = true;
            return Ok(DataValue::DateRange(range));
        }

        let (comparator, date) = parse_prefixed(input.raw);
        // Date-times keep their date part
        let date = date.get(..10).unwrap_or(date);
        let Ok(date) = NaiveDate::parse_from_str(date, DATE_FORMAT) else {
            log::debug!("Ignoring malformed date {:?} for {}", input.raw, input.key);
            return Ok(input.existing.clone());
        };
        match comparator {
            Some(Comparator::GreaterOrEqual | Comparator::Greater) => range.start = Some(date),
            Some(Comparator::LessOrEqual | Comparator::Less) => range.end = Some(date),
            _ => {
                range.start = Some(date);
                range.end = Some(date);
            }
        }
        Ok(DataValue::DateRange(range))
    }
    .boxed()
}

pub(super) fn chip_date_range(input: &ChipInput<'_>) -> Option<Chip> {
    let range: &DateRange = input.value.as_date_range()?;
    let text = match (range.start, range.end) {
        (Some(start), Some(end)) if start == end => format!("on {}", start.format("%d/%m/%Y")),
        (Some(start), Some(end)) => format!(
            "between {} and {}",
            start.format("%d/%m/%Y"),
            end.format("%d/%m/%Y")
        ),
        (Some(start), None) => format!("after {}", start.format("%d/%m/%Y")),
        (None, Some(end)) => format!("before {}", end.format("%d/%m/%Y")),
        (None, None) => return None,
    };
    let suffix = if range.include_null { " (or undated)" } else { "" };
    Some(Chip::new(format!("{} {}{}", input.label, text, suffix)))
}
