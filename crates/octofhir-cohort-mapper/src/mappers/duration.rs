//! Duration ranges (ages)
//!
//! Durations are sent in days, or in months when the de-identified key is in
//! use since de-identified populations only expose ages in months.

use super::parse_prefixed;
use crate::error::MapperResult;
use crate::registry::{BuildInput, Chip, ChipInput, Fragment, Fragments, UnbuildInput};
use futures::FutureExt;
use futures::future::BoxFuture;
use octofhir_cohort_model::{CalendarDuration, Comparator, DataValue};

fn to_units(duration: CalendarDuration, months: bool) -> u32 {
    if months {
        duration.to_months()
    } else {
        duration.to_days()
    }
}

pub(super) fn build_duration_range(input: &BuildInput<'_>) -> Fragments {
    let Some(range) = input.value.as_duration_range() else {
        return Fragments::new();
    };
    let months = input.key.is_deid();
    [("ge", range.start), ("le", range.end)]
        .into_iter()
        .filter_map(|(prefix, bound)| {
            bound.map(|duration| Fragment::Raw(format!("{}{}", prefix, to_units(duration, months))))
        })
        .collect()
}

pub(super) fn unbuild_duration_range(input: UnbuildInput<'_>) -> BoxFuture<'_, MapperResult<DataValue>> {
    async move {
        let mut range = input.existing.as_duration_range().cloned().unwrap_or_default();
        let (comparator, number) = parse_prefixed(input.raw);
        let Ok(amount) = number.parse::<u32>() else {
            log::debug!("Ignoring malformed duration {:?} for {}", input.raw, input.key);
            return Ok(input.existing.clone());
        };
        let duration = if input.is_deid_key {
            CalendarDuration::from_months(amount)
        } else {
            CalendarDuration::from_days(amount)
        };
        match comparator {
            Some(Comparator::GreaterOrEqual | Comparator::Greater) => range.start = Some(duration),
            Some(Comparator::LessOrEqual | Comparator::Less) => range.end = Some(duration),
            _ => {
                range.start = Some(duration);
                range.end = Some(duration);
            }
        }
        Ok(DataValue::DurationRange(range))
    }
    .boxed()
}

pub(super) fn chip_duration_range(input: &ChipInput<'_>) -> Option<Chip> {
    let range = input.value.as_duration_range()?;
    // Days are meaningless once ages are rounded to months
    let shown = |d: CalendarDuration| {
        if input.deidentified {
            CalendarDuration::from_months(d.to_months())
        } else {
            d
        }
    };
    let text = match (range.start, range.end) {
        (Some(start), Some(end)) => format!("between {} and {}", shown(start), shown(end)),
        (Some(start), None) => format!(">= {}", shown(start)),
        (None, Some(end)) => format!("<= {}", shown(end)),
        (None, None) => return None,
    };
    Some(Chip::new(format!("{} {}", input.label, text)))
}
