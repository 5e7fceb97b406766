//! Numeric comparisons (`ge2`, `le3`, ...)

use super::format_decimal;
use crate::error::MapperResult;
use crate::registry::{BuildInput, Chip, ChipInput, Fragment, Fragments, UnbuildInput};
use futures::FutureExt;
use futures::future::BoxFuture;
use octofhir_cohort_model::{Comparator, DataValue, NumericComparison};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Split a FHIR search prefix off a raw value
///
/// A prefix is only recognized when followed by something that starts a
/// number or a date, so `letter` or `gene` are never taken as prefixed.
pub fn parse_prefixed(raw: &str) -> (Option<Comparator>, &str) {
    let (Some(prefix), Some(rest)) = (raw.get(..2), raw.get(2..)) else {
        return (None, raw);
    };
    let starts_value = rest
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.' || c == '+');
    match Comparator::from_fhir_prefix(prefix) {
        Some(comparator) if starts_value => (Some(comparator), rest),
        _ => (None, raw),
    }
}

pub(super) fn build_comparator(input: &BuildInput<'_>) -> Fragments {
    let Some(comparison) = input.value.as_comparison() else {
        return Fragments::new();
    };
    let value = format_decimal(comparison.value);
    match (comparison.comparator.fhir_prefix(), comparison.max_value) {
        (Some(prefix), _) => Fragments::from_iter([Fragment::Raw(format!("{}{}", prefix, value))]),
        (None, Some(max)) => Fragments::from_iter([
            Fragment::Raw(format!("ge{}", value)),
            Fragment::Raw(format!("le{}", format_decimal(max))),
        ]),
        (None, None) => Fragments::from_iter([Fragment::Raw(format!("ge{}", value))]),
    }
}

/// Merge one prefixed bound into the accumulated comparison
fn merge_bound(existing: Option<&NumericComparison>, comparator: Comparator, value: Decimal) -> NumericComparison {
    let lower = existing.and_then(|c| match c.comparator {
        Comparator::GreaterOrEqual | Comparator::Between => Some(c.value),
        _ => None,
    });
    let upper = existing.and_then(|c| match c.comparator {
        Comparator::LessOrEqual => Some(c.value),
        Comparator::Between => c.max_value,
        _ => None,
    });
    match comparator {
        Comparator::GreaterOrEqual => match upper {
            Some(max) => NumericComparison::between(value, max),
            None => NumericComparison::new(comparator, value),
        },
        Comparator::LessOrEqual => match lower {
            Some(min) => NumericComparison::between(min, value),
            None => NumericComparison::new(comparator, value),
        },
        other => NumericComparison::new(other, value),
    }
}

pub(super) fn unbuild_comparator(input: UnbuildInput<'_>) -> BoxFuture<'_, MapperResult<DataValue>> {
    async move {
        let (comparator, number) = parse_prefixed(input.raw);
        let Ok(value) = Decimal::from_str(number) else {
            log::debug!("Ignoring non numeric value {:?} for {}", input.raw, input.key);
            return Ok(input.existing.clone());
        };
        let comparator = comparator.unwrap_or(Comparator::Equal);
        Ok(DataValue::Comparison(merge_bound(
            input.existing.as_comparison(),
            comparator,
            value,
        )))
    }
    .boxed()
}

pub(super) fn chip_comparator(input: &ChipInput<'_>) -> Option<Chip> {
    let comparison = input.value.as_comparison()?;
    let value = format_decimal(comparison.value);
    let label = match (comparison.comparator, comparison.max_value) {
        (Comparator::Between, Some(max)) => {
            format!("{} between {} and {}", input.label, value, format_decimal(max))
        }
        (comparator, _) => format!("{} {} {}", input.label, comparator, value),
    };
    Some(Chip::new(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ResolvedKey;
    use crate::resolver::NoOpEntityResolver;
    use rstest::rstest;

    fn count_key() -> ResolvedKey {
        ResolvedKey::Plain {
            key: "count".to_string(),
            deidentified: false,
        }
    }

    fn build(value: DataValue) -> Vec<Fragment> {
        let key = count_key();
        build_comparator(&BuildInput {
            value: &value,
            key: &key,
            deidentified: false,
            args: &[],
        })
        .into_vec()
    }

    async fn unbuild(raw: &str, existing: &DataValue) -> DataValue {
        unbuild_comparator(UnbuildInput {
            raw,
            is_deid_key: false,
            existing,
            key: "count",
            args: &[],
            resolver: &NoOpEntityResolver,
        })
        .await
        .unwrap()
    }

    #[rstest]
    #[case("ge2", Some(Comparator::GreaterOrEqual), "2")]
    #[case("le-1.5", Some(Comparator::LessOrEqual), "-1.5")]
    #[case("eq2020-01-01", Some(Comparator::Equal), "2020-01-01")]
    #[case("42", None, "42")]
    #[case("gene", None, "gene")]
    #[case("ge", None, "ge")]
    fn test_parse_prefixed(#[case] raw: &str, #[case] comparator: Option<Comparator>, #[case] rest: &str) {
        assert_eq!(parse_prefixed(raw), (comparator, rest));
    }

    #[test]
    fn test_build_single_bound() {
        let value = DataValue::comparison(Comparator::GreaterOrEqual, 2);
        assert_eq!(build(value), vec![Fragment::raw("ge2")]);
    }

    #[test]
    fn test_build_between() {
        let value = DataValue::Comparison(NumericComparison::between(1, 3));
        assert_eq!(build(value), vec![Fragment::raw("ge1"), Fragment::raw("le3")]);
    }

    #[test]
    fn test_build_non_comparison_is_omitted() {
        assert!(build(DataValue::Null).is_empty());
        assert!(build(DataValue::text("2")).is_empty());
    }

    #[tokio::test]
    async fn test_unbuild_merges_into_between() {
        let lower = unbuild("ge1", &DataValue::Null).await;
        let both = unbuild("le3", &lower).await;
        assert_eq!(both, DataValue::Comparison(NumericComparison::between(1, 3)));

        let again = unbuild("ge1", &both).await;
        assert_eq!(again, both);
    }

    #[tokio::test]
    async fn test_unbuild_unprefixed_is_equal() {
        let value = unbuild("5", &DataValue::Null).await;
        assert_eq!(value, DataValue::comparison(Comparator::Equal, 5));
    }

    #[tokio::test]
    async fn test_unbuild_malformed_keeps_existing() {
        let existing = DataValue::comparison(Comparator::GreaterOrEqual, 1);
        assert_eq!(unbuild("geabc", &existing).await, existing);
    }
}
