//! Free text and text lists

use crate::error::MapperResult;
use crate::registry::{BuildInput, Chip, ChipInput, Fragment, Fragments, UnbuildInput};
use futures::FutureExt;
use futures::future::BoxFuture;
use octofhir_cohort_model::DataValue;

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|token| !token.is_empty())
}

pub(super) fn build_text(input: &BuildInput<'_>) -> Fragments {
    match input.value.as_text().map(str::trim) {
        Some(text) if !text.is_empty() => {
            Fragments::from_iter([Fragment::Raw(urlencoding::encode(text).into_owned())])
        }
        _ => Fragments::new(),
    }
}

pub(super) fn unbuild_text(input: UnbuildInput<'_>) -> BoxFuture<'_, MapperResult<DataValue>> {
    async move {
        let text = match urlencoding::decode(input.raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => input.raw.to_string(),
        };
        Ok(DataValue::Text(text))
    }
    .boxed()
}

pub(super) fn build_list(input: &BuildInput<'_>) -> Fragments {
    let Some(text) = input.value.as_text() else {
        return Fragments::new();
    };
    let items: Vec<&str> = split_list(text).collect();
    if items.is_empty() {
        return Fragments::new();
    }
    Fragments::from_iter([Fragment::Raw(items.join(","))])
}

pub(super) fn unbuild_list(input: UnbuildInput<'_>) -> BoxFuture<'_, MapperResult<DataValue>> {
    async move {
        let mut items: Vec<&str> = input.existing.as_text().map(|t| split_list(t).collect()).unwrap_or_default();
        for item in split_list(input.raw) {
            if !items.contains(&item) {
                items.push(item);
            }
        }
        Ok(DataValue::Text(items.join(",")))
    }
    .boxed()
}

pub(super) fn chip_text(input: &ChipInput<'_>) -> Option<Chip> {
    let text = input.value.as_text()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(Chip::new(format!("{}: {}", input.label, text)))
}
