//! Label lists: select options, codes and entities
//!
//! All three share the same build (`id1,id2` or `system|id1,system|id2`); they
//! differ in how labels are recovered on unbuild.

use crate::error::{MapperError, MapperResult};
use crate::registry::{BuildInput, Chip, ChipInput, Fragment, Fragments, UnbuildInput, UnbuildMethod};
use futures::FutureExt;
use futures::future::BoxFuture;
use octofhir_cohort_model::{DataValue, LabelItem};

fn split_ids(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|id| !id.is_empty())
}

/// `system|code` or a bare code
fn split_system(token: &str) -> (Option<&str>, &str) {
    match token.split_once('|') {
        Some((system, code)) if !system.is_empty() => (Some(system), code),
        Some((_, code)) => (None, code),
        None => (None, token),
    }
}

/// Union of two label lists, existing items first
fn merge_labels(existing: &DataValue, incoming: Vec<LabelItem>) -> DataValue {
    let mut items: Vec<LabelItem> = existing.as_labels().map(<[LabelItem]>::to_vec).unwrap_or_default();
    for item in incoming {
        if !items.iter().any(|i| i.id == item.id && i.system == item.system) {
            items.push(item);
        }
    }
    DataValue::Labels(items)
}

pub(super) fn build_labels(input: &BuildInput<'_>) -> Fragments {
    let Some(items) = input.value.as_labels() else {
        return Fragments::new();
    };
    if items.is_empty() {
        return Fragments::new();
    }
    let default_system = input.args.first().and_then(|arg| arg.as_text());
    let ids: Vec<String> = items
        .iter()
        .map(|item| match item.system.as_deref().or(default_system) {
            Some(system) => format!("{}|{}", system, item.id),
            None => item.id.clone(),
        })
        .collect();
    Fragments::from_iter([Fragment::Raw(ids.join(","))])
}

pub(super) fn unbuild_options(input: UnbuildInput<'_>) -> BoxFuture<'_, MapperResult<DataValue>> {
    async move {
        let options = match input.args.first().and_then(|arg| arg.as_value()) {
            Some(DataValue::Labels(options)) => options.as_slice(),
            Some(_) => {
                return Err(MapperError::invalid_argument(
                    UnbuildMethod::Options,
                    "first argument must be the option list",
                ));
            }
            None => &[],
        };
        let items = split_ids(input.raw)
            .map(|token| {
                let (_, id) = split_system(token);
                options
                    .iter()
                    .find(|option| option.id == id)
                    .cloned()
                    .unwrap_or_else(|| LabelItem::new(id, id))
            })
            .collect();
        Ok(merge_labels(input.existing, items))
    }
    .boxed()
}

pub(super) fn unbuild_codes(input: UnbuildInput<'_>) -> BoxFuture<'_, MapperResult<DataValue>> {
    async move {
        let mut items = Vec::new();
        for token in split_ids(input.raw) {
            let (system, code) = split_system(token);
            let record = input.resolver.resolve_code(system, code).await?;
            let mut item = match record {
                Some(record) => {
                    let item = LabelItem::new(code, record.label);
                    match record.is_leaf {
                        Some(is_leaf) => item.with_leaf(is_leaf),
                        None => item,
                    }
                }
                None => LabelItem::new(code, code),
            };
            if let Some(system) = system {
                item = item.with_system(system);
            }
            items.push(item);
        }
        Ok(merge_labels(input.existing, items))
    }
    .boxed()
}

pub(super) fn unbuild_entities(input: UnbuildInput<'_>) -> BoxFuture<'_, MapperResult<DataValue>> {
    async move {
        let ids: Vec<String> = split_ids(input.raw)
            .map(|token| split_system(token).1.to_string())
            .collect();
        let records = input.resolver.resolve_entities(&ids).await?;
        let items = ids
            .iter()
            .map(|id| match records.iter().find(|record| &record.id == id) {
                Some(record) => LabelItem::new(id.clone(), record.label.clone()),
                None => LabelItem::new(id.clone(), id.clone()),
            })
            .collect();
        Ok(merge_labels(input.existing, items))
    }
    .boxed()
}

pub(super) fn chip_labels(input: &ChipInput<'_>) -> Option<Chip> {
    let items = input.value.as_labels()?;
    if items.is_empty() {
        return None;
    }
    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
    Some(Chip::new(format!("{}: {}", input.label, labels.join(", "))))
}
