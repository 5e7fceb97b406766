//! Checkboxes
//!
//! A checked box emits `true`, or the text literal given as first argument
//! (e.g. `status=final`). An unchecked box emits nothing.

use crate::error::MapperResult;
use crate::registry::{BuildInput, Chip, ChipInput, Fragment, Fragments, UnbuildInput};
use futures::FutureExt;
use futures::future::BoxFuture;
use octofhir_cohort_model::DataValue;

const TRUE_VALUE: &str = "true";

pub(super) fn build_boolean(input: &BuildInput<'_>) -> Fragments {
    if !matches!(input.value, DataValue::Boolean(true)) {
        return Fragments::new();
    }
    let raw = input.args.first().and_then(|arg| arg.as_text()).unwrap_or(TRUE_VALUE);
    Fragments::from_iter([Fragment::raw(raw)])
}

pub(super) fn unbuild_boolean(input: UnbuildInput<'_>) -> BoxFuture<'_, MapperResult<DataValue>> {
    async move {
        let expected = input.args.first().and_then(|arg| arg.as_text()).unwrap_or(TRUE_VALUE);
        Ok(DataValue::Boolean(input.raw == expected))
    }
    .boxed()
}

pub(super) fn chip_boolean(input: &ChipInput<'_>) -> Option<Chip> {
    matches!(input.value, DataValue::Boolean(true)).then(|| Chip::new(input.label))
}
