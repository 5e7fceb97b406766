//! Mappers parameterized by other mappers

use crate::args::ResolvedArg;
use crate::registry::{BuildInput, Chip, ChipInput, Fragments};

/// Args `[Build(inner), Value(gate), rest...]`; runs `inner` with `rest` only
/// when the gate is truthy.
pub(super) fn build_gated(input: &BuildInput<'_>) -> Fragments {
    let [ResolvedArg::Build(inner), ResolvedArg::Value(gate), rest @ ..] = input.args else {
        log::warn!("Gated build for {} called without [method, gate] arguments", input.key.name());
        return Fragments::new();
    };
    if !gate.is_truthy() {
        return Fragments::new();
    }
    inner(&BuildInput { args: rest, ..*input })
}

/// Args `[ChipMethod(m), Value(selector), Value(expected), Value(label), Value(other)]`;
/// renders with chip `m` under `label` when selector equals expected, `other`
/// otherwise.
pub(super) fn chip_switch(input: &ChipInput<'_>) -> Option<Chip> {
    let [
        ResolvedArg::ChipMethod(method),
        ResolvedArg::Value(selector),
        ResolvedArg::Value(expected),
        ResolvedArg::Value(label),
        ResolvedArg::Value(other),
        rest @ ..,
    ] = input.args
    else {
        log::warn!("Switch chip called with malformed arguments: {:?}", input.args);
        return None;
    };
    let chosen = if selector == expected { label } else { other };
    let chip = input.registry.chip(*method).ok()?;
    chip(&ChipInput {
        label: chosen.as_text().unwrap_or(input.label),
        args: rest,
        ..*input
    })
}
