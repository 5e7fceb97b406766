//! Standard mapper implementations

mod boolean;
mod comparison;
mod date;
mod duration;
mod higher_order;
mod labels;
mod text;

use crate::registry::{BuildMethod, ChipMethod, MapperRegistry, UnbuildMethod};
use rust_decimal::Decimal;
use std::sync::Arc;

pub use comparison::parse_prefixed;
pub use date::FILTER_KEY;

/// Register every standard mapper
pub(crate) fn register_standard_mappers(registry: &mut MapperRegistry) {
    registry.register_build(BuildMethod::Text, Arc::new(text::build_text));
    registry.register_build(BuildMethod::List, Arc::new(text::build_list));
    registry.register_build(BuildMethod::Boolean, Arc::new(boolean::build_boolean));
    registry.register_build(BuildMethod::Comparator, Arc::new(comparison::build_comparator));
    registry.register_build(BuildMethod::DateRange, Arc::new(date::build_date_range));
    registry.register_build(BuildMethod::DurationRange, Arc::new(duration::build_duration_range));
    registry.register_build(BuildMethod::Labels, Arc::new(labels::build_labels));
    registry.register_build(BuildMethod::Gated, Arc::new(higher_order::build_gated));

    registry.register_unbuild(UnbuildMethod::Text, Arc::new(text::unbuild_text));
    registry.register_unbuild(UnbuildMethod::List, Arc::new(text::unbuild_list));
    registry.register_unbuild(UnbuildMethod::Boolean, Arc::new(boolean::unbuild_boolean));
    registry.register_unbuild(UnbuildMethod::Comparator, Arc::new(comparison::unbuild_comparator));
    registry.register_unbuild(UnbuildMethod::DateRange, Arc::new(date::unbuild_date_range));
    registry.register_unbuild(
        UnbuildMethod::DurationRange,
        Arc::new(duration::unbuild_duration_range),
    );
    registry.register_unbuild(UnbuildMethod::Options, Arc::new(labels::unbuild_options));
    registry.register_unbuild(UnbuildMethod::Codes, Arc::new(labels::unbuild_codes));
    registry.register_unbuild(UnbuildMethod::Entities, Arc::new(labels::unbuild_entities));

    registry.register_chip(ChipMethod::Text, Arc::new(text::chip_text));
    registry.register_chip(ChipMethod::Boolean, Arc::new(boolean::chip_boolean));
    registry.register_chip(ChipMethod::Comparator, Arc::new(comparison::chip_comparator));
    registry.register_chip(ChipMethod::DateRange, Arc::new(date::chip_date_range));
    registry.register_chip(ChipMethod::DurationRange, Arc::new(duration::chip_duration_range));
    registry.register_chip(ChipMethod::Labels, Arc::new(labels::chip_labels));
    registry.register_chip(ChipMethod::Switch, Arc::new(higher_order::chip_switch));
}

/// Decimal without trailing zeros (`2.50` -> `2.5`, `3.0` -> `3`)
pub(crate) fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}
