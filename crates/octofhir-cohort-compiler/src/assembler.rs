//! Criterion to filter string

use crate::filter::render_fragment;
use octofhir_cohort_catalog::CriterionDefinition;
use octofhir_cohort_mapper::{ArgSpec, BuildInput, FieldScope, MapperRegistry, MapperResult};
use octofhir_cohort_model::{Criterion, DataValue};

/// Assemble the filter string of a criterion
///
/// The definition's default filter comes first, then one or more fragments
/// per keyed field in declaration order. Fields whose build produces nothing
/// are left out.
pub fn assemble_filter(
    definition: &CriterionDefinition,
    criterion: &Criterion,
    deidentified: bool,
    registry: &MapperRegistry,
) -> MapperResult<String> {
    let scope = FieldScope::new(criterion.kind, &criterion.fields, deidentified);
    let mut parts: Vec<String> = Vec::new();
    if !definition.default_filter.is_empty() {
        parts.push(definition.default_filter.clone());
    }

    for (field, fhir_key) in definition.keyed_fields() {
        let value = if field.is_ignored(&scope) {
            &DataValue::Null
        } else {
            criterion.field(&field.name).unwrap_or(&field.default)
        };
        let key = fhir_key.resolve(&scope);
        let args = ArgSpec::resolve_all(field.build_args(), &scope, registry)?;
        let build = registry.build(field.build_method())?;

        let fragments = build(&BuildInput {
            value,
            key: &key,
            deidentified,
            args: &args,
        });
        parts.extend(fragments.iter().map(|fragment| render_fragment(&key, fragment)));
    }

    let filter = parts.join("&");
    log::debug!("Assembled {} filter: {}", criterion.kind, filter);
    Ok(filter)
}
