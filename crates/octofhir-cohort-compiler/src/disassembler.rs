//! Filter string to criterion fields

use crate::filter::parse_filter;
use indexmap::IndexMap;
use octofhir_cohort_catalog::CriterionDefinition;
use octofhir_cohort_mapper::{ArgSpec, EntityResolver, FieldScope, MapperRegistry, MapperResult, UnbuildInput};
use octofhir_cohort_model::DataValue;

/// Rebuild the field values of a criterion from its filter string
///
/// Starts from the definition's defaults. Each pair is handed to every field
/// whose key matches it, in filter order, so a field split over several pairs
/// accumulates into one value. Unbuilds are awaited one after the other:
/// later fields may read values restored by earlier ones.
pub async fn disassemble_filter(
    definition: &CriterionDefinition,
    filter: &str,
    deidentified: bool,
    registry: &MapperRegistry,
    resolver: &dyn EntityResolver,
) -> MapperResult<IndexMap<String, DataValue>> {
    let mut fields = definition.initial_fields();

    for (raw_key, raw) in parse_filter(filter) {
        for (field, fhir_key) in definition.keyed_fields() {
            let Some(matched) = fhir_key.matches(&raw_key) else {
                continue;
            };
            if field.ignores_raw(&raw) {
                continue;
            }

            let args = {
                let scope = FieldScope::new(definition.kind, &fields, deidentified);
                ArgSpec::resolve_all(field.unbuild_args(), &scope, registry)?
            };
            let unbuild = registry.unbuild(field.unbuild_method())?;
            let existing = fields.get(&field.name).cloned().unwrap_or_default();

            let value = unbuild(UnbuildInput {
                raw: &raw,
                is_deid_key: matched.deid,
                existing: &existing,
                key: &raw_key,
                args: &args,
                resolver,
            })
            .await?;
            fields.insert(field.name.clone(), value);
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_cohort_catalog::Catalog;
    use octofhir_cohort_mapper::NoOpEntityResolver;
    use octofhir_cohort_model::CriterionKind;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_patient_gender() {
        let catalog = Catalog::standard();
        let registry = MapperRegistry::with_standard_mappers();
        let patient = catalog.get(CriterionKind::Patient).unwrap();

        let fields = disassemble_filter(patient, "gender=male", false, &registry, &NoOpEntityResolver)
            .await
            .unwrap();
        assert_eq!(
            fields.get("genders").and_then(DataValue::as_labels).map(|items| items[0].id.as_str()),
            Some("male")
        );
        assert_eq!(fields.get("birthdates"), Some(&DataValue::Null));
    }

    #[tokio::test]
    async fn test_sentinel_values_are_skipped() {
        let catalog = Catalog::standard();
        let registry = MapperRegistry::with_standard_mappers();
        let observation = catalog.get(CriterionKind::Observation).unwrap();

        let fields = disassemble_filter(
            observation,
            "subject.active=true&status=final",
            false,
            &registry,
            &NoOpEntityResolver,
        )
        .await
        .unwrap();
        assert_eq!(fields, observation.initial_fields());
    }
}
