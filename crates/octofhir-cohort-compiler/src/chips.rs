//! Criterion summaries and validation

use crate::error::QueryResult;
use crate::request::QueryCompiler;
use octofhir_cohort_mapper::{ArgSpec, Chip, ChipInput, FieldScope};
use octofhir_cohort_model::Criterion;

impl QueryCompiler {
    /// One chip per displayed, non-empty field
    pub fn criterion_chips(&self, criterion: &Criterion, deidentified: bool) -> QueryResult<Vec<Chip>> {
        let definition = self.definition(criterion.kind)?;
        let scope = FieldScope::new(criterion.kind, &criterion.fields, deidentified);

        let mut chips = Vec::new();
        for field in definition.fields() {
            let Some(value) = criterion.field(&field.name) else {
                continue;
            };
            if value.is_empty() || !field.is_displayed(&scope) || field.is_ignored(&scope) {
                continue;
            }
            let args = ArgSpec::resolve_all(field.chip_args(), &scope, &self.registry)?;
            let chip = self.registry.chip(field.chip_method())?;
            if let Some(chip) = chip(&ChipInput {
                value,
                label: &field.label,
                deidentified,
                args: &args,
                registry: &self.registry,
            }) {
                chips.push(chip);
            }
        }
        Ok(chips)
    }

    /// Messages of the catalog error checks that hold for a criterion
    pub fn validate_criterion(&self, criterion: &Criterion, deidentified: bool) -> QueryResult<Vec<String>> {
        Ok(self.definition(criterion.kind)?.validate(criterion, deidentified))
    }
}
