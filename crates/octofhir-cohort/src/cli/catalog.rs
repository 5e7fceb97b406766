//! Catalog command implementation

use super::output;
use anyhow::Result;
use colored::Colorize;
use octofhir_cohort_catalog::{Catalog, RegistryGap};
use octofhir_cohort_mapper::{FhirKey, MapperRegistry};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Configuration for catalog command
pub struct CatalogConfig {
    /// Print the definitions as JSON instead of a listing
    pub json: bool,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

fn describe_key(key: &FhirKey) -> String {
    match key {
        FhirKey::Plain(key) => key.clone(),
        FhirKey::Question { id, answer_type } => format!("question {} ({})", id, answer_type.value_suffix()),
        FhirKey::Deid { main, deid } => format!("{} | deid {}", main, deid),
        FhirKey::Conditional { main, alt, .. } => format!("{} | {}", main, alt),
    }
}

/// Listing of every catalog entry and its keyed fields
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut listing = String::new();
    for definition in catalog.get_all_criteria_items() {
        let _ = writeln!(
            listing,
            "{} {} ({})",
            definition.kind.as_str().bold(),
            definition.title,
            definition.resource_type()
        );
        if !definition.default_filter.is_empty() {
            let _ = writeln!(listing, "    default: {}", definition.default_filter);
        }
        for (field, key) in definition.keyed_fields() {
            let _ = writeln!(listing, "    {:<24} {}", field.name, describe_key(key).cyan());
        }
    }
    listing.trim_end().to_string()
}

/// Describe a registry gap
pub fn format_gap(gap: &RegistryGap) -> String {
    format!("{}.{}: {}", gap.kind, gap.field, gap.error)
}

/// List the standard catalog
pub async fn catalog(config: CatalogConfig) -> Result<()> {
    let catalog = Catalog::standard();
    let registry = MapperRegistry::with_standard_mappers();
    for gap in catalog.check_registry(&registry) {
        eprintln!("{}", output::format_warning(&format_gap(&gap)));
    }

    let content = if config.json {
        output::format_json(catalog.get_all_criteria_items(), config.pretty)?
    } else {
        render_catalog(&catalog)
    };
    output::write_output(&content, config.output_file.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_cohort_mapper::AnswerType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_key() {
        assert_eq!(describe_key(&FhirKey::plain("gender")), "gender");
        assert_eq!(describe_key(&FhirKey::deid("age-day", "age-month")), "age-day | deid age-month");
        assert_eq!(
            describe_key(&FhirKey::question("F_MATER_009", AnswerType::Integer)),
            "question F_MATER_009 (Integer)"
        );
    }

    #[test]
    fn test_render_standard_catalog() {
        colored::control::set_override(false);
        let listing = render_catalog(&Catalog::standard());
        assert!(listing.contains("Patient"));
        assert!(listing.contains("gender"));
    }
}
