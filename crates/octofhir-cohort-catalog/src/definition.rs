//! Criterion definitions: the schema of one criterion kind

use crate::predicate::Predicate;
use indexmap::IndexMap;
use octofhir_cohort_mapper::{
    ArgSpec, BuildMethod, ChipMethod, FhirKey, FieldKind, FieldScope, UnbuildMethod,
};
use octofhir_cohort_model::{
    Comparator, Criterion, CriterionId, CriterionKind, DataValue, LabelItem, OCCURRENCE_FIELD,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Build info
// ============================================================================

/// How a field maps to the filter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Fields without a key are not part of the filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<FhirKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unbuild: Option<UnbuildMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip: Option<ChipMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_args: Vec<ArgSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unbuild_args: Vec<ArgSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chip_args: Vec<ArgSpec>,
    /// Forces the value to `Null` before building
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_if: Option<Predicate>,
    /// Raw values never unbuilt into this field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unbuild_ignore: Vec<String>,
}

// ============================================================================
// Fields
// ============================================================================

/// One field of a criterion form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub default: DataValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<LabelItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_info: Option<BuildInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_condition: Option<Predicate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_condition: Option<Predicate>,
}

impl FieldDefinition {
    /// Create a new field definition
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            default: DataValue::Null,
            options: Vec::new(),
            build_info: None,
            display_condition: None,
            disable_condition: None,
        }
    }

    /// Create a select field; options are also handed to the unbuild mapper
    pub fn select<I, S>(name: impl Into<String>, label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let options: Vec<LabelItem> = options
            .into_iter()
            .map(|(id, label)| LabelItem::new(id, label))
            .collect();
        let mut field = Self::new(name, label, FieldKind::Select);
        field.build_info_mut().unbuild_args = vec![ArgSpec::Literal(DataValue::Labels(options.clone()))];
        field.options = options;
        field
    }

    /// The occurrence field shared by occurrence-bearing kinds
    pub fn occurrence() -> Self {
        Self::new(OCCURRENCE_FIELD, "Occurrences", FieldKind::Number)
            .with_default(DataValue::comparison(Comparator::GreaterOrEqual, 1))
    }

    fn build_info_mut(&mut self) -> &mut BuildInfo {
        self.build_info.get_or_insert_with(BuildInfo::default)
    }

    pub fn with_key(mut self, key: FhirKey) -> Self {
        self.build_info_mut().key = Some(key);
        self
    }

    pub fn with_default(mut self, default: impl Into<DataValue>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_build(mut self, method: BuildMethod, args: Vec<ArgSpec>) -> Self {
        let info = self.build_info_mut();
        info.build = Some(method);
        info.build_args = args;
        self
    }

    pub fn with_unbuild(mut self, method: UnbuildMethod, args: Vec<ArgSpec>) -> Self {
        let info = self.build_info_mut();
        info.unbuild = Some(method);
        info.unbuild_args = args;
        self
    }

    /// Arguments for the default build method
    pub fn with_build_args(mut self, args: Vec<ArgSpec>) -> Self {
        self.build_info_mut().build_args = args;
        self
    }

    /// Arguments for the default unbuild method
    pub fn with_unbuild_args(mut self, args: Vec<ArgSpec>) -> Self {
        self.build_info_mut().unbuild_args = args;
        self
    }

    pub fn with_chip(mut self, method: ChipMethod, args: Vec<ArgSpec>) -> Self {
        let info = self.build_info_mut();
        info.chip = Some(method);
        info.chip_args = args;
        self
    }

    pub fn ignore_if(mut self, predicate: Predicate) -> Self {
        self.build_info_mut().ignore_if = Some(predicate);
        self
    }

    pub fn unbuild_ignore<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_info_mut().unbuild_ignore = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn display_if(mut self, predicate: Predicate) -> Self {
        self.display_condition = Some(predicate);
        self
    }

    pub fn disable_if(mut self, predicate: Predicate) -> Self {
        self.disable_condition = Some(predicate);
        self
    }

    /// Wire key, when the field is part of the filter
    pub fn key(&self) -> Option<&FhirKey> {
        self.build_info.as_ref().and_then(|info| info.key.as_ref())
    }

    pub fn build_method(&self) -> BuildMethod {
        self.build_info
            .as_ref()
            .and_then(|info| info.build)
            .unwrap_or(self.kind.default_methods().0)
    }

    pub fn unbuild_method(&self) -> UnbuildMethod {
        self.build_info
            .as_ref()
            .and_then(|info| info.unbuild)
            .unwrap_or(self.kind.default_methods().1)
    }

    pub fn chip_method(&self) -> ChipMethod {
        self.build_info
            .as_ref()
            .and_then(|info| info.chip)
            .unwrap_or(self.kind.default_methods().2)
    }

    pub fn build_args(&self) -> &[ArgSpec] {
        self.build_info.as_ref().map(|info| info.build_args.as_slice()).unwrap_or_default()
    }

    pub fn unbuild_args(&self) -> &[ArgSpec] {
        self.build_info.as_ref().map(|info| info.unbuild_args.as_slice()).unwrap_or_default()
    }

    pub fn chip_args(&self) -> &[ArgSpec] {
        self.build_info.as_ref().map(|info| info.chip_args.as_slice()).unwrap_or_default()
    }

    /// Whether the value must be dropped before building
    pub fn is_ignored(&self, scope: &FieldScope<'_>) -> bool {
        self.build_info
            .as_ref()
            .and_then(|info| info.ignore_if.as_ref())
            .is_some_and(|predicate| predicate.eval(scope))
    }

    /// Whether a raw value is an unbuild sentinel of this field
    pub fn ignores_raw(&self, raw: &str) -> bool {
        self.build_info
            .as_ref()
            .is_some_and(|info| info.unbuild_ignore.iter().any(|value| value == raw))
    }

    pub fn is_displayed(&self, scope: &FieldScope<'_>) -> bool {
        self.display_condition
            .as_ref()
            .is_none_or(|predicate| predicate.eval(scope))
    }

    pub fn is_disabled(&self, scope: &FieldScope<'_>) -> bool {
        self.disable_condition
            .as_ref()
            .is_some_and(|predicate| predicate.eval(scope))
    }
}

/// Titled group of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSection {
    pub title: String,
    pub fields: Vec<FieldDefinition>,
}

impl FieldSection {
    pub fn new(title: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }
}

// ============================================================================
// Criterion definition
// ============================================================================

/// Distinguishes entries sharing a resource type, by a pair found in the filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtypeDiscriminator {
    pub key: String,
    pub value: String,
}

impl SubtypeDiscriminator {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether a filter contains the discriminating `key=value` pair
    pub fn matches_filter(&self, filter: &str) -> bool {
        filter
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == self.key && value.split(',').any(|v| v == self.value))
    }
}

/// Validation rule reported when its predicate holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCheck {
    pub when: Predicate,
    pub message: String,
}

impl ErrorCheck {
    pub fn new(when: Predicate, message: impl Into<String>) -> Self {
        Self {
            when,
            message: message.into(),
        }
    }
}

/// Catalog entry of one criterion kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionDefinition {
    pub kind: CriterionKind,
    pub title: String,
    /// Static fragments every filter of this kind starts with
    #[serde(default)]
    pub default_filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<SubtypeDiscriminator>,
    pub sections: Vec<FieldSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_checks: Vec<ErrorCheck>,
}

impl CriterionDefinition {
    /// Create a new definition
    pub fn new(kind: CriterionKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            default_filter: String::new(),
            subtype: None,
            sections: Vec::new(),
            error_checks: Vec::new(),
        }
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_subtype(mut self, subtype: SubtypeDiscriminator) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn with_section(mut self, title: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        self.sections.push(FieldSection::new(title, fields));
        self
    }

    pub fn with_error_check(mut self, check: ErrorCheck) -> Self {
        self.error_checks.push(check);
        self
    }

    /// Resource type sent to the query engine
    pub fn resource_type(&self) -> &'static str {
        self.kind.resource_type()
    }

    /// Every field, in section order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    /// Fields that take part in the filter
    pub fn keyed_fields(&self) -> impl Iterator<Item = (&FieldDefinition, &FhirKey)> {
        self.fields().filter_map(|field| field.key().map(|key| (field, key)))
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields().find(|field| field.name == name)
    }

    /// Default value of every field
    pub fn initial_fields(&self) -> IndexMap<String, DataValue> {
        self.fields()
            .map(|field| (field.name.clone(), field.default.clone()))
            .collect()
    }

    /// A fresh criterion of this kind
    pub fn new_criterion(&self, id: CriterionId) -> Criterion {
        Criterion {
            fields: self.initial_fields(),
            ..Criterion::new(id, self.kind, self.title.clone())
        }
    }

    /// Messages of every error check that holds for the criterion
    pub fn validate(&self, criterion: &Criterion, deidentified: bool) -> Vec<String> {
        let scope = FieldScope::new(criterion.kind, &criterion.fields, deidentified);
        self.error_checks
            .iter()
            .filter(|check| check.when.eval(&scope))
            .map(|check| check.message.clone())
            .collect()
    }
}
