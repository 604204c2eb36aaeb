//! Compiled extraction policy.
//!
//! Built once at startup from [`HarvestConfig`] and shared read-only by the
//! crawler, the extractors and the product checks. Every path expression is
//! compiled here, so a malformed rule stops the run before any file is read.

use std::collections::BTreeMap;

use harvest_config::{ConfigError, HarvestConfig};
use harvest_core::Identifier;

use crate::path::PathExpr;

/// One compiled slot extraction rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub path: PathExpr,
    pub name: Option<String>,
    pub unit_attribute: Option<String>,
}

#[derive(Debug, Clone)]
struct ObjectTypePolicy {
    name: String,
    rules: Vec<Rule>,
}

/// Result of looking a declared relationship type up in the remap table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMapping<'a> {
    /// No table is configured; the declared type is used as is.
    Unconfigured,
    Mapped(&'a str),
    /// A table is configured but has no entry for the declared type.
    Unmapped,
}

/// Settings for the legacy keyword dialect.
#[derive(Debug, Clone)]
pub struct LegacyPolicy {
    pub object_type: String,
    pub lid_prefix: String,
    pub lid_keywords: Vec<String>,
    pub title_keyword: String,
    pub version: String,
    pub reference_keywords: BTreeMap<String, String>,
    pub required_fields: Vec<String>,
    /// Keywords copied into slots so the integrity checker can see them.
    pub slot_keywords: Vec<String>,
}

/// Built-in expressions for modern labels.
#[derive(Debug, Clone)]
pub(crate) struct CorePaths {
    pub(crate) identification_area: PathExpr,
    pub(crate) logical_identifier: PathExpr,
    pub(crate) version_id: PathExpr,
    pub(crate) product_class: PathExpr,
    pub(crate) title: PathExpr,
    pub(crate) references: PathExpr,
    pub(crate) file_objects: PathExpr,
    pub(crate) bundle_type: PathExpr,
    pub(crate) collection_type: PathExpr,
}

impl CorePaths {
    fn compile() -> Result<Self, ConfigError> {
        let path = |expr: &str| {
            PathExpr::parse(expr).map_err(|e| ConfigError::invalid("built-in path", e.to_string()))
        };
        Ok(Self {
            identification_area: path("/*/Identification_Area*")?,
            logical_identifier: path("//Identification_Area*/logical_identifier")?,
            version_id: path("//Identification_Area*/version_id")?,
            product_class: path("//Identification_Area*/product_class")?,
            title: path("//Identification_Area*/title")?,
            references: path("//*Member_Entry | //Internal_Reference | //Source_Product_Internal")?,
            file_objects: path("//File_Area*/File | //Document_File")?,
            bundle_type: path("//Bundle/bundle_type")?,
            collection_type: path("//Collection/collection_type")?,
        })
    }
}

/// The immutable policy every extraction runs against.
#[derive(Debug, Clone)]
pub struct Policy {
    object_types: Vec<ObjectTypePolicy>,
    required_fields: Vec<String>,
    reference_types: Option<BTreeMap<String, String>>,
    non_primary_members: Vec<Identifier>,
    namespaces: BTreeMap<String, String>,
    legacy: LegacyPolicy,
    pub(crate) core: CorePaths,
}

impl Policy {
    /// Compile the policy sections of a loaded configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for malformed rule paths and
    /// malformed non-primary member identifiers.
    pub fn compile(config: &HarvestConfig) -> Result<Self, ConfigError> {
        let policy = &config.policy;

        let mut object_types = Vec::with_capacity(policy.object_types.len());
        for (index, object_type) in policy.object_types.iter().enumerate() {
            let mut rules = Vec::with_capacity(object_type.rules.len());
            for (rule_index, rule) in object_type.rules.iter().enumerate() {
                let path = PathExpr::parse_with(&rule.path, &policy.namespaces).map_err(|e| {
                    ConfigError::invalid(
                        format!("policy.object_types[{index}].rules[{rule_index}].path"),
                        e.to_string(),
                    )
                })?;
                rules.push(Rule {
                    path,
                    name: rule.name.clone(),
                    unit_attribute: rule.unit_attribute.clone(),
                });
            }
            object_types.push(ObjectTypePolicy {
                name: object_type.name.clone(),
                rules,
            });
        }

        let non_primary_members = policy
            .non_primary_members
            .iter()
            .enumerate()
            .map(|(index, token)| {
                Identifier::parse(token).map_err(|e| {
                    ConfigError::invalid(format!("policy.non_primary_members[{index}]"), e.to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let legacy = &config.legacy;
        let mut slot_keywords: Vec<String> = Vec::new();
        for category in &config.integrity.categories {
            if !slot_keywords.contains(&category.identifier) {
                slot_keywords.push(category.identifier.clone());
            }
        }

        Ok(Self {
            object_types,
            required_fields: policy.required_fields.clone(),
            reference_types: (!policy.reference_types.is_empty())
                .then(|| policy.reference_types.clone()),
            non_primary_members,
            namespaces: policy.namespaces.clone(),
            legacy: LegacyPolicy {
                object_type: legacy.object_type.clone(),
                lid_prefix: legacy.lid_prefix.clone(),
                lid_keywords: legacy.lid_keywords.clone(),
                title_keyword: legacy.title_keyword.clone(),
                version: legacy.version.clone(),
                reference_keywords: legacy.reference_keywords.clone(),
                required_fields: legacy.required_fields.clone(),
                slot_keywords,
            },
            core: CorePaths::compile()?,
        })
    }

    /// Whether `object_type` has a policy mapping.
    ///
    /// The legacy object type is always recognized.
    #[must_use]
    pub fn recognizes(&self, object_type: &str) -> bool {
        !object_type.is_empty()
            && (object_type == self.legacy.object_type
                || self.object_types.iter().any(|ot| ot.name == object_type))
    }

    /// Ordered rules for `object_type`; empty when it has none.
    #[must_use]
    pub fn rules_for(&self, object_type: &str) -> &[Rule] {
        self.object_types
            .iter()
            .find(|ot| ot.name == object_type)
            .map(|ot| ot.rules.as_slice())
            .unwrap_or_default()
    }

    /// Core fields a record of `object_type` must carry.
    ///
    /// Legacy records have their own list.
    #[must_use]
    pub fn required_fields(&self, object_type: &str) -> &[String] {
        if object_type == self.legacy.object_type {
            &self.legacy.required_fields
        } else {
            &self.required_fields
        }
    }

    #[must_use]
    pub fn map_reference_type(&self, declared: &str) -> TypeMapping<'_> {
        match &self.reference_types {
            None => TypeMapping::Unconfigured,
            Some(table) => table
                .get(declared)
                .map_or(TypeMapping::Unmapped, |mapped| TypeMapping::Mapped(mapped.as_str())),
        }
    }

    #[must_use]
    pub fn non_primary_members(&self) -> &[Identifier] {
        &self.non_primary_members
    }

    #[must_use]
    pub const fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    #[must_use]
    pub const fn legacy(&self) -> &LegacyPolicy {
        &self.legacy
    }
}
