//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining resource and data source
//! schemas, plus the validation and plan-modification passes that walk a value
//! against its schema.

use crate::types::{AttributePath, Diagnostics, Dynamic};
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

/// Schema is returned by providers/resources/data sources
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("validators", &self.validators.len())
            .field("plan_modifiers", &self.plan_modifiers.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Single,
    List,
}

/// Validator checks a configured attribute value
pub trait Validator: Send + Sync {
    fn description(&self) -> String;
    /// Called only for known, non-null values
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Diagnostics);
}

/// Values a plan modifier sees for one attribute
pub struct PlanModifierRequest<'a> {
    pub config_value: &'a Dynamic,
    pub state_value: &'a Dynamic,
    pub path: &'a AttributePath,
}

pub struct PlanModifierResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
}

/// PlanModifier adjusts the planned value of one attribute
pub trait PlanModifier: Send + Sync {
    fn description(&self) -> String;
    fn modify(&self, request: PlanModifierRequest<'_>, response: &mut PlanModifierResponse);
}

/// Outcome of running plan modifiers over a whole planned value
#[derive(Debug, Default)]
pub struct PlanModification {
    pub requires_replace: Vec<AttributePath>,
}

impl Schema {
    /// Checks required attributes and runs every attribute validator against `config`
    pub fn validate(&self, config: &Dynamic) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.block
            .validate_value(config, &AttributePath::root(), &mut diagnostics);
        diagnostics
    }

    /// Runs plan modifiers, rewriting `plan` in place
    pub fn modify_plan(&self, config: &Dynamic, state: &Dynamic, plan: &mut Dynamic) -> PlanModification {
        let mut outcome = PlanModification::default();
        self.block
            .modify_value(config, state, plan, &AttributePath::root(), &mut outcome);
        outcome
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, name: &str) -> Option<&NestedBlock> {
        self.block.block_types.iter().find(|b| b.type_name == name)
    }
}

fn child<'a>(value: &'a Dynamic, name: &str) -> &'a Dynamic {
    match value {
        Dynamic::Map(m) => m.get(name).unwrap_or(&Dynamic::Null),
        _ => &Dynamic::Null,
    }
}

fn child_path(parent: &AttributePath, name: &str) -> AttributePath {
    parent.clone().attribute(name)
}

impl Block {
    fn validate_value(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Diagnostics) {
        for attr in &self.attributes {
            let attr_path = child_path(path, &attr.name);
            match child(value, &attr.name) {
                Dynamic::Null if attr.required => diagnostics.push(
                    crate::types::Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required", attr_path),
                    )
                    .with_attribute(attr_path),
                ),
                Dynamic::Null | Dynamic::Unknown => {}
                v => {
                    for validator in &attr.validators {
                        validator.validate(v, &attr_path, diagnostics);
                    }
                }
            }
        }

        for nested in &self.block_types {
            let nested_path = child_path(path, &nested.type_name);
            match (nested.nesting, child(value, &nested.type_name)) {
                (NestingMode::Single, v @ Dynamic::Map(_)) => {
                    nested.block.validate_value(v, &nested_path, diagnostics)
                }
                (NestingMode::List, Dynamic::List(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        nested
                            .block
                            .validate_value(item, &nested_path.clone().index(i as i64), diagnostics);
                    }
                }
                _ => {}
            }
        }
    }

    fn modify_value(
        &self,
        config: &Dynamic,
        state: &Dynamic,
        plan: &mut Dynamic,
        path: &AttributePath,
        outcome: &mut PlanModification,
    ) {
        let Dynamic::Map(plan_map) = plan else {
            return;
        };

        for attr in self.attributes.iter().filter(|a| !a.plan_modifiers.is_empty()) {
            let attr_path = child_path(path, &attr.name);
            let mut response = PlanModifierResponse {
                plan_value: plan_map.get(&attr.name).cloned().unwrap_or(Dynamic::Null),
                requires_replace: false,
            };
            for modifier in &attr.plan_modifiers {
                modifier.modify(
                    PlanModifierRequest {
                        config_value: child(config, &attr.name),
                        state_value: child(state, &attr.name),
                        path: &attr_path,
                    },
                    &mut response,
                );
            }
            if response.requires_replace {
                outcome.requires_replace.push(attr_path);
            }
            plan_map.insert(attr.name.clone(), response.plan_value);
        }

        for nested in &self.block_types {
            if nested.nesting != NestingMode::Single {
                continue;
            }
            if let Some(nested_plan) = plan_map.get_mut(&nested.type_name) {
                nested.block.modify_value(
                    child(config, &nested.type_name),
                    child(state, &nested.type_name),
                    nested_plan,
                    &child_path(path, &nested.type_name),
                    outcome,
                );
            }
        }
    }
}

/// AttributeBuilder provides fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Arc::new(validator));
        self
    }

    pub fn plan_modifier(mut self, modifier: impl PlanModifier + 'static) -> Self {
        self.attribute.plan_modifiers.push(Arc::new(modifier));
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block {
                    attributes: Vec::new(),
                    block_types: Vec::new(),
                    description: String::new(),
                },
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    /// Adds a nested block built from another schema's root block
    pub fn block(mut self, type_name: &str, nesting: NestingMode, inner: Schema) -> Self {
        self.schema.block.block_types.push(NestedBlock {
            type_name: type_name.to_string(),
            block: inner.block,
            nesting,
        });
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
