//! Plan, import and metadata types exchanged with the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{BlockNestingMode, Block, Schema};

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Dotted path to the attribute.
    pub path: String,
    /// The value before the change, `None` when creating.
    pub before: Option<Value>,
    /// The value after the change, `None` when deleting.
    pub after: Option<Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// A change for a removed attribute.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// A change for a modified attribute.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation.
    pub planned_state: Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource requires replacement.
    pub requires_replace: bool,
}

impl PlanResult {
    /// A plan with no changes.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// A plan with changes.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Plan the move from `prior` to `proposed` under `schema`.
    ///
    /// Attributes missing from `proposed` take their prior value when they
    /// are computed, then their schema default. Single nested blocks are
    /// planned recursively. A changed `force_new` attribute of an existing
    /// resource sets `requires_replace`. A null `proposed` plans a deletion.
    pub fn compute(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> Self {
        let prior_obj = prior.and_then(Value::as_object);

        if proposed.is_null() {
            let changes = prior_obj
                .map(|obj| {
                    obj.iter()
                        .filter(|(_, v)| !v.is_null())
                        .map(|(k, v)| AttributeChange::removed(k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default();
            return Self::with_changes(Value::Null, changes, false);
        }

        let proposed_obj = proposed.as_object().cloned().unwrap_or_default();
        let planned = plan_block(&schema.block, prior_obj, proposed_obj);

        let mut changes = Vec::new();
        let mut requires_replace = false;
        diff_block(
            &schema.block,
            prior_obj,
            &planned,
            "",
            &mut changes,
            &mut requires_replace,
        );

        Self::with_changes(
            Value::Object(planned),
            changes,
            prior_obj.is_some() && requires_replace,
        )
    }
}

fn present<'a>(obj: Option<&'a Map<String, Value>>, name: &str) -> Option<&'a Value> {
    obj.and_then(|o| o.get(name)).filter(|v| !v.is_null())
}

fn plan_block(
    block: &Block,
    prior: Option<&Map<String, Value>>,
    mut proposed: Map<String, Value>,
) -> Map<String, Value> {
    for (name, attr) in &block.attributes {
        if present(Some(&proposed), name).is_some() {
            continue;
        }
        let fallback = if attr.flags.computed {
            present(prior, name).cloned().or_else(|| attr.default.clone())
        } else {
            attr.default.clone()
        };
        if let Some(value) = fallback {
            proposed.insert(name.clone(), value);
        }
    }

    for (name, nested) in &block.blocks {
        if nested.computed {
            if present(Some(&proposed), name).is_none() {
                if let Some(value) = present(prior, name) {
                    proposed.insert(name.clone(), value.clone());
                }
            }
            continue;
        }
        if nested.nesting_mode != BlockNestingMode::Single {
            continue;
        }
        let inner = proposed
            .get(name)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let inner_prior = present(prior, name).and_then(Value::as_object);
        proposed.insert(
            name.clone(),
            Value::Object(plan_block(&nested.block, inner_prior, inner)),
        );
    }

    proposed
}

fn diff_block(
    block: &Block,
    prior: Option<&Map<String, Value>>,
    planned: &Map<String, Value>,
    prefix: &str,
    changes: &mut Vec<AttributeChange>,
    requires_replace: &mut bool,
) {
    let path = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        }
    };

    for (name, attr) in &block.attributes {
        let before = present(prior, name);
        let after = present(Some(planned), name);
        if before == after {
            continue;
        }
        if attr.force_new {
            *requires_replace = true;
        }
        changes.push(AttributeChange::new(path(name), before.cloned(), after.cloned()));
    }

    for (name, nested) in &block.blocks {
        match (nested.nesting_mode, present(Some(planned), name)) {
            (BlockNestingMode::Single, Some(Value::Object(inner))) if !nested.computed => {
                let inner_prior = present(prior, name).and_then(Value::as_object);
                diff_block(
                    &nested.block,
                    inner_prior,
                    inner,
                    &path(name),
                    changes,
                    requires_replace,
                );
            }
            (_, after) => {
                let before = present(prior, name);
                if before != after {
                    changes.push(AttributeChange::new(path(name), before.cloned(), after.cloned()));
                }
            }
        }
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));
}

/// A resource returned by import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Names of the resource and data source types a provider serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Resource type names, sorted.
    pub resources: Vec<String>,
    /// Data source type names, sorted.
    pub data_sources: Vec<String>,
}
