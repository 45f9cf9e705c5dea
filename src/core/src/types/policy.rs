//! Policy and resource condition types
//!
//! A policy pairs an action with, per related resource type, a list of
//! conditions. The list is a disjunction; each condition is a conjunction of
//! instance paths and attribute restrictions.

use serde::{Deserialize, Deserializer, Serialize};

/// Node id that stands for "this node and everything below it"
pub const ANY_ID: &str = "*";

/// One step of a resource-instance path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathNode {
    /// System owning the resource type
    #[serde(default)]
    pub system_id: String,

    /// Resource type of this node
    #[serde(rename = "type")]
    pub node_type: String,

    /// Resource id, or `*` for any descendant
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,
}

impl PathNode {
    /// Create a new path node
    pub fn new(
        system_id: impl Into<String>,
        node_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            system_id: system_id.into(),
            node_type: node_type.into(),
            id: id.into(),
            name: String::new(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether this node is the `*` wildcard
    pub fn is_any(&self) -> bool {
        self.id == ANY_ID
    }
}

/// A group of instance paths of one resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Resource type name
    #[serde(rename = "type")]
    pub instance_type: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Selected paths, each root-to-leaf
    #[serde(default)]
    pub path: Vec<Vec<PathNode>>,
}

impl Instance {
    pub fn new(instance_type: impl Into<String>, path: Vec<Vec<PathNode>>) -> Self {
        Self {
            instance_type: instance_type.into(),
            name: String::new(),
            path,
        }
    }
}

/// One allowed attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    /// Value id; numeric and boolean ids are normalized to strings
    #[serde(deserialize_with = "scalar_as_string")]
    pub id: String,

    #[serde(default)]
    pub name: String,
}

/// An attribute restriction: the attribute may take any of `values`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

impl Attribute {
    /// Create an attribute restriction from value ids
    pub fn new<I, S>(id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: String::new(),
            values: values
                .into_iter()
                .map(|v| AttributeValue {
                    id: v.into(),
                    name: String::new(),
                })
                .collect(),
        }
    }

    /// Value ids of this attribute
    pub fn value_ids(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.id.as_str())
    }
}

/// Which dimensions a condition restricts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionShape {
    InstancesOnly,
    AttributesOnly,
    Both,
    /// No restriction expressed
    Neither,
}

impl ConditionShape {
    pub fn has_instances(&self) -> bool {
        matches!(self, ConditionShape::InstancesOnly | ConditionShape::Both)
    }

    pub fn has_attributes(&self) -> bool {
        matches!(self, ConditionShape::AttributesOnly | ConditionShape::Both)
    }
}

/// A conjunctive clause over instances and attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub instances: Vec<Instance>,

    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Condition {
    /// Condition restricting instances only
    pub fn with_instances(instances: Vec<Instance>) -> Self {
        Self {
            id: String::new(),
            instances,
            attributes: Vec::new(),
        }
    }

    /// Condition restricting attributes only
    pub fn with_attributes(attributes: Vec<Attribute>) -> Self {
        Self {
            id: String::new(),
            instances: Vec::new(),
            attributes,
        }
    }

    /// Condition restricting both instances and attributes
    pub fn with_both(instances: Vec<Instance>, attributes: Vec<Attribute>) -> Self {
        Self {
            id: String::new(),
            instances,
            attributes,
        }
    }

    /// Classify the condition by the dimensions it restricts
    pub fn shape(&self) -> ConditionShape {
        match (self.instances.is_empty(), self.attributes.is_empty()) {
            (false, true) => ConditionShape::InstancesOnly,
            (true, false) => ConditionShape::AttributesOnly,
            (false, false) => ConditionShape::Both,
            (true, true) => ConditionShape::Neither,
        }
    }

    /// Whether both conditions express the same restriction, ignoring ids
    pub fn same_restriction(&self, other: &Condition) -> bool {
        self.instances == other.instances && self.attributes == other.attributes
    }

    /// All instance paths of this condition
    pub fn paths(&self) -> impl Iterator<Item = &[PathNode]> {
        self.instances
            .iter()
            .flat_map(|i| i.path.iter().map(Vec::as_slice))
    }
}

/// Conditions on one resource type related to an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedResourceType {
    pub system_id: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    /// Disjunction of conditions; empty means unrestricted
    #[serde(default)]
    pub condition: Vec<Condition>,
}

impl RelatedResourceType {
    pub fn new(
        system_id: impl Into<String>,
        resource_type: impl Into<String>,
        condition: Vec<Condition>,
    ) -> Self {
        Self {
            system_id: system_id.into(),
            resource_type: resource_type.into(),
            condition,
        }
    }

    /// Whether this entry describes `(system_id, resource_type)`
    pub fn is(&self, system_id: &str, resource_type: &str) -> bool {
        self.system_id == system_id && self.resource_type == resource_type
    }

    /// Every instance path across all conditions, attributes ignored
    pub fn paths(&self) -> impl Iterator<Item = &[PathNode]> {
        self.condition.iter().flat_map(Condition::paths)
    }
}

/// An action together with its resource conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Action id; stored scopes name this field `id`
    #[serde(alias = "id")]
    pub action_id: String,

    #[serde(default)]
    pub related_resource_types: Vec<RelatedResourceType>,
}

impl Policy {
    /// Create a new policy
    pub fn new(action_id: impl Into<String>, related_resource_types: Vec<RelatedResourceType>) -> Self {
        Self {
            action_id: action_id.into(),
            related_resource_types,
        }
    }

    /// Policy for an action without related resource types
    pub fn unconditional(action_id: impl Into<String>) -> Self {
        Self::new(action_id, Vec::new())
    }

    /// Find the entry for `(system_id, resource_type)`
    pub fn related_resource_type(
        &self,
        system_id: &str,
        resource_type: &str,
    ) -> Option<&RelatedResourceType> {
        self.related_resource_types
            .iter()
            .find(|rrt| rrt.is(system_id, resource_type))
    }

    /// Whether any related resource type carries a condition
    pub fn has_conditions(&self) -> bool {
        self.related_resource_types
            .iter()
            .any(|rrt| !rrt.condition.is_empty())
    }
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!(
            "attribute value id must be a scalar, got {}",
            other
        ))),
    }
}
