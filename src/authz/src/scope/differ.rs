//! Containment of resource conditions
//!
//! Decides whether a template (the candidate being granted) is fully
//! permitted by a scope. Conditions inside one list are OR'd, and instances
//! and attributes inside one condition are AND'd, so every template
//! disjunct has to fit into at least one scope disjunct on its own.

use std::collections::{HashMap, HashSet};

use iamscope_core::{Attribute, Condition, ConditionShape, Instance, Policy};

use super::path::{canonicalize, ScopePaths};

/// Every template path must start with some scope path
pub fn instances_contained(template: &[Instance], scope: &[Instance]) -> bool {
    let scope_paths = ScopePaths::from_paths(
        scope
            .iter()
            .flat_map(|i| i.path.iter().map(Vec::as_slice)),
    );

    template
        .iter()
        .flat_map(|i| i.path.iter())
        .all(|path| scope_paths.contains_canonical(&canonicalize(path)))
}

fn attribute_map(attributes: &[Attribute]) -> HashMap<&str, HashSet<&str>> {
    attributes
        .iter()
        .map(|a| (a.id.as_str(), a.value_ids().collect()))
        .collect()
}

/// The template restricts every scope key, each to a subset of the scope's values
pub fn attributes_contained(template: &[Attribute], scope: &[Attribute]) -> bool {
    let template_attrs = attribute_map(template);
    let scope_attrs = attribute_map(scope);

    scope_attrs.iter().all(|(key, scope_values)| {
        template_attrs
            .get(key)
            .is_some_and(|template_values| template_values.is_subset(scope_values))
    })
}

/// Whether one template condition is contained in one scope condition
pub fn condition_contained(template: &Condition, scope: &Condition) -> bool {
    let template_shape = template.shape();

    match scope.shape() {
        ConditionShape::InstancesOnly if template_shape.has_instances() => {
            instances_contained(&template.instances, &scope.instances)
        }
        ConditionShape::AttributesOnly if template_shape.has_attributes() => {
            attributes_contained(&template.attributes, &scope.attributes)
        }
        ConditionShape::Both if template_shape == ConditionShape::Both => {
            instances_contained(&template.instances, &scope.instances)
                && attributes_contained(&template.attributes, &scope.attributes)
        }
        _ => false,
    }
}

/// Whether a disjunction of template conditions is contained in the scope's
pub fn conditions_contained(template: &[Condition], scope: &[Condition]) -> bool {
    // unrestricted scope
    if scope.is_empty() {
        return true;
    }

    // template claims everything while the scope restricts
    if template.is_empty() {
        return false;
    }

    template
        .iter()
        .all(|tc| scope.iter().any(|sc| condition_contained(tc, sc)))
}

/// Whether every related resource type of `template` is contained in `scope`
pub fn policy_contained(template: &Policy, scope: &Policy) -> bool {
    template.related_resource_types.iter().all(|rrt| {
        scope
            .related_resource_type(&rrt.system_id, &rrt.resource_type)
            .is_some_and(|scope_rrt| conditions_contained(&rrt.condition, &scope_rrt.condition))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use iamscope_core::{PathNode, RelatedResourceType};

    fn host_instance(paths: &[&[&str]]) -> Instance {
        Instance::new(
            "host",
            paths
                .iter()
                .map(|ids| ids.iter().map(|id| PathNode::new("cmdb", "host", *id)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_instances_every_path_must_match() {
        let scope = vec![host_instance(&[&["1", "*"], &["7"]])];

        assert!(instances_contained(&[host_instance(&[&["1", "2"], &["7", "8"]])], &scope));
        assert!(!instances_contained(&[host_instance(&[&["1", "2"], &["9"]])], &scope));
        assert!(instances_contained(&[], &scope));
    }

    #[test]
    fn test_attributes_subset() {
        let scope = vec![Attribute::new("color", ["red", "blue"])];

        assert!(attributes_contained(&[Attribute::new("color", ["red"])], &scope));
        assert!(!attributes_contained(&[Attribute::new("color", ["red", "green"])], &scope));
        assert!(!attributes_contained(&[Attribute::new("size", ["xl"])], &scope));
        assert!(!attributes_contained(&[], &scope));
    }

    #[test]
    fn test_attributes_extra_template_keys_allowed() {
        let scope = vec![Attribute::new("color", ["red"])];
        let template = vec![
            Attribute::new("color", ["red"]),
            Attribute::new("size", ["xl"]),
        ];
        assert!(attributes_contained(&template, &scope));
    }

    #[test]
    fn test_condition_shape_mismatch() {
        let instances = Condition::with_instances(vec![host_instance(&[&["1"]])]);
        let attributes = Condition::with_attributes(vec![Attribute::new("os", ["linux"])]);
        let both = Condition::with_both(
            vec![host_instance(&[&["1"]])],
            vec![Attribute::new("os", ["linux"])],
        );
        let neither = Condition::with_instances(vec![]);

        assert!(condition_contained(&instances, &instances));
        assert!(condition_contained(&attributes, &attributes));
        assert!(condition_contained(&both, &both));

        assert!(!condition_contained(&attributes, &instances));
        assert!(!condition_contained(&instances, &attributes));
        assert!(!condition_contained(&instances, &both));
        assert!(!condition_contained(&neither, &instances));
        assert!(!condition_contained(&instances, &neither));
    }

    #[test]
    fn test_template_with_both_fits_single_dimension_scope() {
        let both = Condition::with_both(
            vec![host_instance(&[&["1", "2"]])],
            vec![Attribute::new("os", ["linux"])],
        );
        let scope = Condition::with_instances(vec![host_instance(&[&["1", "*"]])]);

        assert!(condition_contained(&both, &scope));
    }

    #[test]
    fn test_conditions_disjunction() {
        let scope = vec![
            Condition::with_instances(vec![host_instance(&[&["1", "*"]])]),
            Condition::with_attributes(vec![Attribute::new("os", ["linux"])]),
        ];

        let template = vec![
            Condition::with_instances(vec![host_instance(&[&["1", "3"]])]),
            Condition::with_attributes(vec![Attribute::new("os", ["linux"])]),
        ];
        assert!(conditions_contained(&template, &scope));

        let mut widened = template.clone();
        widened.push(Condition::with_attributes(vec![Attribute::new("os", ["windows"])]));
        assert!(!conditions_contained(&widened, &scope));
    }

    #[test]
    fn test_conditions_empty_lists() {
        let restricted = vec![Condition::with_instances(vec![host_instance(&[&["1"]])])];

        assert!(conditions_contained(&[], &[]));
        assert!(conditions_contained(&restricted, &[]));
        assert!(!conditions_contained(&[], &restricted));
    }

    #[test]
    fn test_policy_missing_resource_type() {
        let scope = Policy::new(
            "view_host",
            vec![RelatedResourceType::new("cmdb", "host", vec![])],
        );
        let template = Policy::new(
            "view_host",
            vec![RelatedResourceType::new("cmdb", "module", vec![])],
        );

        assert!(!policy_contained(&template, &scope));
        assert!(policy_contained(&Policy::unconditional("view_host"), &scope));
    }
}
