//! Property and example tests for the containment algorithms
//!
//! Tests cover:
//! - Prefix property of contained policies
//! - Attribute subset property
//! - Monotonicity under scope widening
//! - Documented examples

use super::*;
use iamscope_core::{Attribute, Condition, Instance, PathNode, Policy, RelatedResourceType};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn node_strategy(allow_any: bool) -> impl Strategy<Value = PathNode> {
    let ids: Vec<&'static str> = if allow_any {
        vec!["1", "2", "3", "*"]
    } else {
        vec!["1", "2", "3"]
    };
    (prop::sample::select(vec!["biz", "set"]), prop::sample::select(ids))
        .prop_map(|(ty, id)| PathNode::new("cmdb", ty, id))
}

fn path_strategy(allow_any: bool) -> impl Strategy<Value = Vec<PathNode>> {
    prop::collection::vec(node_strategy(false), 0..3).prop_flat_map(move |head| {
        node_strategy(allow_any).prop_map(move |last| {
            let mut path = head.clone();
            path.push(last);
            path
        })
    })
}

fn instance_condition(paths: Vec<Vec<PathNode>>) -> Condition {
    Condition::with_instances(vec![Instance::new("host", paths)])
}

fn host_policy(conditions: Vec<Condition>) -> Policy {
    Policy::new(
        "view_host",
        vec![RelatedResourceType::new("cmdb", "host", conditions)],
    )
}

fn value_set() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(vec!["red", "green", "blue", "black"], 0..=4)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_contained_paths_start_with_scope_prefix(
        scope_paths in prop::collection::vec(path_strategy(true), 1..4),
        template_paths in prop::collection::vec(path_strategy(false), 1..4),
    ) {
        let scope = host_policy(vec![instance_condition(scope_paths.clone())]);
        let template = host_policy(vec![instance_condition(template_paths.clone())]);

        if policy_contained(&template, &scope) {
            let prefixes: Vec<String> = scope_paths.iter().map(|p| scope_prefix(p)).collect();
            for path in &template_paths {
                let canonical = canonicalize(path);
                prop_assert!(prefixes.iter().any(|p| canonical.starts_with(p.as_str())));
            }
        }
    }

    #[test]
    fn prop_contained_attributes_are_subsets(
        scope_values in value_set(),
        template_values in value_set(),
        template_has_key in any::<bool>(),
    ) {
        let scope = vec![Attribute::new("color", scope_values.clone())];
        let template = if template_has_key {
            vec![Attribute::new("color", template_values.clone())]
        } else {
            vec![Attribute::new("size", template_values.clone())]
        };

        if attributes_contained(&template, &scope) {
            prop_assert!(template_has_key);
            prop_assert!(template_values.iter().all(|v| scope_values.contains(v)));
        }
    }

    #[test]
    fn prop_widening_scope_conditions_is_monotone(
        scope_paths in prop::collection::vec(path_strategy(true), 1..3),
        extra_paths in prop::collection::vec(path_strategy(true), 1..3),
        template_paths in prop::collection::vec(path_strategy(false), 1..3),
    ) {
        let narrow = host_policy(vec![instance_condition(scope_paths.clone())]);

        let mut widened_paths = scope_paths.clone();
        widened_paths.extend(extra_paths.clone());
        let widened_paths_scope = host_policy(vec![instance_condition(widened_paths)]);
        let widened_disjunction = host_policy(vec![
            instance_condition(scope_paths),
            instance_condition(extra_paths),
        ]);

        let template = host_policy(vec![instance_condition(template_paths)]);

        if policy_contained(&template, &narrow) {
            prop_assert!(policy_contained(&template, &widened_paths_scope));
            prop_assert!(policy_contained(&template, &widened_disjunction));
        }
    }

    #[test]
    fn prop_widening_attribute_values_is_monotone(
        scope_values in value_set(),
        extra_values in value_set(),
        template_values in value_set(),
    ) {
        let narrow = vec![Attribute::new("color", scope_values.clone())];
        let mut all_values = scope_values;
        all_values.extend(extra_values);
        let wide = vec![Attribute::new("color", all_values)];
        let template = vec![Attribute::new("color", template_values)];

        if attributes_contained(&template, &narrow) {
            prop_assert!(attributes_contained(&template, &wide));
        }
    }
}

// ============================================================================
// Documented examples
// ============================================================================

#[test]
fn test_wildcard_scope_example() {
    let scope = ScopePaths::from_paths([vec![
        PathNode::new("sys", "type", "1"),
        PathNode::new("sys", "type", "*"),
    ]
    .as_slice()]);

    let descendant = vec![
        PathNode::new("sys", "type", "1").with_name("name"),
        PathNode::new("sys", "type", "2").with_name("child"),
    ];
    let other = vec![PathNode::new("sys", "type", "9").with_name("other")];

    assert!(contains(&descendant, &scope));
    assert!(!contains(&other, &scope));
}

#[test]
fn test_color_attribute_example() {
    let scope = vec![Attribute::new("color", ["red", "blue"])];

    assert!(attributes_contained(&[Attribute::new("color", ["red"])], &scope));
    assert!(!attributes_contained(&[Attribute::new("color", ["red", "green"])], &scope));
    assert!(!attributes_contained(&[], &scope));
}

#[test]
fn test_both_shape_requires_both_checks() {
    let scope = host_policy(vec![Condition::with_both(
        vec![Instance::new("host", vec![vec![PathNode::new("cmdb", "biz", "1")]])],
        vec![Attribute::new("os", ["linux"])],
    )]);

    let inside = host_policy(vec![Condition::with_both(
        vec![Instance::new(
            "host",
            vec![vec![PathNode::new("cmdb", "biz", "1"), PathNode::new("cmdb", "host", "3")]],
        )],
        vec![Attribute::new("os", ["linux"])],
    )]);
    let wrong_attribute = host_policy(vec![Condition::with_both(
        vec![Instance::new("host", vec![vec![PathNode::new("cmdb", "biz", "1")]])],
        vec![Attribute::new("os", ["windows"])],
    )]);

    assert!(policy_contained(&inside, &scope));
    assert!(!policy_contained(&wrong_attribute, &scope));
}
