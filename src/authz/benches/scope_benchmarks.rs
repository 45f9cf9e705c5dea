//! Benchmarks for scope containment
//!
//! Measures performance of:
//! - Path canonicalization and prefix matching
//! - Policy containment against wide scopes
//! - Path trimming
//! - Batched subject checks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use iamscope_authz::scope::{canonicalize, contains, policy_contained, ScopePaths};
use iamscope_authz::{AuthScopeChecker, InMemoryOrganization, SubjectScopeChecker, ViolationMode};
use iamscope_core::{
    AuthScopeSystem, Condition, Department, Instance, PathNode, Policy, RelatedResourceType, Role,
    RoleType, Subject,
};
use std::sync::Arc;
use std::time::Duration;

fn host_path(biz: usize, host: usize) -> Vec<PathNode> {
    vec![
        PathNode::new("cmdb", "biz", biz.to_string()),
        PathNode::new("cmdb", "host", host.to_string()),
    ]
}

fn host_policy(paths: Vec<Vec<PathNode>>) -> Policy {
    Policy::new(
        "view_host",
        vec![RelatedResourceType::new(
            "cmdb",
            "host",
            vec![Condition::with_instances(vec![Instance::new("host", paths)])],
        )],
    )
}

fn scope_paths(width: usize) -> Vec<Vec<PathNode>> {
    (0..width)
        .map(|biz| vec![PathNode::new("cmdb", "biz", biz.to_string()), PathNode::new("cmdb", "host", "*")])
        .collect()
}

fn bench_path_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_matching");

    let path = host_path(7, 42);
    group.bench_function("canonicalize", |b| {
        b.iter(|| canonicalize(black_box(&path)))
    });

    for width in [10, 100, 1000] {
        let paths = scope_paths(width);
        let scope = ScopePaths::from_paths(paths.iter().map(Vec::as_slice));
        let candidate = host_path(width - 1, 42);

        group.bench_with_input(BenchmarkId::new("contains", width), &candidate, |b, candidate| {
            b.iter(|| contains(black_box(candidate), &scope))
        });
    }

    group.finish();
}

fn bench_policy_containment(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_containment");

    for width in [10, 100, 1000] {
        let scope = host_policy(scope_paths(width));
        let template = host_policy((0..width).step_by(3).map(|biz| host_path(biz, biz)).collect());

        group.bench_with_input(BenchmarkId::from_parameter(width), &template, |b, template| {
            b.iter(|| policy_contained(black_box(template), &scope))
        });
    }

    group.finish();
}

fn bench_remove_path_outside_scope(c: &mut Criterion) {
    let checker = AuthScopeChecker::from_scope(
        Role::new(1, "bench", RoleType::SystemManager),
        vec![AuthScopeSystem::new("cmdb", vec![host_policy(scope_paths(100))])],
    )
    .expect("valid scope");

    let candidates: Vec<Vec<PathNode>> = (0..500).map(|i| host_path(i % 200, i)).collect();

    c.bench_function("remove_path_outside_scope_500", |b| {
        b.iter(|| {
            checker
                .remove_path_outside_scope("cmdb", "view_host", black_box(candidates.clone()))
                .expect("action in scope")
        })
    });
}

fn bench_subject_check(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    let mut org = InMemoryOrganization::new().with_department(Department::new("root", vec![]));
    for i in 0..100 {
        let id = format!("d{}", i);
        org = org
            .with_department(Department::new(id.clone(), vec!["root".into()]))
            .with_member(format!("u{}", i), id);
    }

    let checker = SubjectScopeChecker::from_scope(
        Role::new(1, "bench", RoleType::RatingManager),
        (0..50).map(|i| Subject::department(format!("d{}", i))).collect(),
        Arc::new(org),
        Duration::from_secs(1),
    )
    .expect("non-staff role");

    let subjects: Vec<Subject> = (0..100).map(|i| Subject::user(format!("u{}", i))).collect();

    c.bench_function("subject_check_100_users", |b| {
        b.iter(|| {
            runtime
                .block_on(checker.check(black_box(subjects.clone()), ViolationMode::Exclude))
                .expect("resolver available")
        })
    });
}

criterion_group!(
    benches,
    bench_path_matching,
    bench_policy_containment,
    bench_remove_path_outside_scope,
    bench_subject_check
);
criterion_main!(benches);
