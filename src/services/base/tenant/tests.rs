use super::{Tenant, namespace_for, parse_namespace};
use crate::services::base::status::Status;

const SAMPLE_IDS: [i64; 9] = [i64::MIN, -42, -1, 0, 1, 2, 12, 9_999_999, i64::MAX];

#[test]
fn test_namespace_is_deterministic() {
    for id in SAMPLE_IDS {
        for is_org in [true, false] {
            assert_eq!(namespace_for(id, is_org), namespace_for(id, is_org));
        }
    }
}

#[test]
fn test_org_and_stack_never_collide() {
    for id in SAMPLE_IDS {
        assert_ne!(namespace_for(id, true), namespace_for(id, false), "collision for id {}", id);
    }
}

#[test]
fn test_distinct_ids_resolve_to_distinct_namespaces() {
    let mut seen = std::collections::HashSet::new();
    for id in SAMPLE_IDS {
        for is_org in [true, false] {
            assert!(seen.insert(namespace_for(id, is_org)));
        }
    }
}

#[test]
fn test_namespace_format() {
    assert_eq!(namespace_for(1, true), "default");
    assert_eq!(namespace_for(3, true), "org-3");
    assert_eq!(namespace_for(1, false), "stacks-1");
    assert_eq!(Tenant::stack(123).namespace(), "stacks-123");
}

#[test]
fn test_parse_namespace_round_trip() {
    for tenant in [Tenant::org(1), Tenant::org(7), Tenant::stack(1), Tenant::stack(4242)] {
        assert_eq!(parse_namespace(&tenant.namespace()), Some(tenant));
    }
    assert_eq!(parse_namespace("org-1"), None);
    assert_eq!(parse_namespace("kube-system"), None);
    assert_eq!(parse_namespace("stacks-abc"), None);
}

#[test]
fn test_stack_takes_precedence_over_default_org() {
    assert_eq!(Tenant::from_ids(Some(1), Some(55)).unwrap(), Tenant::stack(55));
    assert_eq!(Tenant::from_ids(Some(4), None).unwrap(), Tenant::org(4));
    assert_eq!(Tenant::from_ids(Some(4), Some(0)).unwrap(), Tenant::org(4));
}

#[test]
fn test_missing_ids() {
    let result = Tenant::from_ids(Some(0), None).unwrap_err();
    assert!(matches!(result, Status::NamespaceMissing));
    assert!(result.to_string().contains("Grafana stack ID"));
}
