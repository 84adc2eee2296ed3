//! Data source lookup tests

mod common;

use common::*;
use serde_json::json;
use stratus_common::Tags;
use stratus_provider::cloud::SeedResolverRule;

const RESOLVER_RULE: &str = "aws_route53_resolver_rule";

fn seed(h: &Harness, name: &str, domain: &str) -> String {
    h.cloud
        .seed_resolver_rule(&SeedResolverRule {
            name: name.to_string(),
            domain_name: domain.to_string(),
            ..Default::default()
        })
        .unwrap()
}

#[tokio::test]
async fn test_lookup_by_name_and_domain() {
    let h = harness();
    let id = seed(&h, "corp", "corp.example.com");
    seed(&h, "lab", "lab.example.com");

    let rule = h
        .provider
        .read_data_source(RESOLVER_RULE, &value(json!({ "name": "corp" })))
        .await
        .unwrap();
    assert_eq!(str_attr(&rule, "id"), id);
    assert_eq!(str_attr(&rule, "resolver_rule_id"), id);
    // Reported without the trailing dot the service stores
    assert_eq!(str_attr(&rule, "domain_name"), "corp.example.com");
    assert_eq!(str_attr(&rule, "owner_id"), "123456789012");
    assert_eq!(str_attr(&rule, "share_status"), "NOT_SHARED");

    let by_domain = h
        .provider
        .read_data_source(
            RESOLVER_RULE,
            &value(json!({ "domain_name": "lab.example.com", "rule_type": "FORWARD" })),
        )
        .await
        .unwrap();
    assert_eq!(str_attr(&by_domain, "name"), "lab");

    let by_id = h
        .provider
        .read_data_source(RESOLVER_RULE, &value(json!({ "resolver_rule_id": id })))
        .await
        .unwrap();
    assert_eq!(by_id, rule);
}

#[tokio::test]
async fn test_lookup_must_match_exactly_one() {
    let h = harness();
    seed(&h, "a", "a.example.com");
    seed(&h, "b", "b.example.com");

    let err = h
        .provider
        .read_data_source(RESOLVER_RULE, &value(json!({ "rule_type": "FORWARD" })))
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("2 Route53 Resolver rules matched; use additional constraints"));

    let err = h
        .provider
        .read_data_source(RESOLVER_RULE, &value(json!({ "name": "missing" })))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no Route53 Resolver rules matched");
}

#[tokio::test]
async fn test_deleted_rule_is_not_found_by_id() {
    let h = harness();
    let id = h
        .cloud
        .seed_resolver_rule(&SeedResolverRule {
            name: "gone".to_string(),
            domain_name: "gone.example.com".to_string(),
            status: "DELETED".to_string(),
            ..Default::default()
        })
        .unwrap();

    let err = h
        .provider
        .read_data_source(RESOLVER_RULE, &value(json!({ "resolver_rule_id": id })))
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("no Route53 Resolver rules matched found with the id"));

    let err = h
        .provider
        .read_data_source(RESOLVER_RULE, &value(json!({ "resolver_rule_id": "rslvr-rr-missing" })))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("rslvr-rr-missing"));
}

#[tokio::test]
async fn test_shared_rule_omits_tags() {
    let h = harness();
    let tags: Tags = [("Team".to_string(), "network".to_string())].into_iter().collect();
    h.cloud
        .seed_resolver_rule(&SeedResolverRule {
            name: "shared".to_string(),
            domain_name: "shared.example.com".to_string(),
            share_status: "SHARED_WITH_ME".to_string(),
            owner_id: Some("210987654321".to_string()),
            tags: tags.clone(),
            ..Default::default()
        })
        .unwrap();
    h.cloud
        .seed_resolver_rule(&SeedResolverRule {
            name: "owned".to_string(),
            domain_name: "owned.example.com".to_string(),
            tags,
            ..Default::default()
        })
        .unwrap();

    let shared = h
        .provider
        .read_data_source(RESOLVER_RULE, &value(json!({ "name": "shared" })))
        .await
        .unwrap();
    assert_eq!(str_attr(&shared, "owner_id"), "210987654321");
    assert!(shared.get("tags").and_then(|t| t.as_map()).unwrap().is_empty());
    assert_eq!(h.cloud.call_count("ListTagsForResource"), 0);

    let owned = h
        .provider
        .read_data_source(RESOLVER_RULE, &value(json!({ "name": "owned" })))
        .await
        .unwrap();
    let tags = owned.get("tags").and_then(|t| t.as_map()).unwrap();
    assert_eq!(tags["Team"].as_string(), Some("network"));
}

#[tokio::test]
async fn test_id_and_filters_conflict() {
    let h = harness();
    let err = h
        .provider
        .read_data_source(
            RESOLVER_RULE,
            &value(json!({ "resolver_rule_id": "rslvr-rr-1", "name": "corp" })),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("conflicts with"));
    assert_eq!(h.cloud.total_calls(), 0);
}
