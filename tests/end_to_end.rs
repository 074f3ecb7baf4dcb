//! End-to-end flows across issuance, validation, metering and
//! permission resolution.

use std::sync::Arc;

use brandgate::domain::access::Role;
use brandgate::domain::api_key::Permission;
use brandgate::domain::audit::AuditAction;
use brandgate::domain::ids::{ClientId, UserId};
use brandgate::domain::usage::UsageRange;
use brandgate::infrastructure::usage::LogUsageParams;
use brandgate::{AppConfig, CoreServices};

fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn issued_key_validates_until_revoked() {
    let services = CoreServices::in_memory(&AppConfig::default());

    let created = services
        .api_keys
        .create_api_key(
            "user:u1",
            ClientId::from("c1"),
            "integration key",
            &tokens(&["content:read"]),
            None,
        )
        .await
        .unwrap();

    // The secret resolves to the stored record, scoped to its client
    let validated = services.api_keys.validate(&created.secret).await.unwrap().unwrap();
    assert_eq!(validated.client_id().as_str(), "c1");

    assert!(services.api_keys.has_permission(&validated, Permission::ContentRead));
    assert!(!services.api_keys.has_permission(&validated, Permission::ContentGenerate));

    services
        .api_keys
        .revoke("user:u1", created.api_key.id())
        .await
        .unwrap();

    assert!(services.api_keys.validate(&created.secret).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_credentials_are_indistinguishable_misses() {
    let services = CoreServices::in_memory(&AppConfig::default());

    // Never issued but well-formed
    let phantom = format!("pk_{}", "a".repeat(64));
    assert!(services.api_keys.validate(&phantom).await.unwrap().is_none());

    // Expired but still active
    let expiring = services
        .api_keys
        .create_api_key(
            "user:u1",
            ClientId::from("c1"),
            "short lived",
            &[],
            Some(chrono::Utc::now() + chrono::Duration::milliseconds(30)),
        )
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    assert!(services.api_keys.validate(&expiring.secret).await.unwrap().is_none());

    // Malformed, never touches storage
    assert!(services.api_keys.validate("garbage").await.unwrap().is_none());
}

#[tokio::test]
async fn wildcard_key_allows_every_operation() {
    let services = CoreServices::in_memory(&AppConfig::default());

    let created = services
        .api_keys
        .create_api_key("user:u1", ClientId::from("c1"), "root key", &tokens(&["*"]), None)
        .await
        .unwrap();

    let validated = services.api_keys.validate(&created.secret).await.unwrap().unwrap();
    for permission in Permission::concrete() {
        assert!(services.api_keys.has_permission(&validated, permission));
    }
}

#[tokio::test]
async fn metered_calls_aggregate_per_key() {
    let services = CoreServices::in_memory(&AppConfig::default());

    let created = services
        .api_keys
        .create_api_key("user:u1", ClientId::from("c1"), "metered", &tokens(&["*"]), None)
        .await
        .unwrap();
    let key_id = created.api_key.id().clone();

    let handles = vec![
        services.usage.log_usage(
            LogUsageParams::new(key_id.clone(), "/v1/content", "POST", 200).with_tokens_consumed(100),
        ),
        services.usage.log_usage(
            LogUsageParams::new(key_id.clone(), "/v1/content", "POST", 200).with_tokens_consumed(50),
        ),
        services
            .usage
            .log_usage(LogUsageParams::new(key_id.clone(), "/v1/jobs", "GET", 500)),
        services
            .usage
            .log_usage(LogUsageParams::new(key_id.clone(), "/v1/jobs", "GET", 302)),
    ];
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = services
        .usage
        .usage_stats(&key_id, UsageRange::unbounded())
        .await
        .unwrap();

    assert_eq!(stats.total_requests, 4);
    assert_eq!(stats.successful_requests, 2);
    assert_eq!(stats.failed_requests, 1);
    assert_eq!(stats.total_tokens_consumed, 150);
    assert_eq!(stats.requests_by_endpoint[0].endpoint, "/v1/content");
    assert_eq!(stats.requests_by_endpoint[0].count, 2);
}

#[tokio::test]
async fn role_defaults_merge_with_overrides() {
    let services = CoreServices::in_memory(&AppConfig::default());
    let user = UserId::from("u1");
    let client = ClientId::from("c1");

    let before = services
        .access
        .resolve(&user, Role::Viewer, &client)
        .await
        .unwrap();
    assert!(!before.allows(Permission::JobsRead));

    services
        .access
        .set_overrides("user:admin", &user, &client, &tokens(&["jobs:read"]))
        .await
        .unwrap();

    let after = services
        .access
        .resolve(&user, Role::Viewer, &client)
        .await
        .unwrap();
    assert!(after.allows(Permission::ContentRead));
    assert!(after.allows(Permission::JobsRead));
    assert!(!after.allows(Permission::ContentGenerate));
}

#[tokio::test]
async fn shared_audit_trail_follows_mutation_order() {
    let services = CoreServices::in_memory(&AppConfig::default());

    let created = services
        .api_keys
        .create_api_key("user:u1", ClientId::from("c1"), "audited", &[], None)
        .await
        .unwrap();
    services
        .access
        .set_overrides(
            "user:u1",
            &UserId::from("u2"),
            &ClientId::from("c1"),
            &tokens(&["content:read"]),
        )
        .await
        .unwrap();
    services
        .api_keys
        .revoke("user:u1", created.api_key.id())
        .await
        .unwrap();

    let events = services.audit.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].action, AuditAction::Create);
    assert_eq!(events[0].resource_type, "api_key");
    assert_eq!(events[1].action, AuditAction::Update);
    assert_eq!(events[1].resource_type, "permission_overrides");
    assert_eq!(events[2].action, AuditAction::Revoke);
}

#[tokio::test]
async fn owner_resolution_ignores_client_assignment() {
    let services = CoreServices::in_memory(&AppConfig::default());
    let user = UserId::from("owner-1");
    let client = ClientId::from("c9");

    assert!(services
        .access
        .can_access_client(&user, Role::Owner, &client)
        .await
        .unwrap());

    let resolved = services
        .access
        .resolve(&user, Role::Owner, &client)
        .await
        .unwrap();
    for permission in Permission::concrete() {
        assert!(resolved.allows(permission));
    }

    // A plain user needs an explicit assignment
    assert!(!services
        .access
        .can_access_client(&user, Role::User, &client)
        .await
        .unwrap());
}

#[tokio::test]
async fn services_share_one_audit_sink() {
    let services = CoreServices::in_memory(&AppConfig::default());
    let sink: Arc<_> = services.audit.clone();

    services
        .api_keys
        .create_api_key("user:u1", ClientId::from("c1"), "key", &[], None)
        .await
        .unwrap();
    assert_eq!(sink.events().len(), 1);
}
