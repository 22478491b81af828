//! Membership mutations and the notifications they publish.

mod common;

use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use common::*;
use membership_core::common::{MembershipError, MembershipId, ProjectId, RoleId, StoreError};
use membership_core::domains::membership::{MemberRole, Role};
use membership_core::kernel::{FailingNats, MockUserDirectory, StalledNats};

// =============================================================================
// add_members
// =============================================================================

#[tokio::test]
async fn single_add_publishes_one_event_for_that_member() {
    let h = TestHarness::new().await;

    let created = h
        .service
        .add_members(&bob(), APOLLO, vec![Some(ALICE)], vec![MANAGER])
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].role_names(), vec!["Manager"]);

    let payloads = h.payloads();
    assert_eq!(payloads.len(), 1);
    let p = &payloads[0];
    assert_eq!(p.project_id, ProjectId::new(7));
    assert_eq!(p.project_name, "Apollo");
    assert_eq!(p.member_name, "Alice");
    assert_eq!(p.member_phone, "+6281111111");
    assert_eq!(p.action, "add member");
    assert_eq!(
        p.message,
        format!("Bob menambahkan Alice ke project Apollo {}", WHEN)
    );
    assert!(h.nats.was_published_to("project.publish"));
}

#[tokio::test]
async fn multi_add_publishes_one_event_per_member() {
    let h = TestHarness::new().await;

    let created = h
        .service
        .add_members(
            &bob(),
            APOLLO,
            vec![Some(ALICE), Some(CAROL), Some(DAVE)],
            vec![DEVELOPER],
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 3);

    let payloads = h.payloads();
    let names: Vec<&str> = payloads.iter().map(|p| p.member_name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Carol", "Dave"]);
    assert!(payloads.iter().all(|p| p.action == "add member"));

    // Dave has no phone on record
    assert_eq!(payloads[2].member_phone, "");
}

#[tokio::test]
async fn add_without_users_creates_silent_placeholder() {
    let h = TestHarness::new().await;

    let created = h
        .service
        .add_members(&bob(), APOLLO, vec![], vec![MANAGER])
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert!(created[0].is_placeholder());
    assert_eq!(h.store.memberships_for(7).len(), 1);
    assert_eq!(h.nats.publish_count(), 0);
}

#[tokio::test]
async fn add_skips_placeholder_but_announces_real_members() {
    let h = TestHarness::new().await;

    let created = h
        .service
        .add_members(&bob(), APOLLO, vec![None, Some(CAROL)], vec![MANAGER])
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    let payloads = h.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].member_name, "Carol");
}

#[tokio::test]
async fn add_without_roles_fails_validation_before_store() {
    let h = TestHarness::new().await;

    let err = h
        .service
        .add_members(&bob(), APOLLO, vec![Some(ALICE)], vec![])
        .await
        .unwrap_err();

    match err {
        MembershipError::Validation(errors) => {
            assert_eq!(errors.on("role"), vec!["can't be empty"])
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(h.store.calls().is_empty());
    assert_eq!(h.nats.publish_count(), 0);
}

#[tokio::test]
async fn add_with_only_unknown_roles_fails_validation() {
    let h = TestHarness::new().await;

    let err = h
        .service
        .add_members(&bob(), APOLLO, vec![Some(ALICE)], vec![RoleId::new(999)])
        .await
        .unwrap_err();

    match err {
        MembershipError::Validation(errors) => {
            assert_eq!(errors.on("role"), vec!["can't be empty"])
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(h.store.memberships_for(7).is_empty());
    assert!(h.store.calls().is_empty());
    assert_eq!(h.nats.publish_count(), 0);
}

#[tokio::test]
async fn add_ignores_unknown_roles_next_to_known_ones() {
    let h = TestHarness::new().await;

    let created = h
        .service
        .add_members(&bob(), APOLLO, vec![Some(ALICE)], vec![RoleId::new(999), MANAGER])
        .await
        .unwrap();

    assert_eq!(created[0].role_names(), vec!["Manager"]);
    assert_eq!(h.nats.publish_count(), 1);
}

#[tokio::test]
async fn add_existing_member_surfaces_store_validation() {
    let h = TestHarness::new().await;
    h.store
        .seed_membership(7, 1, vec![MemberRole::direct(h.store.role(1).unwrap())]);

    let err = h
        .service
        .add_members(&bob(), APOLLO, vec![Some(ALICE)], vec![MANAGER])
        .await
        .unwrap_err();

    match err {
        MembershipError::Validation(errors) => {
            assert_eq!(errors.on("user_id"), vec!["has already been taken"])
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(h.nats.publish_count(), 0);
}

#[tokio::test]
async fn add_to_unknown_project_is_a_persistence_error() {
    let h = TestHarness::new().await;

    let err = h
        .service
        .add_members(&bob(), ProjectId::new(404), vec![Some(ALICE)], vec![MANAGER])
        .await
        .unwrap_err();

    assert!(matches!(err, MembershipError::Persistence(_)));
    assert_eq!(h.nats.publish_count(), 0);
}

// =============================================================================
// update_roles
// =============================================================================

#[tokio::test]
async fn update_announces_roles_after_the_change() {
    let h = TestHarness::new().await;
    let id = h
        .store
        .seed_membership(7, 1, vec![MemberRole::direct(h.store.role(3).unwrap())]);

    let updated = h
        .service
        .update_roles(&bob(), id, vec![MANAGER, DEVELOPER])
        .await
        .unwrap();

    assert_eq!(updated.role_names(), vec!["Manager", "Developer"]);
    assert_eq!(
        h.store.membership(id).unwrap().role_names(),
        vec!["Manager", "Developer"]
    );

    let payloads = h.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].action, "Update member");
    assert_eq!(
        payloads[0].message,
        format!(
            "Bob merubah Alice menjadi role Manager, Developer di project Apollo {}",
            WHEN
        )
    );
}

#[tokio::test]
async fn update_keeps_inherited_roles_in_announcement() {
    let h = TestHarness::new().await;
    let id = h.store.seed_membership(
        7,
        2,
        vec![MemberRole {
            role: h.store.role(2).unwrap(),
            inherited_from: Some(MembershipId::new(500)),
        }],
    );

    h.service
        .update_roles(&bob(), id, vec![REPORTER])
        .await
        .unwrap();

    let payloads = h.payloads();
    assert!(payloads[0]
        .message
        .starts_with("Bob merubah Carol menjadi role Developer, Reporter di project Apollo"));
}

#[tokio::test]
async fn update_save_failure_is_persistence_error_without_notification() {
    let h = TestHarness::new().await;
    let id = h
        .store
        .seed_membership(7, 1, vec![MemberRole::direct(h.store.role(1).unwrap())]);
    h.store.fail_saves();

    let err = h
        .service
        .update_roles(&bob(), id, vec![DEVELOPER])
        .await
        .unwrap_err();

    assert!(matches!(err, MembershipError::Persistence(_)));
    assert_eq!(h.nats.publish_count(), 0);
}

#[tokio::test]
async fn update_to_no_roles_is_rejected_without_saving() {
    let h = TestHarness::new().await;
    let id = h
        .store
        .seed_membership(7, 1, vec![MemberRole::direct(h.store.role(1).unwrap())]);

    let err = h.service.update_roles(&bob(), id, vec![]).await.unwrap_err();

    match err {
        MembershipError::Persistence(StoreError::Validation(errors)) => {
            assert_eq!(errors.on("role"), vec!["can't be empty"])
        }
        other => panic!("expected store validation error, got {:?}", other),
    }
    assert!(h.store.calls().is_empty());
    assert_eq!(h.store.membership(id).unwrap().role_names(), vec!["Manager"]);
    assert_eq!(h.nats.publish_count(), 0);
}

#[tokio::test]
async fn update_to_only_unknown_roles_is_rejected_without_saving() {
    let h = TestHarness::new().await;
    let id = h
        .store
        .seed_membership(7, 1, vec![MemberRole::direct(h.store.role(1).unwrap())]);

    let err = h
        .service
        .update_roles(&bob(), id, vec![RoleId::new(999)])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MembershipError::Persistence(StoreError::Validation(_))
    ));
    assert!(h.store.calls().is_empty());
    assert_eq!(h.store.membership(id).unwrap().role_names(), vec!["Manager"]);
    assert_eq!(h.nats.publish_count(), 0);
}

#[tokio::test]
async fn update_unknown_membership_is_not_found() {
    let h = TestHarness::new().await;

    let err = h
        .service
        .update_roles(&bob(), MembershipId::new(1234), vec![MANAGER])
        .await
        .unwrap_err();

    assert!(matches!(err, MembershipError::NotFound { .. }));
    assert_eq!(h.nats.publish_count(), 0);
}

// =============================================================================
// remove
// =============================================================================

#[tokio::test]
async fn remove_deletes_and_announces() {
    let h = TestHarness::new().await;
    let id = h
        .store
        .seed_membership(7, 1, vec![MemberRole::direct(h.store.role(1).unwrap())]);

    let removed = h.service.remove(&bob(), APOLLO, id).await.unwrap();

    assert!(removed);
    assert!(h.store.membership(id).is_none());

    let payloads = h.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].action, "delete member");
    assert_eq!(
        payloads[0].message,
        format!("Bob telah menghapus Alice dari project Apollo {}", WHEN)
    );
}

#[tokio::test]
async fn remove_announces_even_when_membership_is_not_deletable() {
    let h = TestHarness::new().await;
    let inherited = MemberRole {
        role: Role {
            id: DEVELOPER,
            name: "Developer".to_string(),
        },
        inherited_from: Some(MembershipId::new(500)),
    };
    let id = h.store.seed_membership(7, 2, vec![inherited]);

    let removed = h.service.remove(&bob(), APOLLO, id).await.unwrap();

    assert!(!removed);
    assert!(h.store.membership(id).is_some());
    assert!(!h.store.calls().contains(&"delete".to_string()));

    let payloads = h.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].action, "delete member");
    assert_eq!(payloads[0].member_name, "Carol");
}

#[tokio::test]
async fn remove_placeholder_deletes_without_announcement() {
    let h = TestHarness::new().await;
    let created = h
        .service
        .add_members(&bob(), APOLLO, vec![], vec![MANAGER])
        .await
        .unwrap();

    let removed = h.service.remove(&bob(), APOLLO, created[0].id).await.unwrap();

    assert!(removed);
    assert!(h.store.membership(created[0].id).is_none());
    assert_eq!(h.nats.publish_count(), 0);
}

#[tokio::test]
async fn remove_is_scoped_to_the_project() {
    let h = TestHarness::new().await;
    let id = h
        .store
        .seed_membership(8, 1, vec![MemberRole::direct(h.store.role(1).unwrap())]);

    let err = h.service.remove(&bob(), APOLLO, id).await.unwrap_err();

    assert!(matches!(err, MembershipError::NotFound { .. }));
    assert!(h.store.membership(id).is_some());
    assert_eq!(h.nats.publish_count(), 0);
}

// =============================================================================
// Broker failures never fail a mutation
// =============================================================================

#[tokio::test]
async fn failing_broker_does_not_fail_any_mutation() {
    let nats = Arc::new(FailingNats::new());
    let (service, store) = service_with_broker(nats.clone()).await;

    let created = assert_ok!(
        service
            .add_members(&bob(), APOLLO, vec![Some(ALICE)], vec![MANAGER])
            .await
    );
    let id = created[0].id;

    assert_ok!(service.update_roles(&bob(), id, vec![DEVELOPER]).await);
    let removed = assert_ok!(service.remove(&bob(), APOLLO, id).await);

    assert!(removed);
    assert!(store.membership(id).is_none());
    assert_eq!(nats.attempts().len(), 3);
    assert_eq!(service.publisher().stats().failed(), 3);
    assert_eq!(service.publisher().stats().delivered(), 0);
}

#[tokio::test]
async fn stalled_broker_is_bounded_by_publish_timeout() {
    let (service, store) = service_with_broker(Arc::new(StalledNats)).await;

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        service.add_members(&bob(), APOLLO, vec![Some(ALICE), Some(CAROL)], vec![MANAGER]),
    )
    .await
    .expect("mutation must not hang on a stalled broker");

    assert_eq!(assert_ok!(result).len(), 2);
    assert_eq!(store.memberships_for(7).len(), 2);
    assert_eq!(service.publisher().stats().failed(), 2);
}

#[tokio::test]
async fn validation_errors_still_surface_with_failing_broker() {
    let (service, _store) = service_with_broker(Arc::new(FailingNats::new())).await;

    assert_err!(
        service
            .add_members(&bob(), APOLLO, vec![Some(ALICE), Some(ALICE)], vec![MANAGER])
            .await
    );
    assert_eq!(service.publisher().stats().failed(), 0);
}

// =============================================================================
// Phone lookup
// =============================================================================

#[tokio::test]
async fn missing_phone_definition_sends_empty_phone() {
    let h = TestHarness::with_directory(MockUserDirectory::new()).await;

    assert_ok!(
        h.service
            .add_members(&bob(), APOLLO, vec![Some(ALICE)], vec![MANAGER])
            .await
    );

    let payloads = h.payloads();
    assert_eq!(payloads[0].member_phone, "");
    assert_eq!(h.directory.resolve_calls(), 1);
    assert_eq!(h.directory.value_calls(), 0);
}

#[tokio::test]
async fn phone_definition_is_resolved_once() {
    let h = TestHarness::new().await;

    h.service
        .add_members(&bob(), APOLLO, vec![Some(ALICE), Some(CAROL)], vec![MANAGER])
        .await
        .unwrap();

    assert_eq!(h.directory.resolve_calls(), 1);
    assert_eq!(h.directory.value_calls(), 2);
}

#[tokio::test]
async fn directory_outage_sends_empty_phone() {
    let directory = fixture_directory().failing_values();
    let h = TestHarness::with_directory(directory).await;

    let id = h
        .store
        .seed_membership(7, 1, vec![MemberRole::direct(h.store.role(1).unwrap())]);
    assert_ok!(h.service.remove(&bob(), APOLLO, id).await);

    let payloads = h.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].member_phone, "");
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_mutations_on_different_projects() {
    let h = TestHarness::new().await;

    let apollo = {
        let service = h.service.clone();
        tokio::spawn(async move {
            service
                .add_members(&bob(), APOLLO, vec![Some(ALICE)], vec![MANAGER])
                .await
        })
    };
    let gemini = {
        let service = h.service.clone();
        tokio::spawn(async move {
            service
                .add_members(&bob(), ProjectId::new(8), vec![Some(CAROL)], vec![REPORTER])
                .await
        })
    };

    assert_ok!(apollo.await.unwrap());
    assert_ok!(gemini.await.unwrap());

    let mut projects: Vec<String> = h.payloads().into_iter().map(|p| p.project_name).collect();
    projects.sort();
    assert_eq!(projects, vec!["Apollo", "Gemini"]);
}
