#![cfg(feature = "server")]

mod common;

use axum::http::StatusCode;
use common::{create_doc, id_of, titles};
use jotter::documents::{LifecycleOptions, RemovePolicy};

#[tokio::test]
async fn create_returns_owned_document() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;

    let response = server
        .post("/api/v1/documents")
        .json(&serde_json::json!({ "title": "Untitled" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let doc: serde_json::Value = response.json();
    assert_eq!(doc["title"].as_str(), Some("Untitled"));
    assert_eq!(doc["owner_id"].as_str(), Some("demo-alice"));
    assert_eq!(doc["is_archived"].as_bool(), Some(false));
    assert_eq!(doc["is_published"].as_bool(), Some(false));
    assert!(doc["parent_id"].is_null());
    assert!(!id_of(&doc).is_empty());
    assert_eq!(env.repo.len(), 1);
}

#[tokio::test]
async fn create_rejects_blank_title() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;

    server
        .post("/api/v1/documents")
        .json(&serde_json::json!({ "title": "   " }))
        .await
        .assert_status_bad_request();
    assert!(env.repo.is_empty());
}

#[tokio::test]
async fn create_with_unknown_parent_when_validated() {
    let env = common::TestEnv::with_options(LifecycleOptions {
        validate_parent: true,
        ..Default::default()
    });
    let server = env.login("alice").await;

    server
        .post("/api/v1/documents")
        .json(&serde_json::json!({ "title": "Child", "parent_id": "missing" }))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn update_patches_given_fields_only() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;
    let doc = create_doc(&server, "Draft", None).await;
    let id = id_of(&doc);

    let response = server
        .patch(&format!("/api/v1/documents/{id}"))
        .json(&serde_json::json!({
            "content": "{\"blocks\":[]}",
            "icon": "📄",
            "is_published": true
        }))
        .await;
    response.assert_status_ok();

    let updated: serde_json::Value = response.json();
    assert_eq!(updated["title"].as_str(), Some("Draft"));
    assert_eq!(updated["content"].as_str(), Some("{\"blocks\":[]}"));
    assert_eq!(updated["icon"].as_str(), Some("📄"));
    assert_eq!(updated["is_published"].as_bool(), Some(true));
    assert_eq!(updated["creation_time"], doc["creation_time"]);
}

#[tokio::test]
async fn remove_icon_and_cover_image() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;
    let id = id_of(&create_doc(&server, "Decorated", None).await);

    server
        .patch(&format!("/api/v1/documents/{id}"))
        .json(&serde_json::json!({
            "icon": "🌲",
            "cover_image": "https://img.example.com/forest.png"
        }))
        .expect_success()
        .await;

    let doc: serde_json::Value = server
        .delete(&format!("/api/v1/documents/{id}/icon"))
        .expect_success()
        .await
        .json();
    assert!(doc["icon"].is_null());
    assert_eq!(
        doc["cover_image"].as_str(),
        Some("https://img.example.com/forest.png")
    );

    let doc: serde_json::Value = server
        .delete(&format!("/api/v1/documents/{id}/cover-image"))
        .expect_success()
        .await
        .json();
    assert!(doc["cover_image"].is_null());
}

#[tokio::test]
async fn archive_cascades_to_whole_subtree() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;

    let root = create_doc(&server, "Root", None).await;
    let child = create_doc(&server, "Child", Some(&id_of(&root))).await;
    let grandchild = create_doc(&server, "Grandchild", Some(&id_of(&child))).await;
    let sibling = create_doc(&server, "Sibling", None).await;

    let archived: serde_json::Value = server
        .post(&format!("/api/v1/documents/{}/archive", id_of(&root)))
        .expect_success()
        .await
        .json();
    assert_eq!(archived["is_archived"].as_bool(), Some(true));

    for doc in [&child, &grandchild] {
        let fetched: serde_json::Value = server
            .get(&format!("/api/v1/documents/{}", id_of(doc)))
            .expect_success()
            .await
            .json();
        assert_eq!(fetched["is_archived"].as_bool(), Some(true));
    }

    let fetched: serde_json::Value = server
        .get(&format!("/api/v1/documents/{}", id_of(&sibling)))
        .expect_success()
        .await
        .json();
    assert_eq!(fetched["is_archived"].as_bool(), Some(false));

    let trash: serde_json::Value = server
        .get("/api/v1/documents/trash")
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&trash), vec!["Grandchild", "Child", "Root"]);
}

#[tokio::test]
async fn restore_mid_tree_leaves_ancestor_archived() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;

    let root = create_doc(&server, "Root", None).await;
    let child = create_doc(&server, "Child", Some(&id_of(&root))).await;
    let grandchild = create_doc(&server, "Grandchild", Some(&id_of(&child))).await;

    server
        .post(&format!("/api/v1/documents/{}/archive", id_of(&root)))
        .expect_success()
        .await;

    let restored: serde_json::Value = server
        .post(&format!("/api/v1/documents/{}/restore", id_of(&child)))
        .expect_success()
        .await
        .json();
    assert_eq!(restored["is_archived"].as_bool(), Some(false));
    assert_eq!(restored["parent_id"], root["_id"]);

    let trash: serde_json::Value = server
        .get("/api/v1/documents/trash")
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&trash), vec!["Root"]);

    let search: serde_json::Value = server
        .get("/api/v1/documents/search")
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&search), vec!["Grandchild", "Child"]);
    assert_eq!(search[0]["_id"], grandchild["_id"]);
}

#[tokio::test]
async fn sidebar_lists_one_level_newest_first() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;

    let first = create_doc(&server, "First", None).await;
    create_doc(&server, "Second", None).await;
    create_doc(&server, "Nested A", Some(&id_of(&first))).await;
    create_doc(&server, "Nested B", Some(&id_of(&first))).await;
    let gone = create_doc(&server, "Gone", None).await;

    server
        .post(&format!("/api/v1/documents/{}/archive", id_of(&gone)))
        .expect_success()
        .await;

    let roots: serde_json::Value = server
        .get("/api/v1/documents/sidebar")
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&roots), vec!["Second", "First"]);

    let nested: serde_json::Value = server
        .get("/api/v1/documents/sidebar")
        .add_query_param("parent_id", id_of(&first))
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&nested), vec!["Nested B", "Nested A"]);
}

#[tokio::test]
async fn search_and_trash_filter_by_title() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;

    create_doc(&server, "Meeting notes", None).await;
    create_doc(&server, "Groceries", None).await;
    let old = create_doc(&server, "Old meeting", None).await;
    server
        .post(&format!("/api/v1/documents/{}/archive", id_of(&old)))
        .expect_success()
        .await;

    let found: serde_json::Value = server
        .get("/api/v1/documents/search")
        .add_query_param("q", "MEETING")
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&found), vec!["Meeting notes"]);

    let trashed: serde_json::Value = server
        .get("/api/v1/documents/trash")
        .add_query_param("q", "meet")
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&trashed), vec!["Old meeting"]);
}

#[tokio::test]
async fn projections_are_scoped_to_caller() {
    let env = common::TestEnv::start();
    let alice = env.login("alice").await;
    let bob = env.login("bob").await;

    create_doc(&alice, "Alice doc", None).await;
    create_doc(&bob, "Bob doc", None).await;

    let sidebar: serde_json::Value = bob
        .get("/api/v1/documents/sidebar")
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&sidebar), vec!["Bob doc"]);

    let search: serde_json::Value = alice
        .get("/api/v1/documents/search")
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&search), vec!["Alice doc"]);
}

#[tokio::test]
async fn remove_orphans_children_by_default() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;

    let parent = create_doc(&server, "Parent", None).await;
    let child = create_doc(&server, "Child", Some(&id_of(&parent))).await;

    server
        .delete(&format!("/api/v1/documents/{}", id_of(&parent)))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/v1/documents/{}", id_of(&parent)))
        .await
        .assert_status_not_found();

    let fetched: serde_json::Value = server
        .get(&format!("/api/v1/documents/{}", id_of(&child)))
        .expect_success()
        .await
        .json();
    assert_eq!(fetched["parent_id"], parent["_id"]);
    assert_eq!(env.repo.len(), 1);
}

#[tokio::test]
async fn remove_with_cascade_policy_deletes_subtree() {
    let env = common::TestEnv::with_options(LifecycleOptions {
        remove_policy: RemovePolicy::Cascade,
        ..Default::default()
    });
    let server = env.login("alice").await;

    let parent = create_doc(&server, "Parent", None).await;
    let child = create_doc(&server, "Child", Some(&id_of(&parent))).await;
    create_doc(&server, "Grandchild", Some(&id_of(&child))).await;
    create_doc(&server, "Unrelated", None).await;

    server
        .delete(&format!("/api/v1/documents/{}", id_of(&parent)))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_eq!(env.repo.len(), 1);
}

#[tokio::test]
async fn remove_with_reject_policy_conflicts_on_children() {
    let env = common::TestEnv::with_options(LifecycleOptions {
        remove_policy: RemovePolicy::Reject,
        ..Default::default()
    });
    let server = env.login("alice").await;

    let parent = create_doc(&server, "Parent", None).await;
    create_doc(&server, "Child", Some(&id_of(&parent))).await;

    server
        .delete(&format!("/api/v1/documents/{}", id_of(&parent)))
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(env.repo.len(), 2);
}

#[tokio::test]
async fn remove_with_detach_policy_promotes_children() {
    let env = common::TestEnv::with_options(LifecycleOptions {
        remove_policy: RemovePolicy::Detach,
        ..Default::default()
    });
    let server = env.login("alice").await;

    let parent = create_doc(&server, "Parent", None).await;
    create_doc(&server, "Child", Some(&id_of(&parent))).await;

    server
        .delete(&format!("/api/v1/documents/{}", id_of(&parent)))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let roots: serde_json::Value = server
        .get("/api/v1/documents/sidebar")
        .expect_success()
        .await
        .json();
    assert_eq!(titles(&roots), vec!["Child"]);
}

#[tokio::test]
async fn remove_missing_document_is_not_found() {
    let env = common::TestEnv::start();
    let server = env.login("alice").await;

    server
        .delete("/api/v1/documents/does-not-exist")
        .await
        .assert_status_not_found();
}
