//! Batch orchestration and retention against a mock repository service.

mod common;

use common::{asset_json, client_for, component_json, page_json};
use nexus_client::{BatchOutcome, Error, RetentionReport};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn batch_delete_keeps_one_outcome_per_key_with_mixed_results() {
    let server = MockServer::start().await;
    for id in ["ok1", "ok2"] {
        Mock::given(method("DELETE"))
            .and(path(format!("/service/rest/v1/components/{}", id)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/service/rest/v1/components/bad"))
        .respond_with(ResponseTemplate::new(404).set_body_string("component not found"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let results = client
        .batch_delete_components(vec![
            "ok1".to_string(),
            "ok2".to_string(),
            "bad".to_string(),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results["ok1"], BatchOutcome::Done);
    assert_eq!(results["ok2"], BatchOutcome::Done);
    assert!(matches!(&results["bad"], BatchOutcome::Failed(r) if r.contains("404")));
}

#[tokio::test]
async fn batch_download_saves_files_and_isolates_failures() {
    let server = MockServer::start().await;
    let url = format!("{}/repository/raw/docs/a.txt", server.uri());

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(asset_json(
            "a1",
            "docs/a.txt",
            Some(url.as_str()),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repository/raw/docs/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"alpha".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets/a2"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such asset"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let dir = tempfile::tempdir().expect("tempdir");
    let results = client
        .batch_download_assets(vec!["a1".to_string(), "a2".to_string()], dir.path())
        .await;

    assert_eq!(results.len(), 2);
    match &results["a1"] {
        BatchOutcome::Saved(saved) => {
            assert_eq!(saved, &dir.path().join("a.txt"));
            assert_eq!(std::fs::read(saved).expect("read"), b"alpha");
        }
        other => panic!("expected Saved, got {:?}", other),
    }
    assert!(matches!(&results["a2"], BatchOutcome::Failed(_)));
}

#[tokio::test]
async fn retention_deletes_only_beyond_the_keep_window() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/search"))
        .and(query_param("repository", "maven-releases"))
        .and(query_param("group", "com.example"))
        .and(query_param("name", "app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                component_json("v10", Some("com.example"), "app", Some("1.0"), "maven2", vec![]),
                component_json("v12", Some("com.example"), "app", Some("1.2"), "maven2", vec![]),
                component_json("v11", Some("com.example"), "app", Some("1.1"), "maven2", vec![]),
            ],
            None,
        )))
        .mount(&server)
        .await;

    // Only the lexicographically oldest version may be deleted.
    Mock::given(method("DELETE"))
        .and(path("/service/rest/v1/components/v10"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client
        .cleanup_old_versions("maven-releases", "com.example", "app", 2)
        .await
        .expect("retention pass succeeds");

    match report {
        RetentionReport::Deleted(results) => {
            assert_eq!(results.len(), 1);
            assert_eq!(results["v10"], BatchOutcome::Done);
        }
        other => panic!("expected deletions, got {:?}", other),
    }
    server.verify().await;
}

#[tokio::test]
async fn retention_with_everything_inside_the_window_deletes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                component_json("v10", Some("com.example"), "app", Some("1.0"), "maven2", vec![]),
                component_json("v11", Some("com.example"), "app", Some("1.1"), "maven2", vec![]),
            ],
            None,
        )))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client
        .cleanup_old_versions("maven-releases", "com.example", "app", 5)
        .await
        .expect("retention pass succeeds");
    assert!(matches!(report, RetentionReport::NothingToDelete));

    let deletes = server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .filter(|r| r.method == wiremock::http::Method::DELETE)
        .count();
    assert_eq!(deletes, 0);
}

#[tokio::test]
async fn retention_with_no_versions_found_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], None)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .cleanup_old_versions("maven-releases", "com.example", "gone", 5)
        .await
        .expect_err("must fail");
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn retention_reports_partial_failure_per_component() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                component_json("keep", Some("com.example"), "app", Some("3.0"), "maven2", vec![]),
                component_json("gone-ok", Some("com.example"), "app", Some("2.0"), "maven2", vec![]),
                component_json("gone-bad", Some("com.example"), "app", Some("1.0"), "maven2", vec![]),
            ],
            None,
        )))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/service/rest/v1/components/gone-ok"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/service/rest/v1/components/gone-bad"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client
        .cleanup_old_versions("maven-releases", "com.example", "app", 1)
        .await
        .expect("retention pass itself succeeds");

    match report {
        RetentionReport::Deleted(results) => {
            assert_eq!(results.len(), 2);
            assert!(results["gone-ok"].is_success());
            assert!(!results["gone-bad"].is_success());
        }
        other => panic!("expected deletions, got {:?}", other),
    }
}
