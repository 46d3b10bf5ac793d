//! Wire-level assertions on the multipart upload protocol.

mod common;

use common::{RecordingNotifier, client_for};
use nexus_client::{CoordinateUpload, Error, PathUpload, RawFile, UploadSpec};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn received_body(server: &MockServer) -> String {
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 1, "exactly one POST expected");
    String::from_utf8_lossy(&requests[0].body).into_owned()
}

#[tokio::test]
async fn coordinate_upload_numbers_assets_in_jar_pom_sources_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/service/rest/v1/components"))
        .and(query_param("repository", "maven-releases"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let jar = dir.path().join("app-1.0.jar");
    let pom = dir.path().join("app-1.0.pom");
    let sources = dir.path().join("app-1.0-sources.jar");
    fs::write(&jar, b"jar bytes").expect("write jar");
    fs::write(&pom, b"<project/>").expect("write pom");
    fs::write(&sources, b"sources bytes").expect("write sources");

    let client = client_for(&server);
    let upload = CoordinateUpload::new("maven-releases", "com.example", "app", "1.0")
        .jar(&jar)
        .pom(&pom)
        .sources(&sources);
    let facts = client
        .upload_component(&UploadSpec::Coordinate(upload))
        .await
        .expect("upload succeeds");

    assert_eq!(facts.target, "com.example:app:1.0");
    assert_eq!(facts.total_bytes, 9 + 10 + 13);

    let body = received_body(&server).await;
    for field in [
        "name=\"maven2.groupId\"",
        "name=\"maven2.artifactId\"",
        "name=\"maven2.version\"",
        "name=\"maven2.packaging\"",
        "name=\"maven2.generate-pom\"",
        "name=\"maven2.asset1\"",
        "name=\"maven2.asset1.extension\"",
        "name=\"maven2.asset2\"",
        "name=\"maven2.asset2.extension\"",
        "name=\"maven2.asset3\"",
        "name=\"maven2.asset3.extension\"",
        "name=\"maven2.asset3.classifier\"",
    ] {
        assert!(body.contains(field), "missing multipart field {}", field);
    }
    // classifier is attached to index 3 only
    assert!(!body.contains("name=\"maven2.asset1.classifier\""));
    assert!(!body.contains("name=\"maven2.asset2.classifier\""));

    // file parts keep list order on the wire
    let first = body.find("name=\"maven2.asset1\"").expect("asset1 present");
    let second = body.find("name=\"maven2.asset2\"").expect("asset2 present");
    let third = body.find("name=\"maven2.asset3\"").expect("asset3 present");
    assert!(first < second && second < third);
}

#[tokio::test]
async fn path_upload_sends_directory_and_per_file_filenames() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/service/rest/v1/components"))
        .and(query_param("repository", "raw-hosted"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let readme = dir.path().join("README.txt");
    let archive = dir.path().join("bundle.tar.gz");
    fs::write(&readme, b"hello").expect("write readme");
    fs::write(&archive, b"tarball").expect("write archive");

    let client = client_for(&server);
    let upload = PathUpload::new(
        "raw-hosted",
        "docs/releases/1.0",
        vec![RawFile::new(&readme), RawFile::new(&archive)],
    );
    client
        .upload_component(&UploadSpec::Path(upload))
        .await
        .expect("upload succeeds");

    let body = received_body(&server).await;
    assert!(body.contains("name=\"raw.directory\""));
    assert!(body.contains("docs/releases/1.0"));
    assert!(body.contains("name=\"raw.asset1\""));
    assert!(body.contains("name=\"raw.asset1.filename\""));
    assert!(body.contains("README.txt"));
    assert!(body.contains("name=\"raw.asset2\""));
    assert!(body.contains("name=\"raw.asset2.filename\""));
    assert!(body.contains("bundle.tar.gz"));
}

#[tokio::test]
async fn npm_upload_sends_the_single_asset_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/service/rest/v1/components"))
        .and(query_param("repository", "npm-hosted"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let tarball = dir.path().join("left-pad-1.3.0.tgz");
    fs::write(&tarball, b"tgz bytes").expect("write tarball");

    let client = client_for(&server);
    client
        .upload_npm_package("npm-hosted", &tarball)
        .await
        .expect("upload succeeds");

    let body = received_body(&server).await;
    assert!(body.contains("name=\"npm.asset\""));
    assert!(body.contains("left-pad-1.3.0.tgz"));
}

#[tokio::test]
async fn rejected_upload_surfaces_status_and_notifies_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/service/rest/v1/components"))
        .respond_with(ResponseTemplate::new(403).set_body_string("missing privilege"))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let file = dir.path().join("app.jar");
    fs::write(&file, b"jar").expect("write jar");

    let notifier = RecordingNotifier::default();
    let client = client_for(&server).with_notifier(Arc::new(notifier.clone()));
    let upload = CoordinateUpload::new("maven-releases", "com.example", "app", "1.0").jar(&file);
    let err = client
        .upload_component(&UploadSpec::Coordinate(upload))
        .await
        .expect_err("upload must fail");

    assert!(matches!(err, Error::Status { status: 403, .. }));
    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation, "maven component upload");
    assert!(!calls[0].success);
    assert!(calls[0].error.as_deref().unwrap_or("").contains("403"));
}

#[tokio::test]
async fn successful_upload_notifies_with_fact_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/service/rest/v1/components"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let file = dir.path().join("notes.txt");
    fs::write(&file, b"release notes").expect("write file");

    let notifier = RecordingNotifier::default();
    let client = client_for(&server).with_notifier(Arc::new(notifier.clone()));
    let upload = PathUpload::new("raw-hosted", "docs", vec![RawFile::new(&file)]);
    client
        .upload_component(&UploadSpec::Path(upload))
        .await
        .expect("upload succeeds");

    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].success);
    assert_eq!(calls[0].details["repository"], "raw-hosted");
    assert_eq!(calls[0].details["target"], "docs");
    assert_eq!(calls[0].details["files"], "notes.txt");
}

#[tokio::test]
async fn missing_input_file_fails_before_any_request() {
    let server = MockServer::start().await;
    // No mocks mounted: any request would 404 and the recording would show it.

    let client = client_for(&server);
    let upload = PathUpload::new(
        "raw-hosted",
        "docs",
        vec![RawFile::new("/definitely/not/here.txt")],
    );
    let err = client
        .upload_component(&UploadSpec::Path(upload))
        .await
        .expect_err("validation must fail");
    assert!(matches!(err, Error::Upload(_)));

    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(requests.is_empty(), "no network call may be issued");
}
