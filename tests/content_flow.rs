//! Integration tests for the content endpoint family and the content
//! operations run through the executor.
//!
//! - GET    /Content                 list_content (filter, paging)
//! - GET    /Content/{id}            get_content
//! - DELETE /Content?ids=...         delete_content / DeleteContent
//! - GET    /Content/{id}/DownloadUrl + signed URL DownloadContent

use std::time::Duration;

use bsn_cli::auth::TokenProvider;
use bsn_cli::client::BsnClient;
use bsn_cli::console::ScriptedConsole;
use bsn_cli::content::{get_content, list_content};
use bsn_cli::executor::{ExecutionStatus, ExecutorError, ItemOutcome, execute};
use bsn_cli::gate::GateError;
use bsn_cli::operations::{ConfirmPolicy, DeleteContent, DownloadContent};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_client(server: &MockServer) -> BsnClient {
    let tp = TokenProvider::with_token("mock-token");
    BsnClient::with_base_url(tp, &format!("{}/", server.uri()), Duration::from_secs(5))
        .expect("client should build")
}

fn file_json(id: u64, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "virtualPath": "/Lobby/",
        "mediaType": "Video",
        "fileSize": 1024
    })
}

async fn mount_listing(server: &MockServer, filter: &str, files: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("Content"))
        .and(query_param("filter", filter))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": files,
            "isTruncated": false
        })))
        .mount(server)
        .await;
}

const FILTER: &str = "virtualPath eq '/Lobby/'";

// ── list / get ─────────────────────────────────────────────────────────

#[tokio::test]
async fn list_content_follows_paging_markers() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("Content"))
        .and(query_param("marker", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [file_json(3, "c.mp4")],
            "isTruncated": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("Content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [file_json(1, "a.mp4"), file_json(2, "b.mp4")],
            "isTruncated": true,
            "nextMarker": "page-2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let files = list_content(&client, None).await.unwrap();

    let ids: Vec<u64> = files.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(files[0].virtual_path.as_deref(), Some("/Lobby/"));
    assert_eq!(files[0].file_size, 1024);
}

#[tokio::test]
async fn get_content_not_found_is_an_api_error() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("Content/99"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such file"))
        .mount(&server)
        .await;

    let err = get_content(&client, 99).await.unwrap_err();
    assert!(err.is_not_found());
}

// ── DeleteContent ──────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_delete_reports_partial_failure_without_error() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    mount_listing(
        &server,
        FILTER,
        vec![file_json(10, "a.mp4"), file_json(11, "b.mp4"), file_json(12, "c.mp4")],
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("Content"))
        .and(query_param("ids", "10,11,12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "succeeded": [10, 11],
            "failed": [{"id": 12, "error": "locked"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let op = DeleteContent {
        client: &client,
        filter: Some(FILTER.to_string()),
        policy: ConfirmPolicy::default(),
    };
    let mut console = ScriptedConsole::new(["yes"]);
    let report = execute(&op, false, &mut console).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::Committed);
    assert_eq!(report.attempted_count(), 3);
    assert_eq!(report.succeeded_ids().into_iter().collect::<Vec<_>>(), vec![10, 11]);
    let failures: Vec<(u64, &str)> = report.failures().map(|(i, m)| (i.id, m)).collect();
    assert_eq!(failures, vec![(12, "locked")]);
    assert!(console.saw("Delete 3 content files"));
}

#[tokio::test]
async fn ids_missing_from_bulk_response_are_reported_as_failures() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    mount_listing(&server, FILTER, vec![file_json(10, "a.mp4"), file_json(11, "b.mp4")]).await;
    Mock::given(method("DELETE"))
        .and(path("Content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "succeeded": [10]
        })))
        .mount(&server)
        .await;

    let op = DeleteContent {
        client: &client,
        filter: Some(FILTER.to_string()),
        policy: ConfirmPolicy { force_bypass: true, non_interactive: false },
    };
    let report = execute(&op, false, &mut ScriptedConsole::headless()).await.unwrap();

    assert_eq!(report.attempted_count(), 2);
    let failures: Vec<(u64, &str)> = report.failures().map(|(i, m)| (i.id, m)).collect();
    assert_eq!(failures, vec![(11, "not reported by API")]);
}

#[tokio::test]
async fn declined_delete_sends_no_delete_request() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    mount_listing(&server, FILTER, vec![file_json(10, "a.mp4")]).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let op = DeleteContent {
        client: &client,
        filter: Some(FILTER.to_string()),
        policy: ConfirmPolicy::default(),
    };
    let mut console = ScriptedConsole::new(["No"]);
    let report = execute(&op, false, &mut console).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::Cancelled);
    assert_eq!(report.attempted_count(), 0);
}

#[tokio::test]
async fn dry_run_delete_lists_items_and_sends_no_delete_request() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    mount_listing(&server, FILTER, vec![file_json(10, "a.mp4"), file_json(11, "b.mp4")]).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let op = DeleteContent {
        client: &client,
        filter: Some(FILTER.to_string()),
        policy: ConfirmPolicy { force_bypass: true, non_interactive: false },
    };
    let mut console = ScriptedConsole::headless();
    let report = execute(&op, true, &mut console).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::DryRun);
    assert_eq!(report.preview.len(), 2);
    assert_eq!(console.prompts(), 0);
}

#[tokio::test]
async fn json_mode_without_yes_refuses_to_delete() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    mount_listing(&server, FILTER, vec![file_json(10, "a.mp4")]).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let op = DeleteContent {
        client: &client,
        filter: Some(FILTER.to_string()),
        policy: ConfirmPolicy { force_bypass: false, non_interactive: true },
    };
    let mut console = ScriptedConsole::headless();
    let err = execute(&op, false, &mut console).await.unwrap_err();

    assert!(
        matches!(err, ExecutorError::Gate(GateError::BypassRequired { .. })),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn empty_filter_match_short_circuits() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    mount_listing(&server, FILTER, vec![]).await;

    let op = DeleteContent {
        client: &client,
        filter: Some(FILTER.to_string()),
        policy: ConfirmPolicy::default(),
    };
    let mut console = ScriptedConsole::headless();
    let report = execute(&op, false, &mut console).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::NothingMatched);
    assert_eq!(report.attempted_count(), 0);
    assert_eq!(console.prompts(), 0);
}

#[tokio::test]
async fn failed_bulk_call_is_a_commit_error() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    mount_listing(&server, FILTER, vec![file_json(10, "a.mp4")]).await;
    Mock::given(method("DELETE"))
        .and(path("Content"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let op = DeleteContent {
        client: &client,
        filter: Some(FILTER.to_string()),
        policy: ConfirmPolicy { force_bypass: true, non_interactive: false },
    };
    let mut console = ScriptedConsole::headless();
    let err = execute(&op, false, &mut console).await.unwrap_err();

    assert!(matches!(err, ExecutorError::CommitFailed(_)), "got: {err:?}");
}

// ── DownloadContent ────────────────────────────────────────────────────

async fn mount_download(server: &MockServer, id: u64, bytes: &'static [u8]) {
    let signed = format!("{}/signed/{id}", server.uri());
    Mock::given(method("GET"))
        .and(path(format!("Content/{id}/DownloadUrl")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"url": signed})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("signed/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;
}

#[tokio::test]
async fn download_writes_files_without_prompting_into_empty_dir() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let dir = tempfile::tempdir().unwrap();
    mount_listing(&server, FILTER, vec![file_json(1, "a.mp4"), file_json(2, "b.png")]).await;
    mount_download(&server, 1, b"video-bytes").await;
    mount_download(&server, 2, b"image-bytes").await;

    let op = DownloadContent {
        client: &client,
        filter: Some(FILTER.to_string()),
        output_dir: dir.path().to_path_buf(),
        policy: ConfirmPolicy::default(),
    };
    let mut console = ScriptedConsole::headless();
    let report = execute(&op, false, &mut console).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::Committed);
    assert_eq!(report.succeeded_ids().len(), 2);
    assert_eq!(console.prompts(), 0);
    assert_eq!(std::fs::read(dir.path().join("a.mp4")).unwrap(), b"video-bytes");
    assert_eq!(std::fs::read(dir.path().join("b.png")).unwrap(), b"image-bytes");
}

#[tokio::test]
async fn download_asks_before_overwriting_and_keeps_going_after_a_failure() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.mp4"), b"old").unwrap();

    mount_listing(&server, FILTER, vec![file_json(1, "a.mp4"), file_json(2, "b.png")]).await;
    Mock::given(method("GET"))
        .and(path("Content/1/DownloadUrl"))
        .respond_with(ResponseTemplate::new(410).set_body_string("expired"))
        .mount(&server)
        .await;
    mount_download(&server, 2, b"image-bytes").await;

    let op = DownloadContent {
        client: &client,
        filter: Some(FILTER.to_string()),
        output_dir: dir.path().to_path_buf(),
        policy: ConfirmPolicy::default(),
    };
    let mut console = ScriptedConsole::new(["y"]);
    let report = execute(&op, false, &mut console).await.unwrap();

    assert_eq!(console.prompts(), 1);
    assert!(console.saw("Overwrite 1 existing file"));
    assert_eq!(report.attempted_count(), 2);
    assert!(report.outcomes().contains(&ItemOutcome::Succeeded { id: 2 }));
    assert!(report.has_failures());
    assert_eq!(std::fs::read(dir.path().join("a.mp4")).unwrap(), b"old");
}
