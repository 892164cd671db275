use satchel_core::{DriveClient, ResourceType};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn stat_sends_bearer_token_and_encodes_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/drive/resources"))
        .and(query_param("path", "/Docs/Hello World.txt"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": "/Docs/Hello World.txt",
            "name": "Hello World.txt",
            "type": "file",
            "size": 12,
            "modified": "2024-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let resource = client.stat("/Docs/Hello World.txt").await.unwrap();

    assert_eq!(resource.resource_type, ResourceType::File);
    assert_eq!(resource.size, Some(12));
}

#[tokio::test]
async fn exists_folds_not_found_to_false() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/drive/resources"))
        .and(query_param("path", "/Docs/Missing.txt"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found"
        })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    assert!(!client.exists("/Docs/Missing.txt").await.unwrap());
}

#[tokio::test]
async fn exists_keeps_other_api_failures_as_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/drive/resources"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let err = client.exists("/Docs/A.txt").await.expect_err("expected 503");

    assert!(err.to_string().contains("503"));
    assert!(err.to_string().contains("maintenance"));
}

#[tokio::test]
async fn download_link_returns_href() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/drive/resources/download"))
        .and(query_param("path", "/Docs/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "href": "https://cdn.example/report.pdf",
            "method": "GET",
            "templated": false
        })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let link = client.download_link("/Docs/report.pdf").await.unwrap();

    assert_eq!(link.href.as_str(), "https://cdn.example/report.pdf");
    assert_eq!(link.method, "GET");
}

#[tokio::test]
async fn list_directory_passes_paging_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/drive/list"))
        .and(query_param("path", "/Docs"))
        .and(query_param("limit", "2"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "limit": 2,
            "offset": 0,
            "total": 3,
            "items": [
                {
                    "path": "/Docs/A.txt",
                    "name": "A.txt",
                    "type": "file",
                    "size": 1
                },
                {
                    "path": "/Docs/Photos",
                    "name": "Photos",
                    "type": "dir"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let list = client.list_directory("/Docs", Some(2), Some(0)).await.unwrap();

    assert_eq!(list.total, 3);
    assert_eq!(list.items.len(), 2);
    assert_eq!(list.items[1].resource_type, ResourceType::Dir);
}

#[tokio::test]
async fn blocking_stat_matches_async_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/drive/resources"))
        .and(query_param("path", "/Docs/A.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": "/Docs/A.txt",
            "name": "A.txt",
            "type": "file",
            "size": 5
        })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    let resource = tokio::task::spawn_blocking(move || client.stat_blocking("/Docs/A.txt"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(resource.name, "A.txt");
    assert_eq!(resource.size, Some(5));
}
