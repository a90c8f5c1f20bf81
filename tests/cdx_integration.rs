//! Integration tests for the archive API layer.
//!
//! These tests verify the CDX fetcher and snapshot verifier against mock
//! HTTP servers.

use std::time::Duration;

use waybackscan_core::{
    AbortOnExhaustion, ArchiveClient, ArchiveEndpoints, CdxFetcher, RetryPolicy, SnapshotVerifier,
    UrlRecord,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client whose CDX and availability endpoints both point at the mock server.
fn client_for(server: &MockServer) -> ArchiveClient {
    ArchiveClient::with_endpoints(ArchiveEndpoints {
        cdx_base: server.uri(),
        availability_base: server.uri(),
    })
}

/// A fast retry schedule so failure tests do not sleep for real.
fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(Duration::from_millis(1))
}

const CDX_BODY: &str = r#"["original","timestamp"]
["http://example.com/docs/report.pdf","20240301000000"]
["http://example.com/docs/old-report.pdf","20180101000000"]
not a json row
["http://example.com/index.html","20200101000000"]
["http://example.com/no-extension/","20200101000000"]
"#;

#[tokio::test]
async fn test_cdx_fetch_buckets_rows_by_extension() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CDX_BODY))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fetcher = CdxFetcher::new(&client, fast_policy());
    let buckets = fetcher.fetch_domain("example.com", &AbortOnExhaustion).await;

    let counts = buckets.counts();
    assert_eq!(counts.get("pdf"), Some(&2));
    assert_eq!(counts.get("html"), Some(&1));
    // The malformed line and the extensionless URL contribute nothing.
    assert_eq!(buckets.total(), 3);
}

#[tokio::test]
async fn test_cdx_fetch_server_error_exhausts_attempts_and_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .respond_with(ResponseTemplate::new(503))
        .expect(5)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fetcher = CdxFetcher::new(&client, fast_policy());
    let buckets = fetcher.fetch_domain("example.com", &AbortOnExhaustion).await;

    assert!(buckets.is_empty());
}

#[tokio::test]
async fn test_cdx_fetch_recovers_after_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CDX_BODY))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fetcher = CdxFetcher::new(&client, fast_policy());
    let buckets = fetcher.fetch_domain("example.com", &AbortOnExhaustion).await;

    assert_eq!(buckets.total(), 3);
}

fn snapshot_body(url: &str, status: &str) -> String {
    format!(
        r#"{{"archived_snapshots": {{"closest": {{"url": "{url}", "status": "{status}", "timestamp": "20200101000000", "available": true}}}}}}"#
    )
}

#[tokio::test]
async fn test_verifier_enriches_only_live_snapshots() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .and(query_param("url", "http://example.com/a.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(snapshot_body("https://snap/a.pdf", "200")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .and(query_param("url", "http://example.com/b.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(snapshot_body("https://snap/b.pdf", "404")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .and(query_param("url", "http://example.com/c.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"archived_snapshots": {}}"#),
        )
        .mount(&server)
        .await;

    let records = vec![
        UrlRecord::from_capture("http://example.com/a.pdf", Some("2020".to_string())),
        UrlRecord::from_capture("http://example.com/b.pdf", Some("2020".to_string())),
        UrlRecord::from_capture("http://example.com/c.pdf", Some("2020".to_string())),
    ];

    let client = client_for(&server);
    let verifier = SnapshotVerifier::new(&client, 4);
    let verified = verifier.verify(records, None).await;

    assert_eq!(verified.len(), 3, "no record may be dropped or duplicated");
    let enriched: Vec<&UrlRecord> = verified
        .iter()
        .filter(|r| r.snapshot_url.is_some())
        .collect();
    assert_eq!(enriched.len(), 1);
    assert_eq!(enriched[0].url, "http://example.com/a.pdf");
    assert_eq!(
        enriched[0].snapshot_timestamp.as_deref(),
        Some("20200101000000")
    );
}

#[tokio::test]
async fn test_verifier_passes_records_through_on_endpoint_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let records = vec![
        UrlRecord::from_capture("http://example.com/a.pdf", Some("2020".to_string())),
        UrlRecord::from_capture("http://example.com/b.pdf", None),
    ];

    let client = client_for(&server);
    let verifier = SnapshotVerifier::new(&client, 2);
    let verified = verifier.verify(records, None).await;

    assert_eq!(verified.len(), 2);
    assert!(verified.iter().all(|r| r.snapshot_url.is_none()));
}
