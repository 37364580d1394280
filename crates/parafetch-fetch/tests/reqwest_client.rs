#![cfg(feature = "reqwest")]

use parafetch_fetch::{ChunkFetchError, Downloader, Error, FetchOptions, ReqwestClient};
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves `bytes=a-b` requests with 206 and anything else with the full body.
struct RangeResponder(Vec<u8>);

impl Respond for RangeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let range = request
            .headers
            .get("range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("bytes="))
            .and_then(|v| v.split_once('-'))
            .and_then(|(s, e)| Some((s.parse::<usize>().ok()?, e.parse::<usize>().ok()?)));

        match range {
            Some((start, end)) => {
                let end = end.min(self.0.len() - 1);
                ResponseTemplate::new(206)
                    .insert_header(
                        "Content-Range",
                        format!("bytes {start}-{end}/{}", self.0.len()).as_str(),
                    )
                    .set_body_bytes(self.0[start..=end].to_vec())
            }
            None => ResponseTemplate::new(200).set_body_bytes(self.0.clone()),
        }
    }
}

fn payload(len: usize) -> Vec<u8> { (0..len).map(|i| (i * 7 % 256) as u8).collect() }

async fn serve(body: &[u8], head: ResponseTemplate, get: impl Respond + 'static) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/files/data.bin"))
        .respond_with(head.set_body_bytes(body.to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/data.bin"))
        .respond_with(get)
        .mount(&server)
        .await;
    server
}

async fn range_gets(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET" && r.headers.contains_key("range"))
        .count()
}

#[tokio::test]
async fn test_download_over_http() {
    let body = payload(10_000);
    let head = ResponseTemplate::new(200).insert_header("Accept-Ranges", "bytes");
    let server = serve(&body, head, RangeResponder(body.clone())).await;

    let dir = tempdir().unwrap();
    let out = dir.path().join("data.bin");
    let downloader = Downloader::new(ReqwestClient::new().unwrap())
        .with_options(FetchOptions::default().workers(5));

    let url = format!("{}/files/data.bin", server.uri());
    downloader.download(&url, Some(&out)).await.unwrap();

    assert_eq!(std::fs::read(&out).unwrap(), body);
    assert_eq!(range_gets(&server).await, 5);
}

#[tokio::test]
async fn test_probe_reads_headers() {
    let body = payload(321);
    let head = ResponseTemplate::new(200)
        .insert_header("Accept-Ranges", "bytes")
        .insert_header("Content-Disposition", "attachment; filename=\"named.bin\"");
    let server = serve(&body, head, RangeResponder(body.clone())).await;

    let downloader = Downloader::new(ReqwestClient::new().unwrap());
    let info = downloader
        .probe(&format!("{}/files/data.bin", server.uri()))
        .await
        .unwrap();

    assert_eq!(info.total_len, 321);
    assert!(info.supports_range);
    assert_eq!(info.suggested_name.as_deref(), Some("named.bin"));
}

#[tokio::test]
async fn test_server_ignoring_range_fails_the_job() {
    let body = payload(1000);
    let head = ResponseTemplate::new(200).insert_header("Accept-Ranges", "bytes");
    let full = ResponseTemplate::new(200).set_body_bytes(body.clone());
    let server = serve(&body, head, full).await;

    let dir = tempdir().unwrap();
    let out = dir.path().join("data.bin");
    let downloader = Downloader::new(ReqwestClient::new().unwrap())
        .with_options(FetchOptions::default().workers(4));

    let err = downloader
        .download(&format!("{}/files/data.bin", server.uri()), Some(&out))
        .await
        .unwrap_err();

    assert!(matches!(
        err.root_chunk_failure(),
        Some(ChunkFetchError::UnexpectedStatus { status: 200, .. })
    ));
    assert!(!out.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_accept_ranges_is_unsupported() {
    let body = payload(100);
    let server = serve(&body, ResponseTemplate::new(200), RangeResponder(body.clone())).await;

    let dir = tempdir().unwrap();
    let downloader = Downloader::new(ReqwestClient::new().unwrap());
    let err = downloader
        .download(
            &format!("{}/files/data.bin", server.uri()),
            Some(&dir.path().join("data.bin")),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedRange { .. }));
    assert_eq!(range_gets(&server).await, 0);
}

#[tokio::test]
async fn test_probe_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let downloader = Downloader::new(ReqwestClient::new().unwrap());
    let err = downloader
        .probe(&format!("{}/missing.bin", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Probe { .. }));
}
