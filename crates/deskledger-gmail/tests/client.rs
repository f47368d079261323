//! Integration tests for the Gmail client.
//!
//! A local TCP listener plays the Gmail API, answering each connection
//! with the next canned response and recording the request line it saw.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::Ipv4Addr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use deskledger_gmail::{Error, GmailClient};

/// Canned HTTP response.
struct Canned {
    status: &'static str,
    headers: &'static str,
    body: &'static str,
}

const fn ok(body: &'static str) -> Canned {
    Canned {
        status: "200 OK",
        headers: "",
        body,
    }
}

/// Starts the mock server and returns its base URL and a handle yielding
/// the request lines in arrival order.
async fn serve(responses: Vec<Canned>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for canned in responses {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            let head = String::from_utf8_lossy(&head).to_string();
            seen.push(head.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\n{}\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                canned.status,
                canned.headers,
                canned.body.len(),
                canned.body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        seen
    });

    (format!("http://127.0.0.1:{port}/gmail/v1"), handle)
}

fn client(base_url: &str) -> GmailClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    GmailClient::new("test-token")
        .with_http_client(http)
        .with_base_url(base_url)
        .with_initial_backoff(Duration::from_millis(10))
}

#[tokio::test]
async fn test_list_labels() {
    let (base, server) = serve(vec![ok(r#"{"labels": [
        {"id": "INBOX", "name": "INBOX", "type": "system"},
        {"id": "Label_3", "name": "Setor Compras", "type": "user"}
    ]}"#)])
    .await;

    let labels = client(&base).list_labels().await.unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[1].name, "Setor Compras");

    let requests = server.await.unwrap();
    assert_eq!(requests[0], "GET /gmail/v1/users/me/labels HTTP/1.1");
}

#[tokio::test]
async fn test_list_thread_ids_follows_pages() {
    let (base, server) = serve(vec![
        ok(r#"{"threads": [{"id": "a"}, {"id": "b"}], "nextPageToken": "p2"}"#),
        ok(r#"{"threads": [{"id": "c"}]}"#),
    ])
    .await;

    let ids = client(&base)
        .with_page_size(2)
        .list_thread_ids(Some("label:inbox"), None)
        .await
        .unwrap();
    assert_eq!(ids, vec!["a", "b", "c"]);

    let requests = server.await.unwrap();
    assert!(requests[0].contains("maxResults=2"));
    assert!(requests[0].contains("q=label%3Ainbox"));
    assert!(!requests[0].contains("pageToken"));
    assert!(requests[1].contains("pageToken=p2"));
}

#[tokio::test]
async fn test_list_thread_ids_stops_at_limit() {
    let (base, server) = serve(vec![ok(
        r#"{"threads": [{"id": "a"}, {"id": "b"}, {"id": "c"}], "nextPageToken": "p2"}"#,
    )])
    .await;

    let ids = client(&base).list_thread_ids(None, Some(2)).await.unwrap();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(server.await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_thread_ids_empty_mailbox() {
    let (base, server) = serve(vec![ok(r#"{"resultSizeEstimate": 0}"#)]).await;

    let ids = client(&base).list_thread_ids(None, None).await.unwrap();
    assert!(ids.is_empty());
    server.await.unwrap();
}

#[tokio::test]
async fn test_get_thread_requests_metadata() {
    let (base, server) = serve(vec![ok(r#"{
        "id": "t1",
        "messages": [{
            "id": "m1",
            "labelIds": ["INBOX"],
            "internalDate": "1700000000000",
            "payload": {"headers": [{"name": "From", "value": "a@b.c"}]}
        }]
    }"#)])
    .await;

    let thread = client(&base).get_thread("t1").await.unwrap();
    let conversation = thread.into_conversation();
    assert_eq!(conversation.messages[0].header("From"), Some("a@b.c"));

    let requests = server.await.unwrap();
    let line = &requests[0];
    assert!(line.starts_with("GET /gmail/v1/users/me/threads/t1?"));
    assert!(line.contains("format=metadata"));
    for header in ["Subject", "From", "To", "Date"] {
        assert!(line.contains(&format!("metadataHeaders={header}")), "{line}");
    }
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let (base, server) = serve(vec![
        Canned {
            status: "429 Too Many Requests",
            headers: "Retry-After: 0\r\n",
            body: r#"{"error": {"code": 429}}"#,
        },
        ok(r#"{"labels": []}"#),
    ])
    .await;

    let labels = client(&base).list_labels().await.unwrap();
    assert!(labels.is_empty());
    assert_eq!(server.await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_persistent_rate_limit_gives_up_without_final_wait() {
    const LIMITED: Canned = Canned {
        status: "429 Too Many Requests",
        headers: "Retry-After: 0\r\n",
        body: "{}",
    };
    let (base, server) = serve(vec![
        LIMITED,
        LIMITED,
        LIMITED,
        LIMITED,
        Canned {
            status: "429 Too Many Requests",
            headers: "Retry-After: 3600\r\n",
            body: "{}",
        },
    ])
    .await;

    let result = tokio::time::timeout(Duration::from_secs(10), client(&base).list_labels())
        .await
        .expect("client kept waiting after the last attempt");
    assert!(matches!(result, Err(Error::RateLimited(5))));
    assert_eq!(server.await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_api_error_status() {
    let (base, server) = serve(vec![Canned {
        status: "404 Not Found",
        headers: "",
        body: r#"{"error": {"code": 404, "message": "Requested entity was not found."}}"#,
    }])
    .await;

    let err = client(&base).get_thread("missing").await.unwrap_err();
    match err {
        Error::Api { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_is_detected() {
    let (base, server) = serve(vec![Canned {
        status: "401 Unauthorized",
        headers: "",
        body: "{}",
    }])
    .await;

    let err = client(&base).list_labels().await.unwrap_err();
    assert!(err.is_unauthorized());
    server.await.unwrap();
}
