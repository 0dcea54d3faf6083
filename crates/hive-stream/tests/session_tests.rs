//! End-to-end stream session tests against a local one-shot HTTP
//! fixture that serves a canned NDJSON body and then closes (or
//! hangs, for the teardown test).

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::timeout;

use hive_stream::{SessionState, StreamSession};

const RESPONSE_HEAD: &str =
    "HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson\r\nconnection: close\r\n\r\n";

fn entry_line(id: u64, message: &str, forks: u64) -> String {
    format!(
        r#"{{"id":{id},"timestamp":"2026-01-01T10:00:00","level":"INFO","message":"{message}","agent_id":"agent-one","payload":{{}},"forks":{forks},"hashrate":"1 TH/s","strategy_name":"S"}}"#
    ) + "\n"
}

/// Serve one connection: write the canned head + body chunks with a
/// small pause between chunks, then either close or hold the socket
/// open forever.
async fn serve_once(chunks: Vec<Vec<u8>>, hold_open: bool) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fixture");
    let addr = listener.local_addr().expect("fixture addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket.write_all(RESPONSE_HEAD.as_bytes()).await.expect("write head");
        for chunk in chunks {
            socket.write_all(&chunk).await.expect("write chunk");
            socket.flush().await.expect("flush chunk");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        if hold_open {
            tokio::time::sleep(Duration::from_secs(600)).await;
        }
    });
    addr
}

#[tokio::test]
async fn test_scenario_entry_update_entry() {
    let body = vec![
        entry_line(1, "first", 0).into_bytes(),
        b"{\"type\":\"fork_update\",\"log_id\":1,\"forks\":3}\n".to_vec(),
        entry_line(2, "second", 0).into_bytes(),
    ];
    let addr = serve_once(body, false).await;

    let (_tx, rx) = watch::channel(false);
    let session = StreamSession::new(&format!("http://{addr}"), 50, rx);
    let shared = session.shared();

    timeout(Duration::from_secs(10), session.run())
        .await
        .expect("session must finish")
        .expect("graceful close is not an error");

    let state = shared.read().await;
    assert_eq!(state.session, SessionState::Closed);
    assert!(!state.connected, "connection flag drops on stream end");

    let ids: Vec<u64> = state.feed.entries().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2], "apply order is newline order");
    let first = state.feed.entries().next().unwrap();
    assert_eq!(first.forks, Some(3), "fork update must land on entry 1");
    assert_eq!(first.message, "first", "fork update must touch nothing else");
}

#[tokio::test]
async fn test_malformed_line_does_not_abort_the_session() {
    let body = vec![
        entry_line(1, "before", 0).into_bytes(),
        b"{this is not json}\n".to_vec(),
        entry_line(2, "after", 0).into_bytes(),
    ];
    let addr = serve_once(body, false).await;

    let (_tx, rx) = watch::channel(false);
    let session = StreamSession::new(&format!("http://{addr}"), 50, rx);
    let shared = session.shared();

    timeout(Duration::from_secs(10), session.run())
        .await
        .expect("session must finish")
        .expect("a malformed line is local, not fatal");

    let state = shared.read().await;
    assert_eq!(state.feed.len(), 2, "both valid entries must be applied");
    assert_eq!(state.malformed_lines, 1);
    assert_eq!(state.session, SessionState::Closed);
}

#[tokio::test]
async fn test_record_split_across_reads_is_applied_once() {
    let line = entry_line(9, "split across reads", 0);
    let bytes = line.as_bytes();
    let mid = bytes.len() / 2;
    let body = vec![bytes[..mid].to_vec(), bytes[mid..].to_vec()];
    let addr = serve_once(body, false).await;

    let (_tx, rx) = watch::channel(false);
    let session = StreamSession::new(&format!("http://{addr}"), 50, rx);
    let shared = session.shared();

    timeout(Duration::from_secs(10), session.run())
        .await
        .expect("session must finish")
        .expect("graceful close");

    let state = shared.read().await;
    assert_eq!(state.feed.len(), 1);
    assert_eq!(state.malformed_lines, 0, "neither half may be parsed alone");
    assert_eq!(state.feed.entries().next().unwrap().id, 9);
}

#[tokio::test]
async fn test_connect_refused_fails_the_session() {
    // Bind and immediately drop to get a port with nothing listening.
    let dead = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = dead.local_addr().expect("addr");
    drop(dead);

    let (_tx, rx) = watch::channel(false);
    let session = StreamSession::new(&format!("http://{addr}"), 50, rx);
    let shared = session.shared();

    let result = timeout(Duration::from_secs(10), session.run())
        .await
        .expect("session must finish");
    assert!(result.is_err(), "refused connection must fail the session");

    let state = shared.read().await;
    assert_eq!(state.session, SessionState::Failed);
    assert!(!state.connected);
    assert!(state.feed.is_empty(), "no partial record may be applied");
}

#[tokio::test]
async fn test_error_status_fails_the_session() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
            .await
            .expect("write response");
    });

    let (_tx, rx) = watch::channel(false);
    let session = StreamSession::new(&format!("http://{addr}"), 50, rx);
    let shared = session.shared();

    let result = timeout(Duration::from_secs(10), session.run())
        .await
        .expect("session must finish");
    assert!(result.is_err());
    assert_eq!(shared.read().await.session, SessionState::Failed);
}

#[tokio::test]
async fn test_teardown_abandons_the_read_loop() {
    // One entry, then the socket is held open with no further data.
    let body = vec![entry_line(1, "only", 0).into_bytes()];
    let addr = serve_once(body, true).await;

    let (tx, rx) = watch::channel(false);
    let session = StreamSession::new(&format!("http://{addr}"), 50, rx);
    let shared = session.shared();
    let handle = tokio::spawn(session.run());

    // Wait for the entry to land.
    timeout(Duration::from_secs(10), async {
        loop {
            if shared.read().await.feed.len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("entry must arrive before teardown");

    tx.send(true).expect("signal teardown");

    let result = timeout(Duration::from_secs(10), handle)
        .await
        .expect("teardown must not block")
        .expect("task join");
    assert!(result.is_ok(), "teardown is not an error");

    let state = shared.read().await;
    assert_eq!(state.session, SessionState::Closed);
    assert!(!state.connected);
    assert_eq!(state.feed.len(), 1, "no mutation after teardown");
}

#[tokio::test]
async fn test_teardown_abandons_a_stalled_connect() {
    // A peer that accepts the socket but never sends response
    // headers: the session stays in the connect await forever unless
    // teardown interrupts it.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.expect("accept");
        tokio::time::sleep(Duration::from_secs(600)).await;
    });

    let (tx, rx) = watch::channel(false);
    let session = StreamSession::new(&format!("http://{addr}"), 50, rx);
    let shared = session.shared();
    let handle = tokio::spawn(session.run());

    // Wait for the connect attempt to start, then tear down.
    timeout(Duration::from_secs(10), async {
        loop {
            if shared.read().await.session == SessionState::Connecting {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session must reach the connect phase");

    tx.send(true).expect("signal teardown");

    let result = timeout(Duration::from_secs(2), handle)
        .await
        .expect("teardown must abandon the in-flight connect promptly")
        .expect("task join");
    assert!(result.is_ok(), "teardown is not an error");

    let state = shared.read().await;
    assert_eq!(state.session, SessionState::Closed);
    assert!(!state.connected);
    assert!(state.feed.is_empty());
}

#[tokio::test]
async fn test_bound_holds_under_a_long_stream() {
    let body: Vec<Vec<u8>> = (1..=60).map(|id| entry_line(id, "m", 0).into_bytes()).collect();
    let addr = serve_once(body, false).await;

    let (_tx, rx) = watch::channel(false);
    let session = StreamSession::new(&format!("http://{addr}"), 50, rx);
    let shared = session.shared();

    timeout(Duration::from_secs(30), session.run())
        .await
        .expect("session must finish")
        .expect("graceful close");

    let state = shared.read().await;
    assert_eq!(state.feed.len(), 50);
    assert_eq!(state.feed.entries().next().map(|e| e.id), Some(11));
    assert_eq!(state.feed.entries().last().map(|e| e.id), Some(60));
}
