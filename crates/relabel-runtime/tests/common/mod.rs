//! Shared helpers for runtime integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use relabel_actor::Mailbox;
use relabel_event::{Message, MessageKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// How long a test waits for one expected message.
pub const WAIT: Duration = Duration::from_secs(5);

/// Receives until a message of `kind` arrives. Panics after [`WAIT`].
pub async fn next_of(inbox: &mut Mailbox, kind: MessageKind) -> Message {
    tokio::time::timeout(WAIT, async {
        loop {
            let delivery = inbox.recv().await.expect("mailbox open");
            if delivery.message.kind() == kind {
                return delivery.message;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no {kind} within {WAIT:?}"))
}

/// A canned HTTP answer for requests whose request line starts with `prefix`.
#[derive(Debug, Clone)]
pub struct Route {
    pub prefix: String,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn new(prefix: &str, status: u16, body: impl Into<String>) -> Self {
        Self {
            prefix: prefix.to_string(),
            status,
            body: body.into(),
        }
    }
}

/// A request seen by the mock server.
#[derive(Debug, Clone)]
pub struct Seen {
    pub line: String,
    pub body: String,
}

/// Minimal HTTP/1.1 server answering from a route table.
///
/// Every response closes its connection. Unmatched requests get 404.
pub struct MockServer {
    pub base_url: String,
    pub seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockServer {
    pub async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let base_url = format!("http://{}", listener.local_addr().expect("addr"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let _ = answer(stream, &routes, &log).await;
                });
            }
        });
        Self { base_url, seen }
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }
}

async fn answer(
    mut stream: TcpStream,
    routes: &[Route],
    log: &Mutex<Vec<Seen>>,
) -> std::io::Result<()> {
    let (line, body) = read_request(&mut stream).await?;
    log.lock().push(Seen {
        line: line.clone(),
        body,
    });

    let (status, body) = routes
        .iter()
        .find(|r| line.starts_with(&r.prefix))
        .map_or((404, r#"{"error":"no route"}"#.to_string()), |r| {
            (r.status, r.body.clone())
        });
    let response = format!(
        "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok((String::new(), String::new()));
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let line = head.lines().next().unwrap_or_default().to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Ok((line, body))
}
