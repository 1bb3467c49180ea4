//! Shared E2E helpers for `relabel` binary tests.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Per-command timeout.
pub const TIMEOUT: Duration = Duration::from_secs(20);

/// Environment variables that would leak host configuration into a test.
const RELABEL_VARS: &[&str] = &[
    "RELABEL_DEBUG",
    "RELABEL_API_URL",
    "RELABEL_API_TIMEOUT_MS",
    "RELABEL_RESTORE_TIMEOUT_MS",
    "RELABEL_STORE_DIR",
    "RELABEL_LOG_FILE",
    "RELABEL_LOG_LEVEL",
    "RUST_LOG",
];

/// Isolated home, project root and cache for one test.
pub struct Sandbox {
    pub dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create sandbox dir"),
        }
    }

    /// `relabel` with HOME, project root and store inside the sandbox.
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd: assert_cmd::Command = cargo_bin_cmd!("relabel");
        cmd.timeout(TIMEOUT);
        for var in RELABEL_VARS {
            cmd.env_remove(var);
        }
        let root = self.dir.path();
        cmd.env("HOME", root)
            .env("RELABEL_API_TIMEOUT_MS", "5000")
            .arg("-C")
            .arg(root)
            .arg("--store-dir")
            .arg(root.join("db"));
        cmd
    }
}

/// One canned answer, matched on the start of the request line.
#[derive(Clone)]
pub struct Route {
    pub prefix: &'static str,
    pub status: u16,
    pub body: String,
}

pub fn route(prefix: &'static str, status: u16, body: impl Into<String>) -> Route {
    Route {
        prefix,
        status,
        body: body.into(),
    }
}

/// Minimal threaded HTTP/1.1 server. Unmatched requests get 404.
pub struct MockServer {
    pub url: String,
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockServer {
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let url = format!("http://{}", listener.local_addr().expect("addr"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        std::thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = answer(stream, &routes, &log);
            }
        });
        Self { url, seen }
    }

    /// `(request line, body)` of every request so far.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.seen.lock().expect("lock").clone()
    }
}

/// A URL nothing listens on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

fn answer(
    mut stream: TcpStream,
    routes: &[Route],
    log: &Mutex<Vec<(String, String)>>,
) -> std::io::Result<()> {
    let (line, body) = read_request(&mut stream)?;
    log.lock().expect("lock").push((line.clone(), body));

    let (status, body) = routes
        .iter()
        .find(|r| line.starts_with(r.prefix))
        .map_or((404, r#"{"error":"no route"}"#.to_string()), |r| {
            (r.status, r.body.clone())
        });
    write!(
        stream,
        "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()
}

fn read_request(stream: &mut TcpStream) -> std::io::Result<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk)?;
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
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let line = head.lines().next().unwrap_or_default().to_string();
    Ok((line, String::from_utf8_lossy(&buf[header_end..]).to_string()))
}
