//! Shared utilities for integration testing.

use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

use secure_uploads::config::ServiceConfig;
use secure_uploads::lifecycle::{build_server, Shutdown};
use secure_uploads::HttpServer;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const PHOTO: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg";
pub const REPORT: &[u8] = b"%PDF-1.7 fake";

/// A static root populated with the files the scenarios expect.
pub fn asset_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("photo.jpg"), PHOTO).unwrap();
    fs::write(dir.path().join("report.pdf"), REPORT).unwrap();
    fs::write(dir.path().join(".env"), b"SECRET=hunter2").unwrap();
    fs::write(dir.path().join("data.json"), b"{\"ok\":true}").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/clip.mp4"), b"mp4").unwrap();
    dir
}

pub fn config_for(dir: &TempDir) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.assets.static_root = dir.path().display().to_string();
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

pub fn server_for(dir: &TempDir) -> HttpServer {
    build_server(config_for(dir)).unwrap()
}

/// Start the server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(dir: &TempDir) -> (SocketAddr, Shutdown) {
    let server = server_for(dir);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown)
}

/// Response read off a raw socket.
#[allow(dead_code)]
pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: String,
}

/// Send `GET {target}` byte-for-byte, bypassing any client-side URL
/// normalization.
#[allow(dead_code)]
pub async fn raw_get(addr: SocketAddr, target: &str) -> RawResponse {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"
    );
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    socket.read_to_end(&mut buf).await.unwrap();
    let text = String::from_utf8_lossy(&buf).into_owned();

    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((text.as_str(), ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    RawResponse {
        status,
        head: head.to_ascii_lowercase(),
        body: body.to_string(),
    }
}
