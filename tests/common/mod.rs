//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use host_router::config::RouterConfig;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Start a backend on an ephemeral port that echoes what it received as JSON.
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let app = Router::new().fallback(move |request: Request<Body>| async move {
        let header = |key: &str| {
            request
                .headers()
                .get(key)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        Json(json!({
            "backend": name,
            "method": request.method().as_str(),
            "uri": request.uri().to_string(),
            "host": header("host"),
            "forwarded_for": header("x-forwarded-for"),
            "forwarded_host": header("x-forwarded-host"),
            "request_id": header("x-request-id"),
        }))
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that accepts `Upgrade: echo` and then echoes every byte back.
/// Requests without that header get a plain `400`.
#[allow(dead_code)]
pub async fn start_upgrade_backend() -> SocketAddr {
    let app = Router::new().fallback(|mut request: Request<Body>| async move {
        let wants_echo = request
            .headers()
            .get(header::UPGRADE)
            .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"echo"));
        if !wants_echo {
            return StatusCode::BAD_REQUEST.into_response();
        }

        let on_upgrade = hyper::upgrade::on(&mut request);
        tokio::spawn(async move {
            let Ok(upgraded) = on_upgrade.await else {
                return;
            };
            let mut io = TokioIo::new(upgraded);
            let mut buf = [0u8; 1024];
            loop {
                match io.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if io.write_all(&buf[..n]).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Response::builder()
            .status(StatusCode::SWITCHING_PROTOCOLS)
            .header(header::CONNECTION, "upgrade")
            .header(header::UPGRADE, "echo")
            .body(Body::empty())
            .unwrap()
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Router config bound to loopback on ephemeral ports.
#[allow(dead_code)]
pub fn test_config(rules_path: &Path) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.listener.bind_address = "127.0.0.1".into();
    config.listener.main_port = 0;
    config.listener.manage_port = 0;
    config.storage.rules_path = rules_path.display().to_string();
    config
}

/// Client without connection reuse so every test request opens a fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Send `GET path` to the entry listener with the given Host header.
pub async fn get_via(entry: SocketAddr, host: &str, path: &str) -> reqwest::Response {
    client()
        .get(format!("http://{entry}{path}"))
        .header("host", host)
        .send()
        .await
        .expect("Router unreachable")
}

#[allow(dead_code)]
pub async fn echo(response: reqwest::Response) -> Value {
    response.json().await.unwrap()
}
