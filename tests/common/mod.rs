// Shared helpers for integration tests: a tiny HTTP stub on a random port.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use serde_json::{json, Value};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use url::Url;

#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
}

impl Canned {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

pub struct Stub {
    pub addr: SocketAddr,
    /// Request targets (path + query) in arrival order.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl Stub {
    pub fn base(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Serve `routes` (keyed by path, query ignored) until the runtime stops.
/// Unknown paths get a 404.
pub async fn serve(routes: HashMap<String, Canned>) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);

    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = match sock.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => n,
                    };
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let head = String::from_utf8_lossy(&buf);
                let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                log.lock().unwrap().push(target.clone());
                let path = target.split('?').next().unwrap_or("/");

                let canned = routes.get(path).cloned().unwrap_or(Canned::status(404));
                let resp = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    canned.status,
                    reason(canned.status),
                    canned.body.len(),
                    canned.body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });

    Stub { addr, requests }
}

/// Request path for one series.
pub fn path(country: &str, indicator: &str) -> String {
    format!("/v2/country/{}/indicator/{}", country, indicator)
}

/// A World Bank style `[metadata, observations]` body.
pub fn wb_body(points: &[(&str, Option<f64>)]) -> String {
    let data: Vec<Value> = points
        .iter()
        .map(|(date, value)| {
            json!({
                "indicator": {"id": "NY.GDP.MKTP.KD.ZG", "value": "GDP growth (annual %)"},
                "country": {"id": "MX", "value": "Mexico"},
                "date": date,
                "value": value,
                "unit": "",
                "obs_status": "",
                "decimal": 1
            })
        })
        .collect();
    json!([
        {"page": 1, "pages": 1, "per_page": 2000, "total": points.len()},
        data
    ])
    .to_string()
}
