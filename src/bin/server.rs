//! HTTP server for the Ustaad AI chat backend
//!
//! Simple HTTP server using tokio and basic HTTP handling. The vector
//! store connection is established before the listening port binds; if it
//! cannot be, the process exits.

use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};
use ustaad_ai::config::Config;
use ustaad_ai::server::{self, AppState, RouteResponse};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("🚀 Starting Ustaad AI server...");

    // Fail fast: no listening socket without a reachable knowledge base.
    let state = Arc::new(server::build_state(&config).await?);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("✅ Server listening on port {}", config.port);

    loop {
        let (stream, addr) = listener.accept().await?;
        info!("📥 New connection from: {}", addr);
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, state).await {
                error!("Connection error: {}", e);
            }
        });
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<AppState>) -> std::io::Result<()> {
    let request = read_http_request(&mut stream).await?;

    let response = match parse_request(&request) {
        Some((method, path, body)) => server::handle_request(&state, &method, &path, &body).await,
        None => RouteResponse {
            status: 400,
            content_type: "application/json",
            body: r#"{"error":"Bad request"}"#.to_string(),
        },
    };

    stream.write_all(render_response(&response).as_bytes()).await?;
    stream.shutdown().await
}

/// Read headers plus a content-length delimited body.
async fn read_http_request(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut data: Vec<u8> = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let size = stream.read(&mut buffer).await?;
        if size == 0 {
            break data.len();
        }
        data.extend_from_slice(&buffer[..size]);
        if let Some(pos) = find_header_end(&data) {
            break pos;
        }
        // Ignore absurdly large headers
        if data.len() > 64 * 1024 {
            break data.len();
        }
    };

    let headers = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    let body_start = (header_end + 4).min(data.len());
    while data.len() - body_start < content_length {
        let size = stream.read(&mut buffer).await?;
        if size == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..size]);
    }

    Ok(String::from_utf8_lossy(&data).to_string())
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Split a raw HTTP request into method, normalized path and body.
fn parse_request(request: &str) -> Option<(String, String, String)> {
    let request_line = request.lines().next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let mut path = parts.next()?.to_string();

    // Remove query parameters if present
    if let Some(query_start) = path.find('?') {
        path.truncate(query_start);
    }

    // Normalize path (remove trailing slash except for root)
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    let body = request
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();

    Some((method, path, body))
}

fn render_response(response: &RouteResponse) -> String {
    let status_text = match response.status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Internal Server Error",
    };

    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {}",
        response.status,
        status_text,
        response.content_type,
        response.body.len(),
        response.body
    )
}
