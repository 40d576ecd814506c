//! Shared utilities for integration testing.

use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a mock origin that echoes the request line and the `x-foo` header
/// back in the response body, as `METHOD PATH|x-foo=VALUE`.
///
/// Every response carries `x-origin: hit` and `set-cookie: origin=1` so
/// header-merge behavior is observable end to end.
pub async fn start_echo_origin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut chunk = [0u8; 1024];
                        loop {
                            let n = socket.read(&mut chunk).await.unwrap_or(0);
                            if n == 0 {
                                break;
                            }
                            head.extend_from_slice(&chunk[..n]);
                            if head.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }

                        let head = String::from_utf8_lossy(&head);
                        let mut lines = head.lines();
                        let request_line = lines.next().unwrap_or_default();
                        let mut parts = request_line.split_whitespace();
                        let method = parts.next().unwrap_or_default();
                        let path = parts.next().unwrap_or_default();

                        let mut x_foo = String::new();
                        for line in lines {
                            if let Some(value) = line
                                .to_ascii_lowercase()
                                .strip_prefix("x-foo:")
                                .map(str::trim)
                            {
                                x_foo = value.to_string();
                            }
                        }

                        let body = format!("{method} {path}|x-foo={x_foo}");
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nx-origin: hit\r\nset-cookie: origin=1\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
