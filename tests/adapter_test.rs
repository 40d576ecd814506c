//! End-to-end tests for the header-directive protocol.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{header, Response, StatusCode};
use tokio::net::TcpListener;

use middleware_adapter::config::{upstream_url, AdapterConfig};
use middleware_adapter::http::{HttpFetcher, HttpServer};
use middleware_adapter::middleware::{
    InvocationContext, Middleware, MiddlewareFuture, MiddlewareWorker, StaticModuleLoader,
};

mod common;

/// Middleware exercising every directive, keyed off the request path.
struct DirectiveMiddleware {
    external_base: String,
}

impl Middleware for DirectiveMiddleware {
    fn handle<'a>(
        &'a self,
        request: &'a Parts,
        _ctx: &'a mut InvocationContext,
    ) -> MiddlewareFuture<'a> {
        let path = request.uri.path().to_string();
        Box::pin(async move {
            let response = match path.as_str() {
                "/direct" => Some(
                    Response::builder()
                        .header("x-mw", "1")
                        .body(Body::from("direct body"))
                        .unwrap(),
                ),
                "/redirect" => Some(
                    Response::builder()
                        .status(StatusCode::TEMPORARY_REDIRECT)
                        .header(header::LOCATION, "https://elsewhere.example/login")
                        .body(Body::from("redirect carcass"))
                        .unwrap(),
                ),
                "/next" => Some(
                    Response::builder()
                        .header("x-middleware-next", "1")
                        .header("x-extra", "mw")
                        .header(header::SET_COOKIE, "mw=2")
                        .body(Body::empty())
                        .unwrap(),
                ),
                "/override" => Some(
                    Response::builder()
                        .header("x-middleware-override-headers", "x-foo")
                        .header("x-middleware-request-x-foo", "newval")
                        .header("x-middleware-next", "1")
                        .body(Body::empty())
                        .unwrap(),
                ),
                "/rewrite" => Some(
                    Response::builder()
                        .header(
                            "x-middleware-rewrite",
                            format!("{}/rewritten", self.external_base),
                        )
                        .header(header::SET_COOKIE, "mw=2")
                        .body(Body::empty())
                        .unwrap(),
                ),
                _ => None,
            };
            Ok(response)
        })
    }
}

async fn start_adapter(middleware: Arc<dyn Middleware>, upstream: SocketAddr) -> SocketAddr {
    let mut config = AdapterConfig::default();
    config.upstream.url = format!("http://{upstream}");
    let base = upstream_url(&config).unwrap();

    let loader = StaticModuleLoader::new(middleware);
    let worker = MiddlewareWorker::load(
        &loader,
        base,
        config.env.clone(),
        Arc::new(HttpFetcher::new()),
    )
    .await
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, Arc::new(worker));
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

async fn full_setup() -> (SocketAddr, SocketAddr) {
    let origin = common::start_echo_origin().await;
    let external = common::start_echo_origin().await;
    let adapter = start_adapter(
        Arc::new(DirectiveMiddleware {
            external_base: format!("http://{external}"),
        }),
        origin,
    )
    .await;
    (adapter, external)
}

#[tokio::test]
async fn test_no_response_continues_to_origin() {
    let (adapter, _) = full_setup().await;

    let res = client()
        .get(format!("http://{adapter}/a?b=1"))
        .send()
        .await
        .expect("Adapter unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("x-origin").unwrap(), "hit");
    assert_eq!(res.text().await.unwrap(), "GET /a?b=1|x-foo=");
}

#[tokio::test]
async fn test_next_directive_fetches_origin_and_merges_headers() {
    let (adapter, _) = full_setup().await;

    let res = client()
        .get(format!("http://{adapter}/next"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("x-middleware-next").is_none());
    assert_eq!(res.headers().get("x-extra").unwrap(), "mw");
    assert_eq!(res.headers().get("x-origin").unwrap(), "hit");

    let cookies: Vec<_> = res.headers().get_all(header::SET_COOKIE).iter().collect();
    assert!(cookies.iter().any(|c| c.to_str().unwrap() == "origin=1"));
    assert!(cookies.iter().any(|c| c.to_str().unwrap() == "mw=2"));

    assert_eq!(res.text().await.unwrap(), "GET /next|x-foo=");
}

#[tokio::test]
async fn test_direct_response_bypasses_origin() {
    let (adapter, _) = full_setup().await;

    let res = client()
        .get(format!("http://{adapter}/direct"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("x-mw").unwrap(), "1");
    assert!(res.headers().get("x-origin").is_none());
    assert_eq!(res.text().await.unwrap(), "direct body");
}

#[tokio::test]
async fn test_redirect_keeps_location_and_drops_body() {
    let (adapter, _) = full_setup().await;

    let res = client()
        .get(format!("http://{adapter}/redirect"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 307);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "https://elsewhere.example/login"
    );
    assert_eq!(res.text().await.unwrap(), "");
}

#[tokio::test]
async fn test_override_headers_reach_the_origin() {
    let (adapter, _) = full_setup().await;

    let res = client()
        .get(format!("http://{adapter}/override"))
        .header("x-foo", "oldval")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("x-middleware-override-headers").is_none());
    assert!(res.headers().get("x-middleware-request-x-foo").is_none());
    assert!(res.headers().get("x-middleware-next").is_none());
    // The origin saw the overridden value.
    assert_eq!(res.text().await.unwrap(), "GET /override|x-foo=newval");
}

#[tokio::test]
async fn test_external_rewrite_fetches_other_origin() {
    let (adapter, _) = full_setup().await;

    let res = client()
        .get(format!("http://{adapter}/rewrite"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("x-middleware-rewrite").is_none());

    let cookies: Vec<_> = res.headers().get_all(header::SET_COOKIE).iter().collect();
    assert!(cookies.iter().any(|c| c.to_str().unwrap() == "origin=1"));
    assert!(cookies.iter().any(|c| c.to_str().unwrap() == "mw=2"));

    // Served from the rewrite target, transparently to the client.
    assert_eq!(res.text().await.unwrap(), "GET /rewritten|x-foo=");
}
