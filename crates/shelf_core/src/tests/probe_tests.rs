use super::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::State,
    http::{Method, StatusCode},
    routing::any,
    Router,
};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct ServerState {
    heads: Arc<AtomicUsize>,
    others: Arc<AtomicUsize>,
}

async fn handle_tool(State(state): State<ServerState>, method: Method) -> StatusCode {
    if method == Method::HEAD {
        state.heads.fetch_add(1, Ordering::SeqCst);
    } else {
        state.others.fetch_add(1, Ordering::SeqCst);
    }
    StatusCode::OK
}

async fn handle_slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK
}

async fn spawn_tool_server() -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route("/tools/compressor.html", any(handle_tool))
        .route("/tools/gone.html", any(|| async { StatusCode::GONE }))
        .route("/tools/slow.html", any(handle_slow))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

#[tokio::test]
async fn head_request_reports_success_without_get() {
    let (base, state) = spawn_tool_server().await;
    let probe = HttpProbe::new(Duration::from_secs(5));

    let url = Url::parse(&format!("{base}/tools/compressor.html")).expect("url");
    let status = probe.probe(&url).await.expect("probe");

    assert!(status.is_success());
    assert_eq!(state.heads.load(Ordering::SeqCst), 1);
    assert_eq!(state.others.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_page_reports_not_found_status() {
    let (base, _state) = spawn_tool_server().await;
    let probe = HttpProbe::new(Duration::from_secs(5));

    let url = Url::parse(&format!("{base}/tools/missing.html")).expect("url");
    let status = probe.probe(&url).await.expect("probe");
    assert_eq!(status, ProbeStatus(404));
    assert!(!status.is_success());

    let url = Url::parse(&format!("{base}/tools/gone.html")).expect("url");
    assert_eq!(probe.probe(&url).await.expect("probe"), ProbeStatus(410));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let probe = HttpProbe::new(Duration::from_secs(5));
    let url = Url::parse(&format!("http://{addr}/tools/a.html")).expect("url");
    let err = probe.probe(&url).await.expect_err("nothing listening");
    assert!(matches!(err, ProbeError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn slow_server_times_out() {
    let (base, _state) = spawn_tool_server().await;
    let probe = HttpProbe::new(Duration::from_millis(200));

    let url = Url::parse(&format!("{base}/tools/slow.html")).expect("url");
    let err = probe.probe(&url).await.expect_err("should time out");
    assert!(matches!(err, ProbeError::TimedOut(_)), "{err:?}");
}

#[tokio::test]
async fn non_http_scheme_is_rejected() {
    let probe = HttpProbe::new(Duration::from_secs(1));
    let url = Url::parse("mailto:someone@example.test").expect("url");
    assert!(matches!(
        probe.probe(&url).await,
        Err(ProbeError::InvalidTarget { .. })
    ));
}
