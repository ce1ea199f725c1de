use std::net::SocketAddr;

use tempreg_harness::Provisioner;
use tempreg_server::{Lifecycle, LifecycleOptions, ServerConfig};
use tempreg_types::DatasetRef;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn http_get(addr: SocketAddr, target: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw).into_owned();
    let status = text
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap();
    let body = text
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (status, body)
}

fn options() -> LifecycleOptions {
    LifecycleOptions {
        server: ServerConfig::new("127.0.0.1", 0).unwrap(),
        ..Default::default()
    }
}

#[tokio::test]
async fn seeded_harness_runs_create_then_append() {
    let base = tempfile::tempdir().unwrap();
    let running = Lifecycle::new(options())
        .with_provisioner(Provisioner::new().with_base_dir(base.path()))
        .start()
        .await
        .unwrap();
    let addr = running.local_addr().unwrap();
    let synths = DatasetRef::new("me", "synths");
    let repo = running.instance().repo();

    // The seed has already run before the first request.
    assert_eq!(repo.body_rows(&synths).unwrap().len(), 3);

    let (status, body) = http_get(addr, "/sim/action?action=CREATESYNTHSDATASET").await;
    assert_eq!(status, 200);
    assert!(body.contains("\"ok\""));
    let created = repo.resolve(&synths).unwrap();
    assert!(repo.is_published(&created).unwrap());
    assert_eq!(repo.body_rows(&synths).unwrap().len(), 3);

    let (status, _) = http_get(addr, "/sim/action?action=appendsynthsdataset").await;
    assert_eq!(status, 200);
    let appended = repo.resolve(&synths).unwrap();
    assert_ne!(appended.path, created.path);
    assert!(repo.is_published(&appended).unwrap());
    assert_eq!(repo.body_rows(&synths).unwrap().len(), 4);

    let summary = running.shutdown().await;
    assert!(summary.cleaned_up);
}

#[tokio::test]
async fn unknown_action_keeps_serving() {
    let base = tempfile::tempdir().unwrap();
    let running = Lifecycle::new(options())
        .with_provisioner(Provisioner::new().with_base_dir(base.path()))
        .start()
        .await
        .unwrap();
    let addr = running.local_addr().unwrap();

    let (status, body) = http_get(addr, "/sim/action?action=bogus").await;
    assert_eq!(status, 400);
    assert!(body.contains("action not found: 'bogus'"));

    let (status, _) = http_get(addr, "/health").await;
    assert_eq!(status, 200);
    running.shutdown().await;
}
