use tempreg_harness::{Provisioner, TEMP_PREFIX};
use tempreg_server::{Lifecycle, LifecycleOptions, LifecycleState, ServerConfig};

fn options(no_cleanup: bool) -> LifecycleOptions {
    LifecycleOptions {
        server: ServerConfig::new("127.0.0.1", 0).unwrap(),
        no_cleanup,
        seed: true,
    }
}

#[tokio::test]
async fn signal_removes_temporary_root() {
    let base = tempfile::tempdir().unwrap();
    let summary = Lifecycle::new(options(false))
        .with_provisioner(Provisioner::new().with_base_dir(base.path()))
        .run(async {})
        .await
        .unwrap();

    assert_eq!(summary.state, LifecycleState::Terminated);
    assert!(summary.cleaned_up);
    assert!(!summary.root.exists());
    assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn no_cleanup_keeps_temporary_root() {
    let base = tempfile::tempdir().unwrap();
    let summary = Lifecycle::new(options(true))
        .with_provisioner(Provisioner::new().with_base_dir(base.path()))
        .run(async {})
        .await
        .unwrap();

    assert!(!summary.cleaned_up);
    assert!(summary.root.join("ipfs").is_dir());
    assert!(summary.root.join("qri").join("config.toml").is_file());
    let name = summary.root.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(TEMP_PREFIX));
}

#[tokio::test]
async fn server_stops_accepting_after_shutdown() {
    let base = tempfile::tempdir().unwrap();
    let running = Lifecycle::new(options(false))
        .with_provisioner(Provisioner::new().with_base_dir(base.path()))
        .start()
        .await
        .unwrap();
    let addr = running.local_addr().unwrap();
    running.shutdown().await;
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}
