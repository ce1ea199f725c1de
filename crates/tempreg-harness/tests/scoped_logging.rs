use std::io::Write;
use std::sync::{Arc, Mutex};

use tempreg_crypto::CryptoSource;
use tempreg_harness::{ActionContext, ActionRegistry};
use tempreg_repo::Instance;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn dispatch_logs_inside_the_injected_span() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let span = tracing::info_span!("test_dispatch", case = "scoped");
    let actions = ActionRegistry::standard().with_span(span);
    let inst = Instance::in_memory(&CryptoSource).unwrap();
    let ctx = ActionContext::detached();

    actions.dispatch("createsynthsdataset", &ctx, &inst).await.unwrap();
    let _ = actions.dispatch("bogus", &ctx, &inst).await;

    let logs = captured.text();
    assert!(logs.contains("test_dispatch"));
    assert!(logs.contains("running action"));
    assert!(logs.contains(&ctx.run_id().to_string()));
    assert!(logs.contains("action not found"));
}
