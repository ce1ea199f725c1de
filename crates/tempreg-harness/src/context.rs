use tokio::sync::watch;
use uuid::Uuid;

/// Per-invocation context handed to every action.
///
/// Carries a run id for auditing and a cancellation flag, normally the
/// server's shutdown channel.
#[derive(Clone, Debug)]
pub struct ActionContext {
    run_id: Uuid,
    cancel: watch::Receiver<bool>,
}

impl ActionContext {
    pub fn new(cancel: watch::Receiver<bool>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            cancel,
        }
    }

    /// A context that is never cancelled.
    pub fn detached() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self::new(rx)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(ActionContext::detached().run_id(), ActionContext::detached().run_id());
    }

    #[test]
    fn observes_cancellation() {
        let (tx, rx) = watch::channel(false);
        let ctx = ActionContext::new(rx);
        assert!(!ctx.is_cancelled());
        tx.send(true).unwrap();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn detached_is_never_cancelled() {
        assert!(!ActionContext::detached().is_cancelled());
    }
}
