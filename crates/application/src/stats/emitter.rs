use kestrel_dns_domain::QueryOutcomeRecord;
use tokio::sync::mpsc;

/// One completed query, as delivered to the query-log sink.
pub type QueryEvent = QueryOutcomeRecord;

/// Non-blocking event emitter for completed queries.
///
/// Sends over an unbounded channel so the hot path never awaits; if the
/// channel is closed the event is silently dropped — logging is
/// best-effort and must not add latency to DNS answers.
#[derive(Clone, Default)]
pub struct QueryEventEmitter {
    sender: Option<mpsc::UnboundedSender<QueryEvent>>,
}

impl QueryEventEmitter {
    /// Disabled emitter; `emit()` is a no-op.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Enabled emitter plus the receiver for the consumer task.
    pub fn enabled() -> (Self, mpsc::UnboundedReceiver<QueryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    pub fn emit(&self, event: QueryEvent) {
        if let Some(ref tx) = self.sender {
            let _ = tx.send(event);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }
}

impl std::fmt::Debug for QueryEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEventEmitter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
