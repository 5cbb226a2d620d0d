//! Background execution of chat requests.
//!
//! Each request runs on its own task; outcomes come back over a channel in
//! the order the requests finish, which is the order they are rendered.

use deskchat_engine::{Outcome, PendingRequest};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Requests currently running in the background.
pub(crate) struct RequestPool {
    tx: mpsc::UnboundedSender<Outcome>,
    rx: mpsc::UnboundedReceiver<Outcome>,
    handles: Vec<JoinHandle<()>>,
}

impl RequestPool {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            handles: Vec::new(),
        }
    }

    /// Start a request in the background.
    pub(crate) fn spawn(&mut self, pending: PendingRequest) {
        self.handles.retain(|handle| !handle.is_finished());

        debug!(id = %pending.id(), "spawning request");
        let tx = self.tx.clone();
        self.handles.push(tokio::spawn(async move {
            let outcome = pending.resolve().await;
            // Receiver is gone only when the UI is shutting down
            let _ = tx.send(outcome);
        }));
    }

    /// Wait for the next finished request.
    ///
    /// The pool keeps a sender alive, so this pends rather than returning
    /// `None` while idle.
    pub(crate) async fn next(&mut self) -> Option<Outcome> {
        self.rx.recv().await
    }

    /// Number of requests still running.
    #[cfg(test)]
    pub(crate) fn running(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Cancel everything still running.
    pub(crate) fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for RequestPool {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Action;
    use crate::test_utils::create_test_app;
    use deskchat_engine::testing::ScriptedTransport;
    use deskchat_engine::{TransportResponse, NO_REPLY_TEXT};

    #[tokio::test]
    async fn test_outcomes_come_back() {
        let transport = ScriptedTransport::new()
            .respond(TransportResponse::json(200, r#"{"reply":"one"}"#))
            .respond(TransportResponse::json(200, "{}"));
        let mut app = create_test_app(transport);
        let mut pool = RequestPool::new();

        for text in ["a", "b"] {
            app.handle_action(Action::Insert(text.chars().next().unwrap()));
            pool.spawn(app.handle_action(Action::Send).unwrap());
        }

        let mut texts = Vec::new();
        for _ in 0..2 {
            texts.push(pool.next().await.unwrap().into_text());
        }
        texts.sort();
        assert_eq!(texts, vec![NO_REPLY_TEXT.to_string(), "one".to_string()]);
    }

    #[tokio::test]
    async fn test_abort_all_clears_handles() {
        let mut app = create_test_app(ScriptedTransport::new());
        let mut pool = RequestPool::new();
        pool.spawn(app.handle_action(Action::Reset).unwrap());
        pool.abort_all();
        assert_eq!(pool.running(), 0);
    }
}
