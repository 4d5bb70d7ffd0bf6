// Text input monitoring

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Something the user did to a text field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The field content changed while typing
    Input(String),
    /// Text was pasted; carries the resulting field content
    Paste(String),
}

impl InputEvent {
    pub fn text(&self) -> &str {
        match self {
            InputEvent::Input(text) | InputEvent::Paste(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            InputEvent::Input(text) | InputEvent::Paste(text) => text,
        }
    }
}

/// Keeps a monitored input attached; detaches on `detach` or drop
#[derive(Debug)]
pub struct MonitorHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub(crate) fn new(token: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            token,
            task: Some(task),
        }
    }

    /// A handle that never monitored anything (auto-analysis disabled)
    pub(crate) fn inert() -> Self {
        Self {
            token: CancellationToken::new(),
            task: None,
        }
    }

    /// Whether events are still being forwarded
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop forwarding events
    pub fn detach(self) {
        // Drop does the work
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
