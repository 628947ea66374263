//! Transient user-facing notices.
//!
//! Only the newest notice is visible. Each one clears itself after the
//! configured lifetime unless a newer notice replaced it first.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Default)]
struct NoticeSlot {
    next_id: u64,
    current: Option<Notice>,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    slot: Arc<Mutex<NoticeSlot>>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(NoticeSlot::default())),
            ttl,
        }
    }

    /// Show a notice, replacing the current one. Returns its id.
    pub fn show(&self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        let message = message.into();
        match kind {
            NoticeKind::Error | NoticeKind::Warning => tracing::warn!(?kind, %message, "notice"),
            NoticeKind::Success | NoticeKind::Info => tracing::info!(?kind, %message, "notice"),
        }

        let id = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            slot.next_id += 1;
            let id = slot.next_id;
            slot.current = Some(Notice { id, kind, message });
            id
        };

        // Auto-clear needs a runtime; without one the notice stays until
        // replaced or dismissed.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let notifier = self.clone();
            handle.spawn(async move {
                tokio::time::sleep(notifier.ttl).await;
                notifier.dismiss_id(id);
            });
        }

        id
    }

    pub fn current(&self) -> Option<Notice> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    pub fn dismiss(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).current = None;
    }

    /// Dismiss the visible notice only if it is of `kind`.
    pub fn dismiss_kind(&self, kind: NoticeKind) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.current.as_ref().is_some_and(|n| n.kind == kind) {
            slot.current = None;
        }
    }

    fn dismiss_id(&self, id: u64) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.current.as_ref().is_some_and(|n| n.id == id) {
            slot.current = None;
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}
