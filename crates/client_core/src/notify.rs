use std::{
    fmt,
    str::FromStr,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Code(String),
}

impl Span {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn code(value: impl Into<String>) -> Self {
        Self::Code(value.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationMessage {
    paragraphs: Vec<Vec<Span>>,
}

impl NotificationMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(mut self, spans: impl IntoIterator<Item = Span>) -> Self {
        self.paragraphs.push(spans.into_iter().collect());
        self
    }

    pub fn paragraphs(&self) -> &[Vec<Span>] {
        &self.paragraphs
    }

    pub fn code_spans(&self) -> impl Iterator<Item = &str> {
        self.paragraphs.iter().flatten().filter_map(|span| match span {
            Span::Code(code) => Some(code.as_str()),
            Span::Text(_) => None,
        })
    }

    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|spans| {
                spans
                    .iter()
                    .map(|span| match span {
                        Span::Text(text) => text.clone(),
                        Span::Code(code) => format!("`{code}`"),
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain_text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationIcon {
    Loading,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: NotificationMessage,
    pub icon: NotificationIcon,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationTicket(pub u64);

pub trait Notifier: Send + Sync {
    fn open(&self, notification: Notification) -> NotificationTicket;
    fn dismiss(&self, ticket: NotificationTicket);
    fn dismiss_all(&self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissPolicy {
    #[default]
    All,
    Owned,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dismiss policy '{0}' (expected all or owned)")]
pub struct ParseDismissPolicyError(pub String);

impl FromStr for DismissPolicy {
    type Err = ParseDismissPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "owned" => Ok(Self::Owned),
            other => Err(ParseDismissPolicyError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub ticket: NotificationTicket,
    pub notification: Notification,
    pub expires_at: Instant,
}

#[derive(Default)]
struct ToastBoardInner {
    next_ticket: u64,
    toasts: Vec<Toast>,
}

impl ToastBoardInner {
    fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }
}

#[derive(Default)]
pub struct ToastBoard {
    inner: Mutex<ToastBoardInner>,
}

impl ToastBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Vec<Toast> {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.prune(now);
        inner.toasts.clone()
    }
}

impl Notifier for ToastBoard {
    fn open(&self, notification: Notification) -> NotificationTicket {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.prune(now);
        inner.next_ticket += 1;
        let ticket = NotificationTicket(inner.next_ticket);
        let expires_at = now + notification.duration;
        inner.toasts.push(Toast {
            ticket,
            notification,
            expires_at,
        });
        ticket
    }

    fn dismiss(&self, ticket: NotificationTicket) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.toasts.retain(|toast| toast.ticket != ticket);
    }

    fn dismiss_all(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.toasts.clear();
    }
}
