//! Test doubles shared by the controller, query and workflow suites.

use std::{
    collections::{BTreeSet, HashMap, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::protocol::{operations, TagTransactionParams, UntagTransactionParams};
use tokio::{sync::watch, time::Instant};

use crate::{
    notify::{Notification, NotificationIcon, NotificationTicket, Notifier},
    operation::{OperationOutcome, RemoteError, RemoteOperationClient},
};

#[derive(Debug, Clone)]
pub enum ScriptedFailure {
    Message(String),
    Structured { message: String, context: Value },
}

impl ScriptedFailure {
    fn into_error(self) -> RemoteError {
        match self {
            ScriptedFailure::Message(message) => RemoteError::message(message),
            ScriptedFailure::Structured { message, context } => {
                RemoteError::structured(message, context)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: String,
    pub params: Option<Value>,
    pub started_at: Instant,
    /// Value of the observed processing flag when the call arrived.
    pub flag_during: Option<bool>,
}

#[derive(Default)]
struct FakeState {
    tagged: BTreeSet<String>,
    latency: HashMap<String, Duration>,
    failures: HashMap<String, VecDeque<ScriptedFailure>>,
    calls: Vec<RecordedCall>,
    observed_flag: Option<watch::Receiver<bool>>,
}

/// In-memory stand-in for the transactions API with scripted latency and failures.
#[derive(Default)]
pub struct FakeTransactionsApi {
    state: Mutex<FakeState>,
}

impl FakeTransactionsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tagged<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let api = Self::new();
        api.state.lock().expect("state").tagged = ids.into_iter().map(str::to_string).collect();
        api
    }

    pub fn set_latency(&self, operation: &str, latency: Duration) {
        self.state
            .lock()
            .expect("state")
            .latency
            .insert(operation.to_string(), latency);
    }

    pub fn fail_next(&self, operation: &str, failure: ScriptedFailure) {
        self.state
            .lock()
            .expect("state")
            .failures
            .entry(operation.to_string())
            .or_default()
            .push_back(failure);
    }

    pub fn observe_flag(&self, flag: watch::Receiver<bool>) {
        self.state.lock().expect("state").observed_flag = Some(flag);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().expect("state").calls.clone()
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.operation).collect()
    }

    pub fn tagged(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("state")
            .tagged
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RemoteOperationClient for FakeTransactionsApi {
    async fn invoke(&self, operation: &str, params: Option<&Value>) -> OperationOutcome {
        let (latency, failure) = {
            let mut state = self.state.lock().expect("state");
            let flag_during = state.observed_flag.as_ref().map(|flag| *flag.borrow());
            state.calls.push(RecordedCall {
                operation: operation.to_string(),
                params: params.cloned(),
                started_at: Instant::now(),
                flag_during,
            });
            let latency = state.latency.get(operation).copied().unwrap_or_default();
            let failure = state
                .failures
                .get_mut(operation)
                .and_then(VecDeque::pop_front);
            (latency, failure)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if let Some(failure) = failure {
            return Err(failure.into_error());
        }

        let params = params.cloned().unwrap_or_default();
        let mut state = self.state.lock().expect("state");
        match operation {
            operations::TAG_TRANSACTION => {
                let params: TagTransactionParams = serde_json::from_value(params)?;
                state.tagged.insert(params.transaction_id.0);
                Ok(json!({ "ok": true }))
            }
            operations::UNTAG_TRANSACTION => {
                let params: UntagTransactionParams = serde_json::from_value(params)?;
                state.tagged.remove(&params.transaction_id.0);
                Ok(json!({ "ok": true }))
            }
            operations::LIST_TAGGED_TRANSACTION_IDS => Ok(json!({ "ids": state.tagged })),
            other => Ok(json!({ "operation": other })),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeEvent {
    Opened {
        ticket: NotificationTicket,
        icon: NotificationIcon,
        text: String,
        duration: Duration,
        at: Instant,
    },
    Dismissed {
        ticket: NotificationTicket,
        at: Instant,
    },
    DismissedAll {
        at: Instant,
    },
}

/// Notifier that only records what it was asked to do.
#[derive(Default)]
pub struct RecordingNotifier {
    next_ticket: AtomicU64,
    events: Mutex<Vec<NoticeEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NoticeEvent> {
        self.events.lock().expect("events").clone()
    }

    /// `(icon, text, duration, at)` of every opened notification, in order.
    pub fn opened(&self) -> Vec<(NotificationIcon, String, Duration, Instant)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                NoticeEvent::Opened {
                    icon,
                    text,
                    duration,
                    at,
                    ..
                } => Some((icon, text, duration, at)),
                _ => None,
            })
            .collect()
    }

    pub fn opened_with(&self, icon: NotificationIcon) -> usize {
        self.opened()
            .into_iter()
            .filter(|(opened_icon, ..)| *opened_icon == icon)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn open(&self, notification: Notification) -> NotificationTicket {
        let ticket = NotificationTicket(self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1);
        self.events.lock().expect("events").push(NoticeEvent::Opened {
            ticket,
            icon: notification.icon,
            text: notification.message.plain_text(),
            duration: notification.duration,
            at: Instant::now(),
        });
        ticket
    }

    fn dismiss(&self, ticket: NotificationTicket) {
        self.events.lock().expect("events").push(NoticeEvent::Dismissed {
            ticket,
            at: Instant::now(),
        });
    }

    fn dismiss_all(&self) {
        self.events
            .lock()
            .expect("events")
            .push(NoticeEvent::DismissedAll { at: Instant::now() });
    }
}
