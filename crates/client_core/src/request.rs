use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, time};
use tracing::{debug, error};

use crate::{
    notify::{
        DismissPolicy, Notification, NotificationIcon, NotificationMessage, NotificationTicket,
        Notifier, Span,
    },
    operation::{summarize, OperationKey, OperationOutcome, RemoteOperationClient},
};

pub const PROGRESS_DELAY: Duration = Duration::from_millis(750);
pub const PROGRESS_LIFETIME: Duration = Duration::from_secs(30);
pub const SUCCESS_LIFETIME: Duration = Duration::from_secs(2);
pub const FAILURE_LIFETIME: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTimings {
    pub progress_delay: Duration,
    pub progress_lifetime: Duration,
    pub success_lifetime: Duration,
    pub failure_lifetime: Duration,
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        Self {
            progress_delay: PROGRESS_DELAY,
            progress_lifetime: PROGRESS_LIFETIME,
            success_lifetime: SUCCESS_LIFETIME,
            failure_lifetime: FAILURE_LIFETIME,
        }
    }
}

pub(crate) struct ProcessingGuard<'a> {
    flag: &'a watch::Sender<bool>,
}

impl<'a> ProcessingGuard<'a> {
    pub(crate) fn engage(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self { flag }
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}

pub struct RequestLifecycleController {
    client: Arc<dyn RemoteOperationClient>,
    notifier: Arc<dyn Notifier>,
    timings: LifecycleTimings,
    dismiss_policy: DismissPolicy,
    processing: watch::Sender<bool>,
}

impl RequestLifecycleController {
    pub fn new(client: Arc<dyn RemoteOperationClient>, notifier: Arc<dyn Notifier>) -> Self {
        let (processing, _) = watch::channel(false);
        Self {
            client,
            notifier,
            timings: LifecycleTimings::default(),
            dismiss_policy: DismissPolicy::default(),
            processing,
        }
    }

    pub fn with_timings(mut self, timings: LifecycleTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_dismiss_policy(mut self, dismiss_policy: DismissPolicy) -> Self {
        self.dismiss_policy = dismiss_policy;
        self
    }

    pub fn timings(&self) -> LifecycleTimings {
        self.timings
    }

    pub fn is_processing(&self) -> bool {
        *self.processing.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.processing.subscribe()
    }

    /// A controller narrates one call at a time. Overlapping runs share the
    /// processing flag, so the first settlement clears it.
    pub async fn run(&self, key: impl Into<OperationKey>) -> OperationOutcome {
        let key = key.into();
        let name = key.name();
        let processing = ProcessingGuard::engage(&self.processing);

        let invocation = self.client.invoke(name, key.params());
        tokio::pin!(invocation);
        let mut progress_delay = Box::pin(time::sleep(self.timings.progress_delay));
        let mut progress_ticket: Option<NotificationTicket> = None;

        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut invocation => break outcome,
                () = &mut progress_delay, if progress_ticket.is_none() => {
                    debug!(operation = name, "request still in flight, showing progress");
                    progress_ticket = Some(
                        self.notifier
                            .open(progress_notification(name, self.timings.progress_lifetime)),
                    );
                }
            }
        };
        drop(progress_delay);
        drop(processing);

        match self.dismiss_policy {
            DismissPolicy::All => self.notifier.dismiss_all(),
            DismissPolicy::Owned => {
                if let Some(ticket) = progress_ticket {
                    self.notifier.dismiss(ticket);
                }
            }
        }

        match &outcome {
            Ok(_) => {
                debug!(operation = name, "request ran successfully");
                self.notifier
                    .open(success_notification(name, self.timings.success_lifetime));
            }
            Err(err) => {
                error!(operation = name, error = ?err, "error when making remote request: {err}");
                self.notifier.open(failure_notification(
                    name,
                    &summarize(err),
                    self.timings.failure_lifetime,
                ));
            }
        }
        outcome
    }
}

fn progress_notification(operation: &str, lifetime: Duration) -> Notification {
    Notification {
        message: NotificationMessage::new().paragraph([
            Span::text("Processing request "),
            Span::code(operation),
            Span::text("..."),
        ]),
        icon: NotificationIcon::Loading,
        duration: lifetime,
    }
}

fn success_notification(operation: &str, lifetime: Duration) -> Notification {
    Notification {
        message: NotificationMessage::new().paragraph([
            Span::text("Request "),
            Span::code(operation),
            Span::text(" ran successfully"),
        ]),
        icon: NotificationIcon::Success,
        duration: lifetime,
    }
}

fn failure_notification(operation: &str, summary: &str, lifetime: Duration) -> Notification {
    Notification {
        message: NotificationMessage::new()
            .paragraph([
                Span::text("Request "),
                Span::code(operation),
                Span::text(" failed to run. See logs for more details."),
            ])
            .paragraph([Span::text("Error (for nerds): "), Span::code(summary)]),
        icon: NotificationIcon::Failure,
        duration: lifetime,
    }
}

#[cfg(test)]
#[path = "tests/request_tests.rs"]
mod tests;
