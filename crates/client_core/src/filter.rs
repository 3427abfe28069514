use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use shared::{
    domain::DateFilter,
    protocol::{operations, ListTransactionsParams},
};
use tokio::{sync::watch, task::JoinHandle, time};

use crate::operation::{OperationKey, RemoteError};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

pub fn date_from_filter(filter: DateFilter, now: DateTime<Utc>) -> DateTime<Utc> {
    match filter {
        DateFilter::All => DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(1),
        DateFilter::LastWeek => now - TimeDelta::days(7),
        DateFilter::LastTwoWeeks => now - TimeDelta::days(14),
    }
}

pub fn format_date_min(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn list_transactions_key(
    search: &str,
    filter: DateFilter,
    now: DateTime<Utc>,
) -> Result<OperationKey, RemoteError> {
    OperationKey::with_params(
        operations::LIST_TRANSACTIONS,
        &ListTransactionsParams {
            description: format!("%{search}%"),
            date_min: format_date_min(date_from_filter(filter, now)),
        },
    )
}

// The task ends when the input sender is dropped, after flushing the last value.
pub fn debounce<T>(
    mut input: watch::Receiver<T>,
    settle: Duration,
) -> (watch::Receiver<T>, JoinHandle<()>)
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let (output, debounced) = watch::channel(input.borrow_and_update().clone());
    let task = tokio::spawn(async move {
        while input.changed().await.is_ok() {
            loop {
                tokio::select! {
                    changed = input.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    () = time::sleep(settle) => break,
                }
            }
            let latest = input.borrow_and_update().clone();
            output.send_if_modified(|current| {
                if *current == latest {
                    return false;
                }
                *current = latest;
                true
            });
        }
    });
    (debounced, task)
}

pub struct FilterState {
    search: watch::Sender<String>,
    debounced_search: watch::Receiver<String>,
    date_filter: watch::Sender<DateFilter>,
    debounce_task: JoinHandle<()>,
}

impl FilterState {
    /// Must be called inside a tokio runtime.
    pub fn new(settle: Duration) -> Self {
        let (search, search_input) = watch::channel(String::new());
        let (debounced_search, debounce_task) = debounce(search_input, settle);
        let (date_filter, _) = watch::channel(DateFilter::default());
        Self {
            search,
            debounced_search,
            date_filter,
            debounce_task,
        }
    }

    pub fn set_search(&self, text: impl Into<String>) {
        self.search.send_replace(text.into());
    }

    pub fn search(&self) -> String {
        self.search.borrow().clone()
    }

    pub fn debounced_search(&self) -> String {
        self.debounced_search.borrow().clone()
    }

    pub fn subscribe_debounced_search(&self) -> watch::Receiver<String> {
        self.debounced_search.clone()
    }

    pub fn set_date_filter(&self, filter: DateFilter) {
        self.date_filter.send_replace(filter);
    }

    pub fn date_filter(&self) -> DateFilter {
        *self.date_filter.borrow()
    }

    pub fn list_key(&self, now: DateTime<Utc>) -> Result<OperationKey, RemoteError> {
        list_transactions_key(&self.debounced_search(), self.date_filter(), now)
    }
}

impl Drop for FilterState {
    fn drop(&mut self) {
        self.debounce_task.abort();
    }
}
