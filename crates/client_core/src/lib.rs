pub mod filter;
pub mod http;
pub mod notify;
pub mod operation;
pub mod query;
pub mod request;
pub mod selection;
pub mod tags;
pub mod workflow;

pub use filter::{date_from_filter, debounce, list_transactions_key, FilterState};
pub use http::HttpOperationClient;
pub use notify::{
    DismissPolicy, Notification, NotificationIcon, NotificationMessage, NotificationTicket,
    Notifier, Span, ToastBoard,
};
pub use operation::{summarize, OperationKey, OperationOutcome, RemoteError, RemoteOperationClient};
pub use query::{TagMembershipQuery, TagSnapshot};
pub use request::{LifecycleTimings, RequestLifecycleController};
pub use selection::SelectionSource;
pub use tags::{badge_for, FishyBadge, FishyTagSet};
pub use workflow::{ChangeStatus, TagChange, TaggingWorkflow};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
