use std::sync::Arc;

use serde::Serialize;
use shared::{
    domain::FISHY_TAG,
    protocol::{operations, TagBody, TagTransactionParams, UntagTransactionParams},
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    operation::{OperationKey, OperationOutcome},
    query::TagMembershipQuery,
    request::{ProcessingGuard, RequestLifecycleController},
    selection::SelectionSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagChange {
    MarkAsFishy,
    ClearTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Skipped,
    Applied,
    Failed,
}

pub struct TaggingWorkflow {
    requests: RequestLifecycleController,
    tags: Arc<TagMembershipQuery>,
    selection: Arc<SelectionSource>,
    processing: watch::Sender<bool>,
}

impl TaggingWorkflow {
    pub fn new(
        requests: RequestLifecycleController,
        tags: Arc<TagMembershipQuery>,
        selection: Arc<SelectionSource>,
    ) -> Self {
        let (processing, _) = watch::channel(false);
        Self {
            requests,
            tags,
            selection,
            processing,
        }
    }

    pub fn requests(&self) -> &RequestLifecycleController {
        &self.requests
    }

    pub fn tags(&self) -> &TagMembershipQuery {
        &self.tags
    }

    pub fn selection(&self) -> &SelectionSource {
        &self.selection
    }

    pub fn is_processing(&self) -> bool {
        *self.processing.borrow()
    }

    pub fn subscribe_processing(&self) -> watch::Receiver<bool> {
        self.processing.subscribe()
    }

    pub fn buttons_disabled(&self) -> bool {
        self.selection.current().is_none()
    }

    pub async fn mark_as_fishy(&self) -> Option<OperationOutcome> {
        let transaction_id = self.selection.current()?;
        let params = TagTransactionParams {
            transaction_id,
            body: TagBody {
                name: FISHY_TAG.to_string(),
            },
        };
        Some(self.run(operations::TAG_TRANSACTION, &params).await)
    }

    pub async fn clear_tag(&self) -> Option<OperationOutcome> {
        let transaction_id = self.selection.current()?;
        let params = UntagTransactionParams {
            transaction_id,
            name: FISHY_TAG.to_string(),
        };
        Some(self.run(operations::UNTAG_TRANSACTION, &params).await)
    }

    pub async fn handle_change(&self, change: TagChange) -> ChangeStatus {
        if self.selection.current().is_none() {
            return ChangeStatus::Skipped;
        }

        let _processing = ProcessingGuard::engage(&self.processing);
        let outcome = match change {
            TagChange::MarkAsFishy => self.mark_as_fishy().await,
            TagChange::ClearTag => self.clear_tag().await,
        };

        match outcome {
            None => ChangeStatus::Skipped,
            Some(Err(err)) => {
                debug!(?change, error = %err, "tag change failed");
                ChangeStatus::Failed
            }
            Some(Ok(_)) => {
                if let Err(err) = self.tags.refresh().await {
                    debug!(?change, error = %err, "tag membership refresh failed");
                }
                ChangeStatus::Applied
            }
        }
    }

    async fn run(&self, operation: &str, params: &impl Serialize) -> OperationOutcome {
        let key = OperationKey::with_params(operation, params).map_err(|err| {
            warn!(operation, error = %err, "could not encode operation params");
            err
        })?;
        self.requests.run(key).await
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
