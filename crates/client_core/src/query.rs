use std::sync::Arc;

use shared::{
    domain::TransactionId,
    protocol::{operations, ListTaggedTransactionIds, ListTaggedTransactionIdsParams},
};
use tokio::sync::watch;
use tracing::debug;

use crate::{
    operation::{OperationKey, RemoteError, RemoteOperationClient},
    tags::{badge_for, FishyBadge, FishyTagSet},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSnapshot {
    pub current: FishyTagSet,
    pub previous: Option<FishyTagSet>,
}

impl TagSnapshot {
    pub fn badge_for(&self, id: &TransactionId) -> Option<FishyBadge> {
        badge_for(self.previous.as_ref(), &self.current, id)
    }
}

pub struct TagMembershipQuery {
    client: Arc<dyn RemoteOperationClient>,
    key: OperationKey,
    snapshot: watch::Sender<Option<TagSnapshot>>,
}

impl TagMembershipQuery {
    pub fn new(client: Arc<dyn RemoteOperationClient>, tag: &str) -> Result<Self, RemoteError> {
        let key = OperationKey::with_params(
            operations::LIST_TAGGED_TRANSACTION_IDS,
            &ListTaggedTransactionIdsParams {
                name: tag.to_string(),
            },
        )?;
        let (snapshot, _) = watch::channel(None);
        Ok(Self {
            client,
            key,
            snapshot,
        })
    }

    pub fn key(&self) -> &OperationKey {
        &self.key
    }

    pub fn data(&self) -> Option<TagSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<TagSnapshot>> {
        self.snapshot.subscribe()
    }

    /// A failed refresh leaves the previous data in place.
    pub async fn refresh(&self) -> Result<(), RemoteError> {
        let value = self
            .client
            .invoke(self.key.name(), self.key.params())
            .await?;
        let response: ListTaggedTransactionIds = serde_json::from_value(value)?;
        let current: FishyTagSet = response.ids.into_iter().collect();
        debug!(query = %self.key, tagged = current.len(), "tag membership refreshed");

        self.snapshot.send_modify(|slot| {
            let previous = slot.take().map(|snapshot| snapshot.current);
            *slot = Some(TagSnapshot { current, previous });
        });
        Ok(())
    }
}
