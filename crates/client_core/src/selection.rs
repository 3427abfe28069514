use shared::domain::TransactionId;
use tokio::sync::watch;

pub struct SelectionSource {
    selected: watch::Sender<Option<TransactionId>>,
}

impl Default for SelectionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionSource {
    pub fn new() -> Self {
        let (selected, _) = watch::channel(None);
        Self { selected }
    }

    pub fn select(&self, id: impl Into<TransactionId>) {
        self.selected.send_replace(Some(id.into()));
    }

    pub fn clear(&self) {
        self.selected.send_replace(None);
    }

    pub fn current(&self) -> Option<TransactionId> {
        self.selected.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<TransactionId>> {
        self.selected.subscribe()
    }
}
