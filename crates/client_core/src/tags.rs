use std::collections::{btree_set, BTreeSet};

use shared::domain::TransactionId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FishyTagSet(BTreeSet<TransactionId>);

impl FishyTagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, TransactionId> {
        self.0.iter()
    }
}

impl FromIterator<TransactionId> for FishyTagSet {
    fn from_iter<I: IntoIterator<Item = TransactionId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FishyTagSet {
    type Item = &'a TransactionId;
    type IntoIter = btree_set::Iter<'a, TransactionId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FishyBadge {
    pub animate_enter: bool,
}

/// Without a previous snapshot every tagged row counts as newly entered.
pub fn badge_for(
    previous: Option<&FishyTagSet>,
    current: &FishyTagSet,
    id: &TransactionId,
) -> Option<FishyBadge> {
    if !current.contains(id) {
        return None;
    }
    let animate_enter = previous.map_or(true, |previous| !previous.contains(id));
    Some(FishyBadge { animate_enter })
}
