use serde::{Deserialize, Serialize};

use crate::domain::TransactionId;

pub mod operations {
    pub const TAG_TRANSACTION: &str = "tagTransaction";
    pub const UNTAG_TRANSACTION: &str = "untagTransaction";
    pub const LIST_TAGGED_TRANSACTION_IDS: &str = "listTaggedTransactionIds";
    pub const LIST_TRANSACTIONS: &str = "listTransactionsTest";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBody {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagTransactionParams {
    pub transaction_id: TransactionId,
    pub body: TagBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntagTransactionParams {
    pub transaction_id: TransactionId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTaggedTransactionIdsParams {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTaggedTransactionIds {
    #[serde(default)]
    pub ids: Vec<TransactionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTransactionsParams {
    pub description: String,
    #[serde(rename = "dateMin")]
    pub date_min: String,
}

/// One row of the transaction list as the console renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: TransactionId,
    #[serde(default)]
    pub amount_in_cents: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_pending: bool,
    #[serde(default)]
    pub inserted_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Renders cents as a signed dollar amount, e.g. `-1250` as `-$12.5`.
pub fn format_amount_cents(cents: i64) -> String {
    let sign = if cents < 0 { '-' } else { '+' };
    let abs = cents.unsigned_abs();
    let (whole, frac) = (abs / 100, abs % 100);
    if frac == 0 {
        format!("{sign}${whole}")
    } else if frac % 10 == 0 {
        format!("{sign}${whole}.{}", frac / 10)
    } else {
        format!("{sign}${whole}.{frac:02}")
    }
}
