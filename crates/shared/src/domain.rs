use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag applied to transactions an operator considers suspicious.
pub const FISHY_TAG: &str = "fishy";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Coarse lower bound applied to the transaction list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFilter {
    #[default]
    All,
    LastWeek,
    LastTwoWeeks,
}

impl DateFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            DateFilter::All => "all",
            DateFilter::LastWeek => "last-week",
            DateFilter::LastTwoWeeks => "last-two-weeks",
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown date filter '{0}' (expected all, last-week or last-two-weeks)")]
pub struct ParseDateFilterError(pub String);

impl FromStr for DateFilter {
    type Err = ParseDateFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(DateFilter::All),
            "last-week" => Ok(DateFilter::LastWeek),
            "last-two-weeks" => Ok(DateFilter::LastTwoWeeks),
            other => Err(ParseDateFilterError(other.to_string())),
        }
    }
}
