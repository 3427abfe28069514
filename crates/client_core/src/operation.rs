use std::{
    fmt,
    hash::{Hash, Hasher},
};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct OperationKey {
    name: String,
    params: Option<Value>,
}

impl OperationKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
        }
    }

    pub fn with_params(
        name: impl Into<String>,
        params: &impl Serialize,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            name: name.into(),
            params: Some(serde_json::to_value(params)?),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    // Object keys serialize in sorted order, so the compact JSON form is canonical.
    fn canonical_params(&self) -> Option<String> {
        self.params.as_ref().map(Value::to_string)
    }
}

impl PartialEq for OperationKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.canonical_params() == other.canonical_params()
    }
}

impl Eq for OperationKey {}

impl Hash for OperationKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.canonical_params().hash(state);
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for OperationKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OperationKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<(&str, Value)> for OperationKey {
    fn from((name, params): (&str, Value)) -> Self {
        Self {
            name: name.to_string(),
            params: Some(params),
        }
    }
}

impl From<(String, Value)> for OperationKey {
    fn from((name, params): (String, Value)) -> Self {
        Self {
            name,
            params: Some(params),
        }
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{0}")]
    Message(String),
    #[error("{message}")]
    Structured { message: String, context: Value },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RemoteError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn structured(message: impl Into<String>, context: Value) -> Self {
        Self::Structured {
            message: message.into(),
            context,
        }
    }

    pub fn context(&self) -> Option<&Value> {
        match self {
            Self::Structured { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Reads `context.json.error.summary`. Any missing link, non-object
    /// intermediate, or non-string (or empty) leaf yields `None`.
    pub fn summary(&self) -> Option<&str> {
        self.context()?
            .get("json")?
            .get("error")?
            .get("summary")?
            .as_str()
            .filter(|summary| !summary.is_empty())
    }
}

pub fn summarize(err: &RemoteError) -> String {
    err.summary()
        .map(str::to_owned)
        .unwrap_or_else(|| err.to_string())
}

pub type OperationOutcome = Result<Value, RemoteError>;

#[async_trait]
pub trait RemoteOperationClient: Send + Sync {
    async fn invoke(&self, operation: &str, params: Option<&Value>) -> OperationOutcome;
}
