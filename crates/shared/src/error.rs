use serde::{Deserialize, Serialize};

/// Error body returned by the transactions API on a failed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub summary: String,
}

impl ApiErrorEnvelope {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                summary: summary.into(),
            },
        }
    }
}
