use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One logged AI-model invocation. Only `cost_usd` is ever written by this
/// crate; every other field (including unrecognized ones collected in
/// `extra`) passes through unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub input_tokens: i64,
    #[serde(default)]
    pub output_tokens: i64,
    #[serde(default)]
    pub cost_usd: Option<String>,
    #[serde(default)]
    pub latency_ms: Value,
    #[serde(default)]
    pub error_message: Value,
    #[serde(default)]
    pub error_type: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UsageRecord {
    /// True when `cost_usd` already carries a non-blank value, which makes
    /// the record off-limits for recomputation.
    pub fn has_cost(&self) -> bool {
        self.cost_usd
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
    }
}

/// Ordered batch of usage records under the `ai_usage` key. Extra top-level
/// keys ride along untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageBatch {
    #[serde(rename = "ai_usage")]
    pub records: Vec<UsageRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
