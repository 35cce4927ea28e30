//! Cost estimation for recorded AI-model usage.
//!
//! Callers hand in a batch of usage records, either as a structured
//! `serde_json::Value` or as serialized JSON text, and get the same shape
//! back with `cost_usd` filled in for every record the pricing table could
//! resolve. Models the table cannot resolve stay unpriced and fire a
//! best-effort alert through an injected notification capability.

pub mod alerts;
pub mod cost;
pub mod engine;
pub mod error;
pub mod models;
pub mod payload;
pub mod pricing;

pub use alerts::{AlertSettings, EmailAlertDispatcher, UnknownModelAlert};
pub use cost::{CostOutcome, DEFAULT_SUCCESS_STATUS};
pub use engine::{estimate_cost, Estimator};
pub use error::CostError;
pub use models::{UsageBatch, UsageRecord};
pub use payload::{Payload, PayloadShape};
pub use pricing::{get_pricing, PricingEntry, PricingTable};
