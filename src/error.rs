use thiserror::Error;

#[derive(Debug, Error)]
pub enum CostError {
    #[error("pricing load error: {0}")]
    PricingLoad(String),

    #[error("payload format error: {0}")]
    PayloadFormat(String),

    #[error("invalid usage record: {0}")]
    InvalidRecord(String),
}
