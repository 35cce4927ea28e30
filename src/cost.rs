use crate::error::CostError;
use crate::models::UsageRecord;
use crate::pricing::PricingTable;
use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_SUCCESS_STATUS: &str = "success";

/// A record qualifies for pricing only when it has no cost yet and its
/// status matches the configured success marker.
pub fn is_eligible(record: &UsageRecord, success_status: &str) -> bool {
    if record.has_cost() {
        return false;
    }
    record.status == success_status
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostOutcome {
    Priced(String),
    Unpriced,
}

/// Resolves the record's model against the table and writes the formatted
/// cost in place on a hit. `Unpriced` is a normal outcome and leaves
/// `cost_usd` untouched; it is never set to zero or a sentinel.
pub fn resolve_cost(
    record: &mut UsageRecord,
    table: &PricingTable,
) -> Result<CostOutcome, CostError> {
    let Some(entry) = table.resolve(&record.model) else {
        return Ok(CostOutcome::Unpriced);
    };

    if record.input_tokens < 0 || record.output_tokens < 0 {
        return Err(CostError::InvalidRecord(format!(
            "negative token count for model '{}' (input_tokens={}, output_tokens={})",
            record.model, record.input_tokens, record.output_tokens
        )));
    }

    let input_cost = Decimal::from(record.input_tokens)
        .checked_mul(entry.input_rate)
        .ok_or_else(|| overflow_error(record))?;
    let output_cost = Decimal::from(record.output_tokens)
        .checked_mul(entry.output_rate)
        .ok_or_else(|| overflow_error(record))?;
    let total = input_cost
        .checked_add(output_cost)
        .ok_or_else(|| overflow_error(record))?;

    let formatted = format_usd_8(total);
    record.cost_usd = Some(formatted.clone());
    Ok(CostOutcome::Priced(formatted))
}

fn overflow_error(record: &UsageRecord) -> CostError {
    CostError::InvalidRecord(format!(
        "cost overflow for model '{}' (input_tokens={}, output_tokens={})",
        record.model, record.input_tokens, record.output_tokens
    ))
}

/// Wire contract: fixed-point, exactly 8 fraction digits, rounded
/// half-away-from-zero at the 8th digit.
pub fn format_usd_8(amount: Decimal) -> String {
    let mut quantized = amount.round_dp_with_strategy(8, RoundingStrategy::MidpointAwayFromZero);
    quantized.rescale(8);
    quantized.to_string()
}
