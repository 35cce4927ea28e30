use crate::alerts::{EmailAlertDispatcher, UnknownModelAlert};
use crate::cost::{is_eligible, resolve_cost, CostOutcome, DEFAULT_SUCCESS_STATUS};
use crate::error::CostError;
use crate::payload::{parse, render, Payload};
use crate::pricing::{get_pricing, PricingTable};
use std::path::Path;
use tracing::debug;

/// Walks a usage batch in order and annotates eligible records with their
/// estimated cost. Ineligible records pass through untouched; unknown models
/// stay unpriced and trigger a best-effort alert.
pub struct Estimator {
    table: PricingTable,
    success_status: String,
    alerts: Box<dyn UnknownModelAlert + Send + Sync>,
}

impl Estimator {
    pub fn new(table: PricingTable) -> Self {
        Self {
            table,
            success_status: DEFAULT_SUCCESS_STATUS.to_string(),
            alerts: Box::new(EmailAlertDispatcher::from_env()),
        }
    }

    pub fn with_success_status(mut self, status: impl Into<String>) -> Self {
        self.success_status = status.into();
        self
    }

    pub fn with_alerts(mut self, alerts: Box<dyn UnknownModelAlert + Send + Sync>) -> Self {
        self.alerts = alerts;
        self
    }

    /// Returns the batch in the same shape it came in (text in, text out;
    /// object in, object out), with the same length and record order. Fatal
    /// errors abort the call with no partial output.
    pub fn estimate(&self, payload: impl Into<Payload>) -> Result<Payload, CostError> {
        let payload = payload.into();
        let (mut batch, shape) = parse(&payload)?;

        for record in batch.records.iter_mut() {
            if !is_eligible(record, &self.success_status) {
                continue;
            }
            match resolve_cost(record, &self.table)? {
                CostOutcome::Priced(_) => {}
                CostOutcome::Unpriced => {
                    let record = &*record;
                    debug!(model = %record.model, module = %record.module, "model not in pricing table");
                    self.alerts.notify_unknown_model(&record.model, record);
                }
            }
        }

        render(&batch, shape)
    }
}

/// Convenience entry point: loads pricing (bundled default, or `pricing_path`
/// as a full replacement), reads alert settings from the environment, and
/// estimates the batch.
pub fn estimate_cost(
    payload: impl Into<Payload>,
    pricing_path: Option<&Path>,
) -> Result<Payload, CostError> {
    let table = get_pricing(pricing_path)?;
    Estimator::new(table).estimate(payload)
}
