use crate::error::CostError;
use once_cell::sync::OnceCell;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUNDLED_PRICING: &str = include_str!("model_pricing.json");

/// Per-token USD rates for one canonical model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingEntry {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub input_rate: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub output_rate: Decimal,
}

#[derive(Debug, Deserialize)]
struct PricingFile {
    models: HashMap<String, PricingEntry>,
    #[serde(default)]
    aliases: HashMap<String, String>,
}

/// Canonical entries plus an alias map sharing one lookup namespace.
/// Read-only after construction, safe to share across threads.
#[derive(Debug, Clone)]
pub struct PricingTable {
    entries: HashMap<String, PricingEntry>,
    aliases: HashMap<String, String>,
}

impl PricingTable {
    /// Loads pricing from `path`, or the bundled table when `path` is `None`.
    /// An explicit path fully replaces the bundled source, no merging.
    pub fn load(path: Option<&Path>) -> Result<Self, CostError> {
        match path {
            Some(p) => {
                let raw = fs::read_to_string(p).map_err(|e| {
                    CostError::PricingLoad(format!("cannot read pricing file {}: {e}", p.display()))
                })?;
                Self::from_json(&raw)
            }
            None => Self::from_json(BUNDLED_PRICING),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, CostError> {
        let file: PricingFile = serde_json::from_str(raw)
            .map_err(|e| CostError::PricingLoad(format!("malformed pricing data: {e}")))?;

        for (model, entry) in &file.models {
            if entry.input_rate.is_sign_negative() || entry.output_rate.is_sign_negative() {
                return Err(CostError::PricingLoad(format!(
                    "negative rate for model '{model}'"
                )));
            }
        }

        for (alias, canonical) in &file.aliases {
            if file.models.contains_key(alias) {
                return Err(CostError::PricingLoad(format!(
                    "alias '{alias}' duplicates a canonical model name"
                )));
            }
            if !file.models.contains_key(canonical) {
                return Err(CostError::PricingLoad(format!(
                    "alias '{alias}' points at unknown model '{canonical}'"
                )));
            }
        }

        Ok(Self {
            entries: file.models,
            aliases: file.aliases,
        })
    }

    /// Case-sensitive exact-match lookup across canonical names and aliases.
    pub fn resolve(&self, model: &str) -> Option<&PricingEntry> {
        if let Some(entry) = self.entries.get(model) {
            return Some(entry);
        }
        self.aliases
            .get(model)
            .and_then(|canonical| self.entries.get(canonical))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static BUNDLED_TABLE: OnceCell<PricingTable> = OnceCell::new();

/// Returns the pricing table for an estimation call. The bundled default is
/// parsed once per process; an explicit path is loaded fresh every time.
pub fn get_pricing(path: Option<&Path>) -> Result<PricingTable, CostError> {
    match path {
        Some(p) => PricingTable::load(Some(p)),
        None => BUNDLED_TABLE
            .get_or_try_init(|| PricingTable::load(None))
            .cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_table_loads_and_resolves() {
        let table = get_pricing(None).expect("bundled pricing loads");
        assert!(!table.is_empty());
        assert!(table.resolve("gpt-5-mini").is_some());
        assert!(table.resolve("made-up-model").is_none());
    }

    #[test]
    fn alias_resolves_to_its_canonical_entry() {
        let table = PricingTable::from_json(
            r#"{
                "models": { "gpt-5-pro": { "input_rate": 0.000015, "output_rate": 0.00012 } },
                "aliases": { "gpt-5-pro-alias": "gpt-5-pro" }
            }"#,
        )
        .expect("table loads");

        let direct = table.resolve("gpt-5-pro").expect("canonical hit");
        let via_alias = table.resolve("gpt-5-pro-alias").expect("alias hit");
        assert_eq!(direct.input_rate, via_alias.input_rate);
        assert_eq!(direct.output_rate, via_alias.output_rate);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = PricingTable::from_json(
            r#"{ "models": { "gpt-5-mini": { "input_rate": 0.00000025, "output_rate": 0.000002 } } }"#,
        )
        .expect("table loads");

        assert!(table.resolve("gpt-5-mini").is_some());
        assert!(table.resolve("GPT-5-Mini").is_none());
    }

    #[test]
    fn alias_clashing_with_a_model_name_is_rejected() {
        let err = PricingTable::from_json(
            r#"{
                "models": {
                    "gpt-5-mini": { "input_rate": 0.00000025, "output_rate": 0.000002 },
                    "gpt-5-pro": { "input_rate": 0.000015, "output_rate": 0.00012 }
                },
                "aliases": { "gpt-5-mini": "gpt-5-pro" }
            }"#,
        )
        .expect_err("duplicate name must fail");
        assert!(matches!(err, CostError::PricingLoad(_)));
    }

    #[test]
    fn alias_to_unknown_canonical_is_rejected() {
        let err = PricingTable::from_json(
            r#"{
                "models": { "gpt-5-mini": { "input_rate": 0.00000025, "output_rate": 0.000002 } },
                "aliases": { "old-name": "gone-model" }
            }"#,
        )
        .expect_err("dangling alias must fail");
        assert!(matches!(err, CostError::PricingLoad(_)));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let err = PricingTable::from_json(
            r#"{ "models": { "bad": { "input_rate": -0.1, "output_rate": 0.0 } } }"#,
        )
        .expect_err("negative rate must fail");
        assert!(matches!(err, CostError::PricingLoad(_)));
    }

    #[test]
    fn load_reads_an_override_file_and_reports_missing_paths() {
        let mut file = tempfile::NamedTempFile::new().expect("temp pricing file");
        write!(
            file,
            r#"{{ "models": {{ "custom": {{ "input_rate": 0.0000001, "output_rate": 0.0000002 }} }} }}"#
        )
        .expect("write pricing");

        let table = PricingTable::load(Some(file.path())).expect("override loads");
        assert!(table.resolve("custom").is_some());
        assert!(table.resolve("gpt-5-mini").is_none());

        let err = PricingTable::load(Some(Path::new("/nonexistent/pricing.json")))
            .expect_err("missing file must fail");
        assert!(matches!(err, CostError::PricingLoad(_)));
    }

    #[test]
    fn malformed_pricing_json_is_rejected() {
        let err = PricingTable::from_json("{ not json").expect_err("malformed must fail");
        assert!(matches!(err, CostError::PricingLoad(_)));
    }
}
