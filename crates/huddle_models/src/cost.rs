//! Per-call cost estimation.

use huddle_rate_limit::ModelPricing;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Rough token count: four characters per token.
pub fn estimate_tokens(chars: usize) -> u64 {
    (chars / 4) as u64
}

/// Estimated cost of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEntry {
    /// Model that served the call
    pub model: String,
    /// Estimated prompt tokens
    pub input_tokens: u64,
    /// Estimated completion tokens
    pub output_tokens: u64,
    /// Estimated cost in USD
    pub cost_usd: f64,
}

/// Running record of generation spend for one process.
///
/// Shared between drivers behind an `Arc`. Models missing from the price
/// table are recorded at zero cost.
#[derive(Debug, Default)]
pub struct CostLedger {
    pricing: HashMap<String, ModelPricing>,
    entries: Mutex<Vec<CostEntry>>,
}

impl CostLedger {
    /// Creates an empty ledger over a price table.
    pub fn new(pricing: HashMap<String, ModelPricing>) -> Self {
        Self {
            pricing,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Prices one call from its character counts and records it.
    pub fn record(&self, model: &str, prompt_chars: usize, completion_chars: usize) -> CostEntry {
        let input_tokens = estimate_tokens(prompt_chars);
        let output_tokens = estimate_tokens(completion_chars);
        let cost_usd = self
            .pricing
            .get(model)
            .map(|p| {
                input_tokens as f64 / 1_000_000.0 * p.input_per_million
                    + output_tokens as f64 / 1_000_000.0 * p.output_per_million
            })
            .unwrap_or(0.0);

        let entry = CostEntry {
            model: model.to_string(),
            input_tokens,
            output_tokens,
            cost_usd,
        };
        debug!(
            model,
            input_tokens,
            output_tokens,
            cost_usd = %format!("{:.4}", cost_usd),
            "Estimated call cost"
        );

        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry.clone()),
            Err(_) => warn!("Cost ledger lock poisoned, entry dropped"),
        }
        entry
    }

    /// Every recorded call, in order.
    pub fn entries(&self) -> Vec<CostEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Sum of all recorded estimates in USD.
    pub fn total_usd(&self) -> f64 {
        self.entries().iter().map(|e| e.cost_usd).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> CostLedger {
        let mut pricing = HashMap::new();
        pricing.insert(
            "gpt-5".to_string(),
            ModelPricing {
                input_per_million: 1.25,
                output_per_million: 10.0,
            },
        );
        CostLedger::new(pricing)
    }

    #[test]
    fn prices_known_model_from_char_counts() {
        let ledger = ledger();
        let entry = ledger.record("gpt-5", 4_000_000, 400_000);
        assert_eq!(entry.input_tokens, 1_000_000);
        assert_eq!(entry.output_tokens, 100_000);
        assert!((entry.cost_usd - 2.25).abs() < 1e-9);
    }

    #[test]
    fn unknown_model_costs_nothing_but_is_recorded() {
        let ledger = ledger();
        ledger.record("mystery-model", 4000, 4000);
        ledger.record("gpt-5", 4_000_000, 0);
        assert_eq!(ledger.entries().len(), 2);
        assert!((ledger.total_usd() - 1.25).abs() < 1e-9);
    }
}
