//! Per-model token prices (USD per 1,000 tokens).

/// Price pair for one model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

/// Registry entry
#[derive(Debug, Clone, Copy)]
pub struct PricingEntry {
    pub model: &'static str,
    pub price: ModelPrice,
    pub description: &'static str,
}

/// Model used when nothing else matches
pub const DEFAULT_MODEL: &str = "gpt-4o";

// Order matters: prefix lookup takes the first hit, so "gpt-4o" has to be
// checked before "gpt-4".
const PRICING: &[PricingEntry] = &[
    PricingEntry {
        model: "gpt-4o",
        price: ModelPrice { input_per_1k: 0.005, output_per_1k: 0.015 },
        description: "GPT-4o - Fastest and most cost-effective GPT-4 model",
    },
    PricingEntry {
        model: "gpt-4o-mini",
        price: ModelPrice { input_per_1k: 0.00015, output_per_1k: 0.0006 },
        description: "GPT-4o Mini - Most affordable model",
    },
    PricingEntry {
        model: "gpt-4-turbo",
        price: ModelPrice { input_per_1k: 0.01, output_per_1k: 0.03 },
        description: "GPT-4 Turbo - High performance at lower cost",
    },
    PricingEntry {
        model: "gpt-4",
        price: ModelPrice { input_per_1k: 0.03, output_per_1k: 0.06 },
        description: "GPT-4 - Most capable model",
    },
    PricingEntry {
        model: "gpt-3.5-turbo",
        price: ModelPrice { input_per_1k: 0.0015, output_per_1k: 0.002 },
        description: "GPT-3.5 Turbo - Fast and affordable",
    },
];

/// All registry entries in lookup order.
pub fn entries() -> &'static [PricingEntry] {
    PRICING
}

fn lookup(model_name: &str) -> Option<&'static PricingEntry> {
    let key = model_name.trim().to_lowercase();

    PRICING
        .iter()
        .find(|e| e.model == key)
        .or_else(|| PRICING.iter().find(|e| key.starts_with(e.model)))
}

fn default_entry() -> &'static PricingEntry {
    // The registry is static and contains DEFAULT_MODEL.
    PRICING
        .iter()
        .find(|e| e.model == DEFAULT_MODEL)
        .unwrap_or(&PRICING[0])
}

/// Resolves prices: exact match, then first prefix match, then the default model.
pub fn price_for(model_name: &str) -> ModelPrice {
    lookup(model_name).unwrap_or_else(default_entry).price
}

/// Registry key the model name resolves to.
pub fn resolve_model(model_name: &str) -> &'static str {
    lookup(model_name).unwrap_or_else(default_entry).model
}

/// Human description; generic text for unknown models.
pub fn describe(model_name: &str) -> &'static str {
    lookup(model_name).map_or("OpenAI model", |e| e.description)
}

/// USD cost rounded to 6 decimal places.
pub fn cost(input_tokens: u64, output_tokens: u64, model_name: &str) -> f64 {
    let price = price_for(model_name);
    let input_cost = (input_tokens as f64 / 1000.0) * price.input_per_1k;
    let output_cost = (output_tokens as f64 / 1000.0) * price.output_per_1k;
    round6(input_cost + output_cost)
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert_eq!(resolve_model("GPT-4o-Mini"), "gpt-4o-mini");
        assert_eq!(resolve_model("  gpt-4  "), "gpt-4");
        assert_eq!(price_for("gpt-3.5-turbo").input_per_1k, 0.0015);
    }

    #[test]
    fn test_exact_match_beats_prefix() {
        // "gpt-4o-mini" also starts with "gpt-4o"
        let price = price_for("gpt-4o-mini");
        assert_eq!(price.input_per_1k, 0.00015);
        assert_eq!(price.output_per_1k, 0.0006);
    }

    #[test]
    fn test_prefix_match_for_dated_variants() {
        assert_eq!(resolve_model("gpt-4-0613"), "gpt-4");
        assert_eq!(resolve_model("gpt-4o-2024-08-06"), "gpt-4o");
        assert_eq!(resolve_model("gpt-3.5-turbo-16k"), "gpt-3.5-turbo");
        assert_eq!(price_for("gpt-4-0613").input_per_1k, 0.03);
    }

    #[test]
    fn test_prefix_order_is_registry_order() {
        // "gpt-4-turbo-preview" matches both "gpt-4-turbo" and "gpt-4";
        // "gpt-4-turbo" comes first
        assert_eq!(resolve_model("gpt-4-turbo-preview"), "gpt-4-turbo");
    }

    #[test]
    fn test_unknown_model_uses_default() {
        assert_eq!(resolve_model("claude-3-opus"), DEFAULT_MODEL);
        assert_eq!(price_for(""), price_for("gpt-4o"));
        assert_eq!(describe("mystery"), "OpenAI model");
    }

    #[test]
    fn test_cost_gpt4o_scenario() {
        assert!(approx(cost(100, 50, "gpt-4o"), 0.00125));
    }

    #[test]
    fn test_cost_zero_and_deterministic() {
        for entry in entries() {
            assert_eq!(cost(0, 0, entry.model), 0.0);
            assert_eq!(cost(1234, 567, entry.model), cost(1234, 567, entry.model));
        }
    }

    #[test]
    fn test_cost_rounds_to_six_places() {
        // 1 token on gpt-4o-mini input = 0.00000015 -> rounds to 0.0
        assert_eq!(cost(1, 0, "gpt-4o-mini"), 0.0);
        // 7 tokens = 0.00000105 -> 0.000001
        assert!(approx(cost(7, 0, "gpt-4o-mini"), 0.000001));
        assert!(approx(cost(1000, 1000, "gpt-4"), 0.09));
    }

    #[test]
    fn test_entries_all_non_negative() {
        assert_eq!(entries().len(), 5);
        for e in entries() {
            assert!(e.price.input_per_1k >= 0.0);
            assert!(e.price.output_per_1k >= 0.0);
        }
    }
}
