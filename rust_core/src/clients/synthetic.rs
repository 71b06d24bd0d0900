//! Synthetic quote generator
//!
//! Last stage of every quote chain and the reason the aggregator never has a
//! "no data" state. Output is deterministic in shape (baseline table, volatility
//! class, volume range) and pseudo-random in value. The RNG is seedable so tests
//! can pin exact sequences.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{PricePoint, PriceSource};

/// Baseline used for symbols missing from the table
pub const DEFAULT_BASELINE: f64 = 100.0;

/// Volume range used for symbols missing from the table
pub const DEFAULT_VOLUME_RANGE: (u64, u64) = (1_000_000, 10_000_000);

/// Where each synthetic move starts from.
///
/// `change` and `changePercent` are always measured against the static
/// baseline; the modes only differ in long-run drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticDrift {
    /// Start from the previously cached price, so ticks accumulate
    #[default]
    RandomWalk,
    /// Start from the baseline every time, so prices never wander
    Baseline,
}

impl FromStr for SyntheticDrift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random_walk" | "walk" => Ok(SyntheticDrift::RandomWalk),
            "baseline" => Ok(SyntheticDrift::Baseline),
            other => Err(format!("unknown synthetic drift mode: {}", other)),
        }
    }
}

/// Per-symbol volatility bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityClass {
    IndexEtf,
    Standard,
    HighBeta,
    VolatilityIndex,
}

impl VolatilityClass {
    pub fn of(symbol: &str) -> Self {
        match symbol {
            "VIX" => VolatilityClass::VolatilityIndex,
            "TSLA" | "NVDA" | "META" => VolatilityClass::HighBeta,
            "SPY" | "QQQ" => VolatilityClass::IndexEtf,
            _ => VolatilityClass::Standard,
        }
    }

    /// Maximum fractional move per generated quote
    pub fn multiplier(&self) -> f64 {
        match self {
            VolatilityClass::IndexEtf => 0.008,
            VolatilityClass::Standard => 0.015,
            VolatilityClass::HighBeta => 0.03,
            VolatilityClass::VolatilityIndex => 0.08,
        }
    }
}

/// Reference price for a symbol
pub fn baseline_price(symbol: &str) -> f64 {
    match symbol {
        // Index ETFs
        "SPY" => 598.45,
        "QQQ" => 515.20,
        "VIX" => 16.25,
        // Single names
        "AAPL" => 225.80,
        "NVDA" => 145.50,
        "MSFT" => 445.20,
        "GOOGL" => 185.40,
        "AMZN" => 220.15,
        "TSLA" => 415.30,
        "META" => 595.80,
        "JPM" => 245.60,
        "JNJ" => 148.90,
        "V" => 315.40,
        "XOM" => 118.75,
        "BRK.B" => 465.20,
        "TSM" => 205.30,
        "ASML" => 715.60,
        _ => DEFAULT_BASELINE,
    }
}

/// Plausible daily share volume range `[min, max)`
pub fn volume_range(symbol: &str) -> (u64, u64) {
    match symbol {
        "SPY" => (50_000_000, 120_000_000),
        "QQQ" => (30_000_000, 80_000_000),
        "AAPL" => (40_000_000, 100_000_000),
        "NVDA" => (200_000_000, 500_000_000),
        "TSLA" => (80_000_000, 200_000_000),
        "MSFT" => (20_000_000, 50_000_000),
        "GOOGL" => (15_000_000, 35_000_000),
        "AMZN" => (25_000_000, 60_000_000),
        _ => DEFAULT_VOLUME_RANGE,
    }
}

pub struct SyntheticQuoteGenerator {
    rng: Mutex<StdRng>,
    drift: SyntheticDrift,
}

impl SyntheticQuoteGenerator {
    pub fn new(drift: SyntheticDrift) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            drift,
        }
    }

    /// Reproducible generator for tests and golden output
    pub fn with_seed(drift: SyntheticDrift, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            drift,
        }
    }

    /// Generate a quote for `symbol`.
    ///
    /// `previous` is the last cached price, consulted only in
    /// [`SyntheticDrift::RandomWalk`] mode.
    pub fn generate(&self, symbol: &str, previous: Option<f64>) -> PricePoint {
        let baseline = baseline_price(symbol);
        let multiplier = VolatilityClass::of(symbol).multiplier();
        let (min_volume, max_volume) = volume_range(symbol);

        let start = match (self.drift, previous) {
            (SyntheticDrift::RandomWalk, Some(prev)) if prev > 0.0 => prev,
            _ => baseline,
        };

        let (movement, volume) = {
            let mut rng = self.rng.lock();
            let movement = rng.gen_range(-multiplier..multiplier);
            let volume = rng.gen_range(min_volume..max_volume);
            (movement, volume)
        };

        PricePoint::from_reference(
            symbol,
            start * (1.0 + movement),
            baseline,
            volume,
            PriceSource::Synthetic,
        )
    }
}
