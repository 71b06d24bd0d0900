//! Economic indicator table.
//!
//! Four macro series (VIX, 10Y Treasury, DXY, Gold) advanced by a bounded
//! random walk once per price sweep. Values never leave their band and status
//! is always derived from the thresholds, initial values included.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{EconomicIndicator, IndicatorStatus};

/// Static description of one tracked series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorBand {
    pub key: &'static str,
    pub name: &'static str,
    pub initial_value: f64,
    pub initial_change: f64,
    /// Largest absolute move per tick
    pub max_step: f64,
    pub floor: f64,
    pub ceiling: f64,
    /// Status is `low` strictly below this
    pub low_below: f64,
    /// Status is `high` strictly above this
    pub high_above: f64,
}

impl IndicatorBand {
    pub fn status_for(&self, value: f64) -> IndicatorStatus {
        if value < self.low_below {
            IndicatorStatus::Low
        } else if value > self.high_above {
            IndicatorStatus::High
        } else {
            IndicatorStatus::Neutral
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.floor, self.ceiling)
    }
}

pub const VIX: IndicatorBand = IndicatorBand {
    key: "VIX",
    name: "VIX",
    initial_value: 16.25,
    initial_change: -0.85,
    max_step: 0.15,
    floor: 12.0,
    ceiling: 35.0,
    low_below: 18.0,
    high_above: 25.0,
};

pub const TREASURY_10Y: IndicatorBand = IndicatorBand {
    key: "10Y_TREASURY",
    name: "10Y Treasury",
    initial_value: 4.28,
    initial_change: 0.03,
    max_step: 0.015,
    floor: 3.5,
    ceiling: 5.0,
    low_below: 4.0,
    high_above: 4.5,
};

pub const DXY: IndicatorBand = IndicatorBand {
    key: "DXY",
    name: "DXY",
    initial_value: 104.12,
    initial_change: 0.18,
    max_step: 0.075,
    floor: 100.0,
    ceiling: 108.0,
    low_below: 102.0,
    high_above: 106.0,
};

pub const GOLD: IndicatorBand = IndicatorBand {
    key: "GOLD",
    name: "Gold",
    initial_value: 2038.5,
    initial_change: -8.3,
    max_step: 4.0,
    floor: 1900.0,
    ceiling: 2100.0,
    low_below: 1950.0,
    high_above: 2025.0,
};

/// Registration order is the order snapshots are returned in
pub const TRACKED_INDICATORS: [IndicatorBand; 4] = [VIX, TREASURY_10Y, DXY, GOLD];

struct TrackedIndicator {
    band: IndicatorBand,
    record: EconomicIndicator,
}

pub struct EconomicIndicators {
    rng: StdRng,
    tracked: Vec<TrackedIndicator>,
}

impl EconomicIndicators {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        let now = Utc::now();
        let tracked = TRACKED_INDICATORS
            .iter()
            .map(|band| TrackedIndicator {
                band: *band,
                record: EconomicIndicator {
                    name: band.name.to_string(),
                    value: band.initial_value,
                    change: band.initial_change,
                    timestamp: now,
                    status: band.status_for(band.initial_value),
                },
            })
            .collect();

        Self { rng, tracked }
    }

    /// Advance every indicator by one bounded random step
    pub fn tick(&mut self, now: DateTime<Utc>) {
        for indicator in &mut self.tracked {
            let band = indicator.band;
            let delta = self.rng.gen_range(-band.max_step..band.max_step);
            let record = &mut indicator.record;

            record.value = band.clamp(record.value + delta);
            record.change = delta;
            record.timestamp = now;
            record.status = band.status_for(record.value);
        }
    }

    pub fn snapshot(&self) -> Vec<EconomicIndicator> {
        self.tracked.iter().map(|i| i.record.clone()).collect()
    }
}

impl Default for EconomicIndicators {
    fn default() -> Self {
        Self::new()
    }
}
