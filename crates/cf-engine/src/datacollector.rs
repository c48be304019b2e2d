//! Periodic sampling of watched `component.field` paths.

use cf_core::{Real, ensure_positive};
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::network::{Network, PropertyRef};

/// Default sample interval in seconds.
pub const DEFAULT_SAMPLE_INTERVAL: Real = 0.005;

/// One watched property.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchItem {
    pub label: String,
    pub path: String,
    property: PropertyRef,
}

/// Values of the watch list at one instant, in watch-list order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: Real,
    pub values: Vec<Real>,
}

/// Samples the watch list every `sample_interval` seconds of model time.
///
/// Changing the watch list discards collected samples so every sample always
/// has one value per watched item.
#[derive(Debug, Clone)]
pub struct Datacollector {
    watch_list: Vec<WatchItem>,
    sample_interval: Real,
    interval_counter: Real,
    samples: Vec<Sample>,
}

impl Default for Datacollector {
    fn default() -> Self {
        Self {
            watch_list: Vec::new(),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            interval_counter: 0.0,
            samples: Vec::new(),
        }
    }
}

impl Datacollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch_list(&self) -> &[WatchItem] {
        &self.watch_list
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sample_interval(&self) -> Real {
        self.sample_interval
    }

    /// Add `path` under `label`, resolving it against `network`.
    pub fn add_to_watchlist(
        &mut self,
        label: impl Into<String>,
        path: &str,
        network: &Network,
    ) -> EngineResult<()> {
        let label = label.into();
        if self.watch_list.iter().any(|w| w.label == label) {
            return Err(EngineError::DuplicateName {
                name: label,
                context: "watch list",
            });
        }
        let property = network.resolve(path)?;
        self.clear_data();
        self.watch_list.push(WatchItem {
            label,
            path: path.to_string(),
            property,
        });
        Ok(())
    }

    /// Drop every watched item and the collected samples.
    pub fn clear_watchlist(&mut self) {
        self.clear_data();
        self.watch_list.clear();
    }

    pub fn clear_data(&mut self) {
        self.samples.clear();
    }

    /// Set the sample interval. Intervals shorter than `dt` sample every step.
    pub fn set_sample_interval(&mut self, interval: Real, dt: Real) -> EngineResult<()> {
        let interval = ensure_positive(interval, "sample_interval").map_err(|e| {
            EngineError::InvalidArg {
                what: e.to_string(),
            }
        })?;
        if interval < dt {
            warn!(interval, dt, "sample interval is shorter than the step size");
        }
        self.sample_interval = interval;
        Ok(())
    }

    /// Called once per step after the clock advanced.
    pub fn collect(&mut self, clock: Real, dt: Real, network: &Network) {
        if self.interval_counter >= self.sample_interval {
            self.interval_counter = 0.0;
            if !self.watch_list.is_empty() {
                let values = self
                    .watch_list
                    .iter()
                    .map(|w| network.read_property(&w.property).unwrap_or(Real::NAN))
                    .collect();
                self.samples.push(Sample {
                    time: clock,
                    values,
                });
            }
        }
        self.interval_counter += dt;
    }

    /// Render the samples as CSV with a `time` column followed by one column per label.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("time");
        for item in &self.watch_list {
            out.push(',');
            out.push_str(&item.label);
        }
        out.push('\n');
        for sample in &self.samples {
            out.push_str(&sample.time.to_string());
            for value in &sample.values {
                out.push(',');
                out.push_str(&value.to_string());
            }
            out.push('\n');
        }
        out
    }
}
