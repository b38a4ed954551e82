//! Boundary index configuration

use firefly_core::{FireflyError, Result, Selector};
use serde::{Deserialize, Serialize};

/// Parameters for `BoundaryIndex`, parsed from the `[boundary]` table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Class selectors of the elements fireflies keep clear of
    pub selectors: Vec<String>,
    /// Screen-space margin added around each element, in pixels
    pub padding: f32,
    /// Influence zone as a fraction of each boundary's half-extent
    pub influence_factor: f32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            selectors: [".venue-name", ".band-name", ".date-display", ".tagline", ".event-info"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            padding: 50.0,
            influence_factor: 0.8,
        }
    }
}

impl BoundaryConfig {
    pub fn validate(&self) -> Result<()> {
        self.parsed_selectors()?;
        FireflyError::check_range("boundary.padding", self.padding as f64, 0.0, 10_000.0)?;
        if !(self.influence_factor > 0.0 && self.influence_factor.is_finite()) {
            return Err(FireflyError::invalid("boundary.influence_factor", "must be positive"));
        }
        Ok(())
    }

    pub fn parsed_selectors(&self) -> Result<Vec<Selector>> {
        self.selectors.iter().map(|s| Selector::parse(s)).collect()
    }
}
