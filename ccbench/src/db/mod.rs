mod measurement_db;

// Re-exports.
pub use measurement_db::MeasurementDB;

use crate::measurement::{Column, Measurement};
use color_eyre::eyre;
use color_eyre::Report;

/// Value that matches every row when used as a search value.
pub const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Search {
    scenario: Option<String>,
    variant: Option<String>,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenario(&mut self, scenario: &str) -> &mut Self {
        self.scenario = Self::constraint(scenario);
        self
    }

    pub fn variant(&mut self, variant: &str) -> &mut Self {
        self.variant = Self::constraint(variant);
        self
    }

    /// Constrains a categorical `column` to `value`.
    pub fn set(
        &mut self,
        column: Column,
        value: &str,
    ) -> Result<&mut Self, Report> {
        match column {
            Column::Scenario => Ok(self.scenario(value)),
            Column::Variant => Ok(self.variant(value)),
            column => {
                eyre::bail!("cannot search on numeric column {:?}", column)
            }
        }
    }

    /// Value a categorical `column` is constrained to, if any.
    pub fn get(&self, column: Column) -> Option<&str> {
        match column {
            Column::Scenario => self.scenario.as_deref(),
            Column::Variant => self.variant.as_deref(),
            _ => None,
        }
    }

    /// Checks whether this search constrains the `Scenario` column.
    pub fn uses_scenario(&self) -> bool {
        self.scenario.is_some()
    }

    pub fn matches(&self, measurement: &Measurement) -> bool {
        // filter out rows with a different scenario (if set)
        if let Some(scenario) = &self.scenario {
            if measurement.scenario.as_deref() != Some(scenario.as_str()) {
                return false;
            }
        }

        // filter out rows with a different variant (if set)
        if let Some(variant) = &self.variant {
            if &measurement.variant != variant {
                return false;
            }
        }

        true
    }

    // stored values are trimmed when loaded, so searched values are trimmed
    // as well; `ALL` means no constraint
    fn constraint(value: &str) -> Option<String> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(ALL) {
            None
        } else {
            Some(value.to_string())
        }
    }
}
