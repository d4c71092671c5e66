use serde::{Deserialize, Serialize};
use std::fmt;

/// Columns of a benchmark results table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
)]
pub enum Column {
    Scenario,
    Variant,
    Cbr,
    Throughput,
    AvgRtt,
    DropRate,
    /// `DropRate` as a percentage; derived, never read from the input
    DropRatePercent,
}

impl Column {
    /// Columns read from the input file, in their usual order.
    pub const STORED: [Column; 6] = [
        Column::Scenario,
        Column::Variant,
        Column::Cbr,
        Column::Throughput,
        Column::AvgRtt,
        Column::DropRate,
    ];

    /// Numeric columns read from the input file.
    pub const NUMERIC: [Column; 4] = [
        Column::Cbr,
        Column::Throughput,
        Column::AvgRtt,
        Column::DropRate,
    ];

    /// Header of this column in the input file (or table output).
    pub fn header(&self) -> &'static str {
        match self {
            Column::Scenario => "Scenario",
            Column::Variant => "Variant",
            Column::Cbr => "CBR(Mbps)",
            Column::Throughput => "Throughput(Mbps)",
            Column::AvgRtt => "AvgRTT(ms)",
            Column::DropRate => "DropRate",
            Column::DropRatePercent => "DropRate (%)",
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Column::Scenario | Column::Variant)
    }

    pub fn is_numeric(&self) -> bool {
        !self.is_categorical()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// One row of a benchmark results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// simulation topology/run; only present in multi-scenario files
    pub scenario: Option<String>,
    /// congestion-control algorithm
    pub variant: String,
    /// offered load (Mbps)
    pub cbr: f64,
    /// throughput (Mbps)
    pub throughput: f64,
    /// average round-trip time (ms)
    pub avg_rtt: f64,
    /// fraction of packets lost, in [0, 1]
    pub drop_rate: f64,
}

impl Measurement {
    pub fn drop_rate_percent(&self) -> f64 {
        self.drop_rate * 100.0
    }

    /// Value of a numeric column; `None` for categorical columns.
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Cbr => Some(self.cbr),
            Column::Throughput => Some(self.throughput),
            Column::AvgRtt => Some(self.avg_rtt),
            Column::DropRate => Some(self.drop_rate),
            Column::DropRatePercent => Some(self.drop_rate_percent()),
            Column::Scenario | Column::Variant => None,
        }
    }

    /// Label of a categorical column; `None` for numeric columns and for a
    /// missing scenario.
    pub fn label(&self, column: Column) -> Option<&str> {
        match column {
            Column::Scenario => self.scenario.as_deref(),
            Column::Variant => Some(&self.variant),
            _ => None,
        }
    }
}
