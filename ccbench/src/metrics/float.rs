use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A totally ordered `f64`: NaN is equal to itself and larger than any other
/// value, so `F64` can be used as a key in sorted collections.
#[derive(Deserialize, Serialize, Clone, Copy)]
pub struct F64(f64);

impl F64 {
    pub fn new(x: f64) -> Self {
        Self(x)
    }

    pub fn zero() -> Self {
        Self::new(0.0)
    }

    pub fn nan() -> Self {
        Self::new(f64::NAN)
    }

    /// Formats the inner `f64` with `decimals` decimal places.
    pub fn round(self, decimals: usize) -> String {
        format!("{:.*}", decimals, self.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::ops::Add for F64 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl std::ops::Mul<f64> for F64 {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        Self(self.0 * factor)
    }
}

impl std::ops::Div<f64> for F64 {
    type Output = Self;

    fn div(self, divisor: f64) -> Self {
        Self(self.0 / divisor)
    }
}

// based on: https://github.com/reem/rust-ordered-float/ `cmp` implementation for `OrderedFloat`
impl Ord for F64 {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.partial_cmp(&other.0) {
            Some(ordering) => ordering,
            None => {
                if self.0.is_nan() {
                    if other.0.is_nan() {
                        Ordering::Equal
                    } else {
                        Ordering::Greater
                    }
                } else {
                    Ordering::Less
                }
            }
        }
    }
}

impl PartialOrd for F64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for F64 {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() {
            other.0.is_nan()
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for F64 {}

impl fmt::Debug for F64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for F64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
