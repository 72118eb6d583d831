use std::{
    cmp::Ordering,
    iter::Sum,
    ops::{Add, AddAssign},
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize, JsonSchema)]
pub struct Kilometers(f64);

impl Kilometers {
    pub const ZERO: Kilometers = Kilometers(0.0);

    pub fn new(value: f64) -> Self {
        Kilometers(value)
    }

    pub fn from_meters(meters: f64) -> Self {
        Kilometers(meters / 1000.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for Kilometers {
    fn from(value: f64) -> Self {
        Kilometers::new(value)
    }
}

impl Add for Kilometers {
    type Output = Kilometers;

    fn add(self, other: Kilometers) -> Kilometers {
        Kilometers(self.0 + other.0)
    }
}

impl AddAssign for Kilometers {
    fn add_assign(&mut self, other: Kilometers) {
        self.0 += other.0;
    }
}

impl Sum for Kilometers {
    fn sum<I: Iterator<Item = Kilometers>>(iter: I) -> Kilometers {
        iter.fold(Kilometers::ZERO, |acc, x| acc + x)
    }
}

impl std::fmt::Display for Kilometers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} km", self.0)
    }
}
