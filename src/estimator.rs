//! Cost estimation formula
//!
//! Everything here is a pure function of fixed rate tables. The paid tier
//! always recomputes through this module on the server; nothing a client
//! sends as a cost figure is ever trusted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Smallest accepted built-up area in square feet
pub const MIN_AREA: f64 = 100.0;
/// Largest accepted built-up area in square feet
pub const MAX_AREA: f64 = 100_000.0;
/// Areas up to and including this value fall into the short timeline
pub const TIMELINE_THRESHOLD: f64 = 1500.0;

/// Estimation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    #[error("Invalid {field}")]
    InvalidInput { field: &'static str },
}

impl EstimateError {
    fn field(field: &'static str) -> Self {
        Self::InvalidInput { field }
    }
}

/// Construction quality grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specification {
    Basic,
    Standard,
    Premium,
}

/// Regional cost tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Low,
    Medium,
    High,
}

/// Number of floors above ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Floors {
    G0,
    G1,
    G2,
}

/// Per-square-foot base rate pair for a specification tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseRate {
    pub min: f64,
    pub max: f64,
}

impl Specification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }

    pub fn base_rate(&self) -> BaseRate {
        match self {
            Self::Basic => BaseRate { min: 1600.0, max: 1900.0 },
            Self::Standard => BaseRate { min: 2000.0, max: 2400.0 },
            Self::Premium => BaseRate { min: 2600.0, max: 3200.0 },
        }
    }
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            Self::Low => 0.95,
            Self::Medium => 1.00,
            Self::High => 1.10,
        }
    }
}

impl Floors {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::G0 => "g0",
            Self::G1 => "g1",
            Self::G2 => "g2",
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            Self::G0 => 1.00,
            Self::G1 => 1.08,
            Self::G2 => 1.15,
        }
    }
}

impl FromStr for Specification {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            _ => Err(EstimateError::field("specification")),
        }
    }
}

impl FromStr for Location {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(EstimateError::field("location")),
        }
    }
}

impl FromStr for Floors {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g0" => Ok(Self::G0),
            "g1" => Ok(Self::G1),
            "g2" => Ok(Self::G2),
            _ => Err(EstimateError::field("floors")),
        }
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Floors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated estimator input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateInput {
    pub area: f64,
    pub specification: Specification,
    pub location: Location,
    pub floors: Floors,
}

impl EstimateInput {
    /// Validate raw fields in order: area, specification, location, floors.
    /// The first failing field is reported.
    pub fn parse(
        area: f64,
        specification: &str,
        location: &str,
        floors: &str,
    ) -> Result<Self, EstimateError> {
        if !area.is_finite() || !(MIN_AREA..=MAX_AREA).contains(&area) {
            return Err(EstimateError::field("area"));
        }

        Ok(Self {
            area,
            specification: specification.parse()?,
            location: location.parse()?,
            floors: floors.parse()?,
        })
    }

    /// Paid-tier cost range
    pub fn cost(&self) -> CostRange {
        let rate = self.specification.base_rate();
        let factor = self.location.factor();
        let floors = self.floors.factor();

        CostRange {
            min_cost: round_amount(self.area * rate.min * factor * floors),
            max_cost: round_amount(self.area * rate.max * factor * floors),
        }
    }
}

/// Estimated cost range in currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRange {
    pub min_cost: u64,
    pub max_cost: u64,
}

/// One cost category's share of the estimate range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    pub component: String,
    pub percentage: u32,
    pub min_amount: u64,
    pub max_amount: u64,
}

/// Cost categories in display order. Percentages sum to 100.
pub const BREAKDOWN_TABLE: [(&str, u32); 6] = [
    ("Foundation & Structure", 35),
    ("Masonry & Plastering", 20),
    ("Flooring & Finishing", 20),
    ("Electrical", 10),
    ("Plumbing", 8),
    ("Miscellaneous", 7),
];

/// Expected construction duration bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeline {
    Short,
    Long,
}

impl Timeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "6-8 months",
            Self::Long => "8-12 months",
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Timeline {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Validate raw input and compute the paid-tier cost range
pub fn calculate_cost(
    area: f64,
    specification: &str,
    location: &str,
    floors: &str,
) -> Result<CostRange, EstimateError> {
    EstimateInput::parse(area, specification, location, floors).map(|input| input.cost())
}

/// Split a cost range into the fixed category table
pub fn get_breakdown(min_cost: u64, max_cost: u64) -> Vec<BreakdownLine> {
    BREAKDOWN_TABLE
        .iter()
        .map(|&(component, percentage)| BreakdownLine {
            component: component.to_string(),
            percentage,
            min_amount: share(min_cost, percentage),
            max_amount: share(max_cost, percentage),
        })
        .collect()
}

pub fn get_timeline(area: f64) -> Timeline {
    if area <= TIMELINE_THRESHOLD {
        Timeline::Short
    } else {
        Timeline::Long
    }
}

fn share(amount: u64, percentage: u32) -> u64 {
    round_amount(amount as f64 * percentage as f64 / 100.0)
}

/// Round half-up. Inputs are never negative, so `f64::round` agrees.
pub(crate) fn round_amount(value: f64) -> u64 {
    value.round() as u64
}
