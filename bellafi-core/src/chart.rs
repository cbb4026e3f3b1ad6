//! Historical price series and the selectable chart ranges

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookback window for a historical price series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartRange {
    #[serde(rename = "1D")]
    OneDay,
    #[default]
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "All")]
    All,
}

impl ChartRange {
    /// Every range, in the order the range toggle shows them
    pub const ALL: [ChartRange; 6] = [
        ChartRange::OneDay,
        ChartRange::OneWeek,
        ChartRange::OneMonth,
        ChartRange::ThreeMonths,
        ChartRange::OneYear,
        ChartRange::All,
    ];

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1D",
            ChartRange::OneWeek => "1W",
            ChartRange::OneMonth => "1M",
            ChartRange::ThreeMonths => "3M",
            ChartRange::OneYear => "1Y",
            ChartRange::All => "All",
        }
    }

    /// Provider `days` query parameter
    pub fn days_param(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1",
            ChartRange::OneWeek => "7",
            ChartRange::OneMonth => "30",
            ChartRange::ThreeMonths => "90",
            ChartRange::OneYear => "365",
            ChartRange::All => "max",
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for ChartRange {
    type Err = String;

    /// Accepts either the label ("1Y") or the provider day code ("365")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ChartRange::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s) || r.days_param().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown chart range: {}", s))
    }
}

/// A single historical price sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

/// Ordered price samples for one (asset, range) pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new(points: Vec<ChartPoint>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> Option<&ChartPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ChartPoint> {
        self.points.last()
    }

    /// Absolute price change across the series
    pub fn change(&self) -> Option<Decimal> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some(last.price - first.price),
            _ => None,
        }
    }
}
