use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed look-back horizon over which price growth is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "7h")]
    SevenHours,
    #[serde(rename = "12h")]
    TwelveHours,
}

impl Horizon {
    /// Every horizon, shortest first.
    pub const ALL: [Horizon; 8] = [
        Horizon::FiveMinutes,
        Horizon::FifteenMinutes,
        Horizon::ThirtyMinutes,
        Horizon::OneHour,
        Horizon::TwoHours,
        Horizon::FourHours,
        Horizon::SevenHours,
        Horizon::TwelveHours,
    ];

    /// Short horizons used by the growth and consistency sub-scores.
    pub const SHORT: [Horizon; 4] = [
        Horizon::FiveMinutes,
        Horizon::FifteenMinutes,
        Horizon::ThirtyMinutes,
        Horizon::OneHour,
    ];

    /// Hourly horizons used by the trend-level consistency check.
    pub const HOURLY: [Horizon; 5] = [
        Horizon::OneHour,
        Horizon::TwoHours,
        Horizon::FourHours,
        Horizon::SevenHours,
        Horizon::TwelveHours,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::FiveMinutes => "5m",
            Horizon::FifteenMinutes => "15m",
            Horizon::ThirtyMinutes => "30m",
            Horizon::OneHour => "1h",
            Horizon::TwoHours => "2h",
            Horizon::FourHours => "4h",
            Horizon::SevenHours => "7h",
            Horizon::TwelveHours => "12h",
        }
    }

    /// Look-back length in minutes.
    pub fn minutes(&self) -> i64 {
        match self {
            Horizon::FiveMinutes => 5,
            Horizon::FifteenMinutes => 15,
            Horizon::ThirtyMinutes => 30,
            Horizon::OneHour => 60,
            Horizon::TwoHours => 120,
            Horizon::FourHours => 240,
            Horizon::SevenHours => 420,
            Horizon::TwelveHours => 720,
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentage growth per horizon. A missing horizon means no reference
/// price was available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrowthRates(BTreeMap<Horizon, f64>);

impl GrowthRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, horizon: Horizon) -> Option<f64> {
        self.0.get(&horizon).copied()
    }

    /// Set or clear the rate for a horizon.
    pub fn set(&mut self, horizon: Horizon, rate: Option<f64>) {
        match rate {
            Some(r) => {
                self.0.insert(horizon, r);
            }
            None => {
                self.0.remove(&horizon);
            }
        }
    }

    /// Defined rates, shortest horizon first.
    pub fn iter(&self) -> impl Iterator<Item = (Horizon, f64)> + '_ {
        self.0.iter().map(|(h, r)| (*h, *r))
    }

    /// Defined rates for the given horizons, in the order given.
    pub fn defined(&self, horizons: &[Horizon]) -> Vec<f64> {
        horizons.iter().filter_map(|h| self.get(*h)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Horizon, f64)> for GrowthRates {
    fn from_iter<I: IntoIterator<Item = (Horizon, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
