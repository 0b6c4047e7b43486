use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::engine::CreditCostError;

/// One of the nine inputs feeding the weighted pollution index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Aqi,
    Co,
    No,
    No2,
    O3,
    So2,
    #[serde(rename = "pm2_5")]
    Pm25,
    Pm10,
    Nh3,
}

impl Dimension {
    pub const COUNT: usize = 9;

    pub const ALL: [Dimension; Self::COUNT] = [
        Dimension::Aqi,
        Dimension::Co,
        Dimension::No,
        Dimension::No2,
        Dimension::O3,
        Dimension::So2,
        Dimension::Pm25,
        Dimension::Pm10,
        Dimension::Nh3,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self.pollutant() {
            Some(pollutant) => pollutant.key(),
            None => "aqi",
        }
    }

    /// The pollutant behind this dimension, `None` for the AQI index.
    pub fn pollutant(self) -> Option<Pollutant> {
        match self {
            Dimension::Aqi => None,
            Dimension::Co => Some(Pollutant::Co),
            Dimension::No => Some(Pollutant::No),
            Dimension::No2 => Some(Pollutant::No2),
            Dimension::O3 => Some(Pollutant::O3),
            Dimension::So2 => Some(Pollutant::So2),
            Dimension::Pm25 => Some(Pollutant::Pm25),
            Dimension::Pm10 => Some(Pollutant::Pm10),
            Dimension::Nh3 => Some(Pollutant::Nh3),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A measured pollutant concentration, i.e. every dimension except the AQI index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    Co,
    No,
    No2,
    O3,
    So2,
    #[serde(rename = "pm2_5")]
    Pm25,
    Pm10,
    Nh3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 8] = [
        Pollutant::Co,
        Pollutant::No,
        Pollutant::No2,
        Pollutant::O3,
        Pollutant::So2,
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::Nh3,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Pollutant::Co => "co",
            Pollutant::No => "no",
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
            Pollutant::So2 => "so2",
            Pollutant::Pm25 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::Nh3 => "nh3",
        }
    }

    pub fn dimension(self) -> Dimension {
        match self {
            Pollutant::Co => Dimension::Co,
            Pollutant::No => Dimension::No,
            Pollutant::No2 => Dimension::No2,
            Pollutant::O3 => Dimension::O3,
            Pollutant::So2 => Dimension::So2,
            Pollutant::Pm25 => Dimension::Pm25,
            Pollutant::Pm10 => Dimension::Pm10,
            Pollutant::Nh3 => Dimension::Nh3,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pollutant '{0}'")]
pub struct UnknownPollutant(pub String);

impl FromStr for Pollutant {
    type Err = UnknownPollutant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = match value.trim().to_ascii_lowercase().as_str() {
            "pm25" | "pm2.5" => "pm2_5".to_string(),
            other => other.to_string(),
        };
        Pollutant::ALL
            .into_iter()
            .find(|pollutant| pollutant.key() == normalized)
            .ok_or_else(|| UnknownPollutant(value.to_string()))
    }
}

/// Ordinal AQI bucket reported by the air quality provider, 0 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AqiIndex(u8);

impl AqiIndex {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, CreditCostError> {
        if value > Self::MAX {
            return Err(CreditCostError::InvalidAqiIndex { value });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn category(self) -> AqiCategory {
        match self.0 {
            0 => AqiCategory::Good,
            1 => AqiCategory::Moderate,
            2 => AqiCategory::UnhealthySensitive,
            3 => AqiCategory::Unhealthy,
            4 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }
}

impl TryFrom<u8> for AqiIndex {
    type Error = CreditCostError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AqiIndex> for u8 {
    fn from(value: AqiIndex) -> Self {
        value.0
    }
}

/// Human readable severity bucket for an [`AqiIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "good",
            AqiCategory::Moderate => "moderate",
            AqiCategory::UnhealthySensitive => "unhealthy_sensitive",
            AqiCategory::Unhealthy => "unhealthy",
            AqiCategory::VeryUnhealthy => "very_unhealthy",
            AqiCategory::Hazardous => "hazardous",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The eight pollutant concentrations of a reading. Units follow the upstream
/// provider (µg/m³ for OpenWeather).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Concentrations {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

impl Concentrations {
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Co => self.co,
            Pollutant::No => self.no,
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
            Pollutant::So2 => self.so2,
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Nh3 => self.nh3,
        }
    }
}

/// AQI index plus concentrations; serializes flat as `{aqi, co, no, ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    pub aqi: AqiIndex,
    #[serde(flatten)]
    pub concentrations: Concentrations,
}

impl PollutantReading {
    pub fn new(aqi: AqiIndex, concentrations: Concentrations) -> Self {
        Self {
            aqi,
            concentrations,
        }
    }

    pub fn value(&self, dimension: Dimension) -> f64 {
        match dimension.pollutant() {
            Some(pollutant) => self.concentrations.get(pollutant),
            None => f64::from(self.aqi.get()),
        }
    }

    /// Raw values in [`Dimension::ALL`] order.
    pub fn profile(&self) -> [f64; Dimension::COUNT] {
        Dimension::ALL.map(|dimension| self.value(dimension))
    }

    /// Rejects negative or non-finite concentrations.
    pub fn validate(&self) -> Result<(), CreditCostError> {
        for pollutant in Pollutant::ALL {
            let value = self.concentrations.get(pollutant);
            if !value.is_finite() || value < 0.0 {
                return Err(CreditCostError::InvalidReading {
                    dimension: pollutant.dimension(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Monetary multiplier per unit of each pollutant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostPerUnitTable(BTreeMap<Pollutant, f64>);

impl CostPerUnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        [
            (Pollutant::Co, 100.0),
            (Pollutant::No, 150.0),
            (Pollutant::No2, 200.0),
            (Pollutant::O3, 80.0),
            (Pollutant::So2, 90.0),
            (Pollutant::Pm25, 120.0),
            (Pollutant::Pm10, 110.0),
            (Pollutant::Nh3, 70.0),
        ]
        .into_iter()
        .collect()
    }

    pub fn with(mut self, pollutant: Pollutant, cost: f64) -> Self {
        self.0.insert(pollutant, cost);
        self
    }

    pub fn insert(&mut self, pollutant: Pollutant, cost: f64) -> Option<f64> {
        self.0.insert(pollutant, cost)
    }

    pub fn remove(&mut self, pollutant: Pollutant) -> Option<f64> {
        self.0.remove(&pollutant)
    }

    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        self.0.get(&pollutant).copied()
    }

    /// The multiplier for `pollutant`, which must be present, finite and
    /// non-negative.
    pub fn require(&self, pollutant: Pollutant) -> Result<f64, CreditCostError> {
        let value = self
            .get(pollutant)
            .ok_or(CreditCostError::InvalidCostTable { pollutant })?;
        if !value.is_finite() || value < 0.0 {
            return Err(CreditCostError::InvalidCostPerUnit { pollutant, value });
        }
        Ok(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        self.0.iter().map(|(pollutant, cost)| (*pollutant, *cost))
    }
}

impl FromIterator<(Pollutant, f64)> for CostPerUnitTable {
    fn from_iter<T: IntoIterator<Item = (Pollutant, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CostTableParseError {
    #[error("expected `pollutant=cost`, found '{0}'")]
    MalformedEntry(String),
    #[error(transparent)]
    UnknownPollutant(#[from] UnknownPollutant),
    #[error("cost for {pollutant} must be a finite, non-negative number: '{raw}'")]
    InvalidCost { pollutant: Pollutant, raw: String },
}

impl FromStr for CostPerUnitTable {
    type Err = CostTableParseError;

    /// Parses `co=100,no=150,...`. Entries not listed are left out, so callers
    /// usually layer the result over [`CostPerUnitTable::standard`].
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut table = CostPerUnitTable::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (name, cost) = entry
                .split_once('=')
                .ok_or_else(|| CostTableParseError::MalformedEntry(entry.to_string()))?;
            let pollutant: Pollutant = name.parse()?;
            let invalid = || CostTableParseError::InvalidCost {
                pollutant,
                raw: cost.trim().to_string(),
            };
            let cost = cost.trim().parse::<f64>().map_err(|_| invalid())?;
            if !cost.is_finite() || cost < 0.0 {
                return Err(invalid());
            }
            table.insert(pollutant, cost);
        }
        Ok(table)
    }
}

/// Simplified supply/demand market model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketParameters {
    pub supply: f64,
    pub demand: f64,
    pub adjustment_factor: f64,
}

impl MarketParameters {
    pub fn standard() -> Self {
        Self {
            supply: 1000.0,
            demand: 800.0,
            adjustment_factor: 1.05,
        }
    }

    /// `(demand / supply) * adjustment_factor`. Every parameter must be finite
    /// and positive.
    pub fn influence(&self) -> Result<f64, CreditCostError> {
        for (parameter, value) in [
            ("supply", self.supply),
            ("demand", self.demand),
            ("adjustment_factor", self.adjustment_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CreditCostError::InvalidMarketParameters { parameter, value });
            }
        }
        Ok((self.demand / self.supply) * self.adjustment_factor)
    }
}

impl Default for MarketParameters {
    fn default() -> Self {
        Self::standard()
    }
}

/// Base monetary cost of a land area.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AreaCost(f64);

impl AreaCost {
    pub fn new(value: f64) -> Result<Self, CreditCostError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CreditCostError::InvalidAreaCost { value });
        }
        Ok(Self(value))
    }

    pub fn from_area(area_size: f64, rate_per_unit_area: f64) -> Result<Self, CreditCostError> {
        if !area_size.is_finite() || area_size <= 0.0 {
            return Err(CreditCostError::InvalidAreaCost { value: area_size });
        }
        Self::new(area_size * rate_per_unit_area)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Output pair of the credit cost engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreditCostResult {
    pub credit_cost: f64,
    pub adjusted_area_cost: f64,
}
