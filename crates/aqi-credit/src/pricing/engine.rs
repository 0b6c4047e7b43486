use serde::Serialize;

use super::domain::{
    AreaCost, CostPerUnitTable, CreditCostResult, Dimension, MarketParameters, Pollutant,
    PollutantReading,
};
use super::tables::{DimensionTable, REFERENCE_MAXIMA, STATIC_WEIGHTS};

/// Credit cost is scaled down by this factor, then by [`AREA_COST_PERCENT`],
/// before it perturbs the base area cost.
pub const CREDIT_COST_SCALE: f64 = 1_000_000.0;
pub const AREA_COST_PERCENT: f64 = 100.0;

/// Failure raised while pricing a reading.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CreditCostError {
    #[error("all nine readings are zero, so the dynamic weight profile is undefined")]
    InvalidWeightProfile,
    #[error("market {parameter} must be a finite number greater than zero (found {value})")]
    InvalidMarketParameters { parameter: &'static str, value: f64 },
    #[error("cost-per-unit table has no entry for {pollutant}")]
    InvalidCostTable { pollutant: Pollutant },
    #[error("cost per unit of {pollutant} must be a finite, non-negative number (found {value})")]
    InvalidCostPerUnit { pollutant: Pollutant, value: f64 },
    #[error("{dimension} reading must be a finite, non-negative number (found {value})")]
    InvalidReading { dimension: Dimension, value: f64 },
    #[error("aqi index must be between 0 and 5 (found {value})")]
    InvalidAqiIndex { value: u8 },
    #[error("area cost must be a finite, positive number (found {value})")]
    InvalidAreaCost { value: f64 },
    #[error("reference maximum for {dimension} must be a finite, positive number (found {value})")]
    InvalidReferenceMaximum { dimension: Dimension, value: f64 },
}

impl CreditCostError {
    /// Stable identifier for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            CreditCostError::InvalidWeightProfile => "invalid_weight_profile",
            CreditCostError::InvalidMarketParameters { .. } => "invalid_market_parameters",
            CreditCostError::InvalidCostTable { .. } => "invalid_cost_table",
            CreditCostError::InvalidCostPerUnit { .. } => "invalid_cost_per_unit",
            CreditCostError::InvalidReading { .. } => "invalid_reading",
            CreditCostError::InvalidAqiIndex { .. } => "invalid_aqi_index",
            CreditCostError::InvalidAreaCost { .. } => "invalid_area_cost",
            CreditCostError::InvalidReferenceMaximum { .. } => "invalid_reference_maximum",
        }
    }
}

/// Intermediate values of a pricing run alongside the result pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreditCostAssessment {
    pub weighted_pollution_index: f64,
    pub total_pollutant_cost: f64,
    pub market_influence: f64,
    #[serde(flatten)]
    pub result: CreditCostResult,
}

/// Converts pollutant readings into a credit cost and an adjusted area cost.
///
/// The engine only holds its two constant tables; every call works on its own
/// inputs, so a single instance can be shared freely across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditCostEngine {
    reference_maxima: DimensionTable,
    static_weights: DimensionTable,
}

impl Default for CreditCostEngine {
    fn default() -> Self {
        Self {
            reference_maxima: REFERENCE_MAXIMA,
            static_weights: STATIC_WEIGHTS,
        }
    }
}

impl CreditCostEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine for a different regulatory scale.
    pub fn with_tables(
        reference_maxima: DimensionTable,
        static_weights: DimensionTable,
    ) -> Result<Self, CreditCostError> {
        if let Some((dimension, value)) = reference_maxima
            .iter()
            .find(|(_, value)| !value.is_finite() || *value <= 0.0)
        {
            return Err(CreditCostError::InvalidReferenceMaximum { dimension, value });
        }

        Ok(Self {
            reference_maxima,
            static_weights,
        })
    }

    pub fn reference_maxima(&self) -> &DimensionTable {
        &self.reference_maxima
    }

    pub fn static_weights(&self) -> &DimensionTable {
        &self.static_weights
    }

    pub fn compute(
        &self,
        reading: &PollutantReading,
        market: &MarketParameters,
        cost_per_unit: &CostPerUnitTable,
        area_cost: AreaCost,
    ) -> Result<CreditCostResult, CreditCostError> {
        self.assess(reading, market, cost_per_unit, area_cost)
            .map(|assessment| assessment.result)
    }

    pub fn assess(
        &self,
        reading: &PollutantReading,
        market: &MarketParameters,
        cost_per_unit: &CostPerUnitTable,
        area_cost: AreaCost,
    ) -> Result<CreditCostAssessment, CreditCostError> {
        reading.validate()?;

        let raw = reading.profile();
        let weighted_pollution_index = self.weighted_pollution_index(&raw)?;
        let total_pollutant_cost = total_pollutant_cost(reading, cost_per_unit)?;
        let market_influence = market.influence()?;

        let credit_cost = weighted_pollution_index * total_pollutant_cost * market_influence;
        let adjusted_area_cost = adjust_area_cost(area_cost.value(), credit_cost);

        Ok(CreditCostAssessment {
            weighted_pollution_index,
            total_pollutant_cost,
            market_influence,
            result: CreditCostResult {
                credit_cost,
                adjusted_area_cost,
            },
        })
    }

    /// Readings divided by their reference maxima. Values above the maximum
    /// stay above 1.0.
    pub fn normalize(&self, raw: &[f64; Dimension::COUNT]) -> [f64; Dimension::COUNT] {
        Dimension::ALL
            .map(|dimension| raw[dimension.index()] / self.reference_maxima.get(dimension))
    }

    /// Dot product of (static weight - dynamic weight) with the normalized
    /// readings. A dimension that dominates the reading gets a smaller, possibly
    /// negative, delta.
    fn weighted_pollution_index(
        &self,
        raw: &[f64; Dimension::COUNT],
    ) -> Result<f64, CreditCostError> {
        let normalized = self.normalize(raw);
        let dynamic = dynamic_weights(raw)?;

        Ok(Dimension::ALL.iter().fold(0.0, |index, dimension| {
            let slot = dimension.index();
            let delta = self.static_weights.get(*dimension) - dynamic[slot];
            index + delta * normalized[slot]
        }))
    }
}

/// Raw readings divided by the largest of them, so the dominant dimension
/// weighs 1.0.
pub fn dynamic_weights(
    raw: &[f64; Dimension::COUNT],
) -> Result<[f64; Dimension::COUNT], CreditCostError> {
    let max = raw.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return Err(CreditCostError::InvalidWeightProfile);
    }
    Ok(raw.map(|value| value / max))
}

/// Sum of concentration times cost multiplier over the eight pollutants.
pub fn total_pollutant_cost(
    reading: &PollutantReading,
    cost_per_unit: &CostPerUnitTable,
) -> Result<f64, CreditCostError> {
    Pollutant::ALL.iter().try_fold(0.0, |total, pollutant| {
        let cost = cost_per_unit.require(*pollutant)?;
        Ok(total + reading.concentrations.get(*pollutant) * cost)
    })
}

pub fn adjust_area_cost(area_cost: f64, credit_cost: f64) -> f64 {
    let factor = credit_cost / CREDIT_COST_SCALE;
    area_cost + (area_cost * factor) / AREA_COST_PERCENT
}

/// Prices a reading with the standard reference tables.
pub fn compute(
    reading: &PollutantReading,
    market: &MarketParameters,
    cost_per_unit: &CostPerUnitTable,
    area_cost: AreaCost,
) -> Result<CreditCostResult, CreditCostError> {
    CreditCostEngine::default().compute(reading, market, cost_per_unit, area_cost)
}
