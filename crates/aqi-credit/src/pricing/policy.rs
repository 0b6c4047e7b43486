use serde::{Deserialize, Serialize};

use super::domain::{AreaCost, CostPerUnitTable, MarketParameters};
use super::engine::CreditCostError;

/// Monetary rate applied per unit of land area (acre) when no override is configured.
pub const DEFAULT_RATE_PER_UNIT_AREA: f64 = 100.0;

/// Market model, cost table and area rate applied to every quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub market: MarketParameters,
    pub cost_per_unit: CostPerUnitTable,
    pub rate_per_unit_area: f64,
}

impl PricingPolicy {
    pub fn standard() -> Self {
        Self {
            market: MarketParameters::standard(),
            cost_per_unit: CostPerUnitTable::standard(),
            rate_per_unit_area: DEFAULT_RATE_PER_UNIT_AREA,
        }
    }

    pub fn area_cost(&self, area_size: f64) -> Result<AreaCost, CreditCostError> {
        AreaCost::from_area(area_size, self.rate_per_unit_area)
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_cost_uses_configured_rate() {
        let policy = PricingPolicy {
            rate_per_unit_area: 40.0,
            ..PricingPolicy::standard()
        };
        assert_eq!(policy.area_cost(3.0).expect("valid area").value(), 120.0);
    }

    #[test]
    fn negative_area_is_rejected() {
        assert_eq!(
            PricingPolicy::standard().area_cost(-1.0),
            Err(CreditCostError::InvalidAreaCost { value: -1.0 })
        );
    }
}
