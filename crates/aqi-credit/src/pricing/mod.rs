//! Credit cost pricing: turns nine pollutant readings and a market model into
//! a credit cost and an adjusted land-area cost. Pure arithmetic, no I/O.

pub mod domain;
pub mod engine;
pub mod policy;
pub mod tables;

pub use domain::{
    AqiCategory, AqiIndex, AreaCost, Concentrations, CostPerUnitTable, CostTableParseError,
    CreditCostResult, Dimension, MarketParameters, Pollutant, PollutantReading, UnknownPollutant,
};
pub use engine::{
    adjust_area_cost, compute, CreditCostAssessment, CreditCostEngine, CreditCostError,
};
pub use policy::{PricingPolicy, DEFAULT_RATE_PER_UNIT_AREA};
pub use tables::{DimensionTable, REFERENCE_MAXIMA, STATIC_WEIGHTS};
