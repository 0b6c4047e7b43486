use crate::infra::build_service;
use aqi_credit::config::AppConfig;
use aqi_credit::error::AppError;
use aqi_credit::pricing::{
    AqiIndex, Concentrations, CreditCostAssessment, CreditCostEngine, PollutantReading,
    PricingPolicy,
};
use aqi_credit::quote::{CreditQuote, QuoteError, QuoteRequest};
use clap::{ArgGroup, Args};

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// AQI category index (0 good .. 5 hazardous)
    #[arg(long)]
    pub(crate) aqi: u8,
    /// Carbon monoxide concentration
    #[arg(long)]
    pub(crate) co: f64,
    /// Nitric oxide concentration
    #[arg(long)]
    pub(crate) no: f64,
    /// Nitrogen dioxide concentration
    #[arg(long)]
    pub(crate) no2: f64,
    /// Ozone concentration
    #[arg(long)]
    pub(crate) o3: f64,
    /// Sulfur dioxide concentration
    #[arg(long)]
    pub(crate) so2: f64,
    /// Fine particulate matter (<= 2.5µm) concentration
    #[arg(long = "pm2-5")]
    pub(crate) pm2_5: f64,
    /// Coarse particulate matter (<= 10µm) concentration
    #[arg(long)]
    pub(crate) pm10: f64,
    /// Ammonia concentration
    #[arg(long)]
    pub(crate) nh3: f64,
    /// Land area to price, in units of the configured area rate
    #[arg(long, default_value_t = 1.0)]
    pub(crate) area_size: f64,
    /// Override the configured market supply
    #[arg(long)]
    pub(crate) supply: Option<f64>,
    /// Override the configured market demand
    #[arg(long)]
    pub(crate) demand: Option<f64>,
    /// Override the configured market adjustment factor
    #[arg(long)]
    pub(crate) adjustment_factor: Option<f64>,
    /// Print the breakdown as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["location", "lat"])))]
pub(crate) struct LookupArgs {
    /// Place name to geocode
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Latitude of the position to look up
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the position to look up
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub(crate) lon: Option<f64>,
    /// Land area to price
    #[arg(long, default_value_t = 1.0)]
    pub(crate) area_size: f64,
}

impl QuoteArgs {
    fn reading(&self) -> Result<PollutantReading, QuoteError> {
        Ok(PollutantReading::new(
            AqiIndex::new(self.aqi)?,
            Concentrations {
                co: self.co,
                no: self.no,
                no2: self.no2,
                o3: self.o3,
                so2: self.so2,
                pm2_5: self.pm2_5,
                pm10: self.pm10,
                nh3: self.nh3,
            },
        ))
    }

    fn apply_overrides(&self, mut policy: PricingPolicy) -> PricingPolicy {
        if let Some(supply) = self.supply {
            policy.market.supply = supply;
        }
        if let Some(demand) = self.demand {
            policy.market.demand = demand;
        }
        if let Some(factor) = self.adjustment_factor {
            policy.market.adjustment_factor = factor;
        }
        policy
    }
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let policy = args.apply_overrides(config.pricing);
    let reading = args.reading()?;

    let assessment = assess(&reading, &policy, args.area_size)?;

    if args.json {
        let payload = serde_json::json!({
            "pollutants": reading,
            "category": reading.aqi.category(),
            "assessment": assessment,
        });
        println!("{payload:#}");
    } else {
        render_assessment(&reading, &assessment, args.area_size);
    }
    Ok(())
}

fn assess(
    reading: &PollutantReading,
    policy: &PricingPolicy,
    area_size: f64,
) -> Result<CreditCostAssessment, QuoteError> {
    let area_cost = policy.area_cost(area_size)?;
    Ok(CreditCostEngine::default().assess(
        reading,
        &policy.market,
        &policy.cost_per_unit,
        area_cost,
    )?)
}

pub(crate) async fn run_lookup(args: LookupArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config)?;

    let request = QuoteRequest {
        location: args.location,
        latitude: args.lat,
        longitude: args.lon,
        area_size: args.area_size,
    };
    let quote = service.quote(request).await?;
    render_quote(&quote);
    Ok(())
}

fn render_assessment(reading: &PollutantReading, assessment: &CreditCostAssessment, area_size: f64) {
    println!("Credit cost breakdown");
    println!(
        "AQI {} ({}), area size {}",
        reading.aqi.get(),
        reading.aqi.category(),
        area_size
    );
    println!(
        "- weighted pollution index: {:.6}",
        assessment.weighted_pollution_index
    );
    println!(
        "- total pollutant cost: {:.2}",
        assessment.total_pollutant_cost
    );
    println!("- market influence: {:.4}", assessment.market_influence);
    println!("- credit cost: {:.2}", assessment.result.credit_cost);
    println!(
        "- adjusted area cost: {:.6}",
        assessment.result.adjusted_area_cost
    );
}

fn render_quote(quote: &CreditQuote) {
    println!(
        "Air quality at ({:.4}, {:.4}): AQI {} ({})",
        quote.coordinates.latitude,
        quote.coordinates.longitude,
        quote.pollutants.aqi.get(),
        quote.category
    );

    let components = &quote.pollutants.concentrations;
    println!(
        "- co {} | no {} | no2 {} | o3 {} | so2 {} | pm2_5 {} | pm10 {} | nh3 {}",
        components.co,
        components.no,
        components.no2,
        components.o3,
        components.so2,
        components.pm2_5,
        components.pm10,
        components.nh3
    );
    println!(
        "Area {} -> base cost {:.2}, credit cost {:.2}, adjusted area cost {:.6}",
        quote.area_size, quote.original_credit_cost, quote.credit_cost, quote.adjusted_area_cost
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> QuoteArgs {
        QuoteArgs {
            aqi: 2,
            co: 300.0,
            no: 2.0,
            no2: 5.0,
            o3: 40.0,
            so2: 3.0,
            pm2_5: 12.0,
            pm10: 18.0,
            nh3: 2.0,
            area_size: 1.0,
            supply: None,
            demand: None,
            adjustment_factor: None,
            json: false,
        }
    }

    #[test]
    fn offline_quote_matches_reference_scenario() {
        let args = args();
        let policy = args.apply_overrides(PricingPolicy::standard());
        let reading = args.reading().expect("valid reading");

        let assessment = assess(&reading, &policy, args.area_size).expect("prices");
        assert!((assessment.result.credit_cost - 7_099_066.182_880_003).abs() < 1e-6);
    }

    #[test]
    fn overrides_replace_market_parameters() {
        let args = QuoteArgs {
            supply: Some(0.0),
            demand: Some(10.0),
            ..args()
        };
        let policy = args.apply_overrides(PricingPolicy::standard());
        assert_eq!(policy.market.demand, 10.0);

        let reading = args.reading().expect("valid reading");
        let error = assess(&reading, &policy, 1.0).expect_err("zero supply fails");
        assert_eq!(error.kind(), "invalid_market_parameters");
    }

    #[test]
    fn aqi_outside_scale_is_rejected() {
        let args = QuoteArgs { aqi: 7, ..args() };
        assert!(args.reading().is_err());
    }
}
