//! Request handling around the pricing engine: resolve the location, fetch the
//! current reading, price it, and expose the result over HTTP.

pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use router::{quote_router, AirQualityParams};
pub use service::{
    AirQualityReport, CreditQuote, CreditQuoteService, LocationQuery, QuoteError, QuoteRequest,
};
