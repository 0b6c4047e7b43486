//! Prices pollution credits for land areas from live air quality readings.
//!
//! The [`pricing`] module holds the credit cost engine; [`providers`] and
//! [`quote`] connect it to the geocoding and air quality services and to HTTP.

pub mod config;
pub mod error;
pub mod pricing;
pub mod providers;
pub mod quote;
pub mod telemetry;
