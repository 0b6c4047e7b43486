mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use aqi_credit::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
