mod cli;
mod demo;
mod infra;

use onboarding::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
