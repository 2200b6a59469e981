mod cli;
mod demo;
mod images;
mod infra;
mod routes;
mod server;
mod users;

use adopet::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
