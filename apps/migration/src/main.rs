//! Migration CLI tool.

use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // run_cli installs its own tracing subscriber.
    cli::run_cli(migration::Migrator).await;
}
