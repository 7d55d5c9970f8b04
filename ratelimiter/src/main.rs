use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use bucket_ratelimiter::{config::Args, rate_limiters::BucketRegistry, routes};
use clap::Parser;
use log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args
        .bucket_config()
        .context("Invalid rate limit configuration")?;
    let binding_address = args.binding_address();

    // One registry for every worker, so a client has a single bucket per process.
    let registry = web::Data::new(BucketRegistry::from_config(config));

    info!(
        "Listening on {binding_address} with capacity {} and refill rate {}/s ({:?} refill)",
        config.capacity(),
        config.refill_rate(),
        config.refill_policy()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(registry.clone())
            .configure(routes::configure)
    })
    .bind(&binding_address)
    .context("Failed to bind to port")?
    .run()
    .await
    .context("Failed to run the server")
}
