use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use subscription_service::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::create_cors,
    repository::SeaOrmSubscriptionRepository,
    services::SubscriptionService,
    swagger::swagger_config,
};

fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let config = Config::load().context("Failed to load configuration")?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let repository = Arc::new(SeaOrmSubscriptionRepository::new(pool));
    let subscription_service = SubscriptionService::new(repository);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    // actix installs SIGINT/SIGTERM handlers and drains workers for shutdown_timeout seconds
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(web::Data::new(subscription_service.clone()))
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::subscription_config))
    })
    .shutdown_timeout(config.server.shutdown_timeout)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    log::info!("Server exited");
    Ok(())
}
