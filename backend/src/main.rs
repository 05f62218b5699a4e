mod classifier;
mod config;
mod error;
mod routes;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use classifier::ClassifierClient;
use config::GatewayConfig;
use routes::{configure_routes, UploadLimit};
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = GatewayConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let client = ClassifierClient::new(config.classifier_url.clone(), config.classifier_timeout)
        .map_err(|e| {
            log::error!("Failed to build classifier client: {}", e);
            std::io::Error::other(e.to_string())
        })?;

    log::info!("Forwarding predictions to {}", config.classifier_url);
    log::info!("Serving frontend from {}", config.frontend_dir.display());

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    let upload_limit = UploadLimit(config.max_upload_bytes);
    let frontend_dir = config.frontend_dir.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .expose_headers(vec![actix_web::http::header::HeaderName::from_static(
                        "x-request-id",
                    )])
                    .max_age(3600),
            )
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(upload_limit))
            .configure(|cfg| configure_routes(cfg, &frontend_dir))
    })
    .bind(&bind_address)?
    .run()
    .await
}
