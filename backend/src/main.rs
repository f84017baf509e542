mod inference;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use inference::ModelProvider;
use routes::configure_routes;
use std::env;
use std::path::PathBuf;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let install_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        PathBuf::from(manifest_dir)
    } else {
        PathBuf::from("/usr/src/app")
    };
    let model_path = install_dir.join("models/final_model.pt");
    let static_dir = install_dir.join("static");

    // The artifact is loaded lazily on the first prediction request, so a
    // missing or slow-to-load model never blocks startup.
    let provider = web::Data::new(ModelProvider::new(model_path));
    log::info!("Model artifact path: {}", provider.artifact_path().display());
    if !provider.artifact_path().exists() {
        log::warn!("Model artifact is not present yet; /predict will fail until it appears.");
    }

    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let bind_address = format!("0.0.0.0:{}", port);
    log::info!("Starting server on {}", bind_address);

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
                    .max_age(3600),
            )
            .app_data(provider.clone())
            .configure(|cfg| {
                configure_routes(cfg, static_dir.to_string_lossy().into_owned())
            })
    })
    .bind(&bind_address)?
    .run()
    .await
}
