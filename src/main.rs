// teamcal-service/src/main.rs
use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use log::{error, info};
use teamcal_service::config::Config;
use teamcal_service::db::{open_db, open_db_in_memory, Database};
use teamcal_service::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    let opened = if config.uses_in_memory_database() {
        open_db_in_memory()
    } else {
        if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        open_db(&config.database_path)
    };
    let conn = opened.map_err(|e| {
        error!("❌ Failed to open database {}: {}", config.database_path, e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let db = web::Data::new(Database::new(conn));
    let address = config.bind_address.clone();
    let config = web::Data::new(config);

    info!("Server started at {}", address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(db.clone())
            .app_data(config.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind(address)?
    .run()
    .await
}
