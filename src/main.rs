use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use taskforge::auth::revocation::spawn_purge_job;
use taskforge::{config::Config, db, routes, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        log::error!("{}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let pool = db::connect(&config.database_url, config.database_max_connections)
        .await
        .map_err(|e| {
            log::error!("failed to open database: {}", e);
            io::Error::new(io::ErrorKind::Other, e.to_string())
        })?;

    let state = web::Data::new(AppState::new(pool, &config));
    spawn_purge_job(state.ledger().clone(), config.revocation_purge_interval);

    log::info!("Starting TaskForge server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
