pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;

use std::io;

use actix_web::{web, App, HttpServer};
use config::Config;
use log::info;
use service::{auth::jwt::JwtKeys, log::LoggerMiddleware};
use sqlx::{postgres::Postgres, Pool};

type PGPool = Pool<Postgres>;

#[actix_web::main]
async fn main() -> io::Result<()> {
    service::log::init_logger();

    let config = Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let pool: PGPool = db::init_db_pool(&config).await.map_err(io::Error::other)?;
    db::run_migrations(&pool).await.map_err(io::Error::other)?;

    let pool = web::Data::new(pool);
    let keys = web::Data::new(JwtKeys::new(&config.jwt_secret, config.token_ttl_secs));

    let cors_origin = config.cors_origin.clone();

    info!("listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        let pool = pool.clone();
        let keys = keys.clone();
        App::new()
            .wrap(handlers::cors(&cors_origin))
            .wrap(LoggerMiddleware)
            .configure(|cfg| handlers::configure(cfg, pool, keys))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
