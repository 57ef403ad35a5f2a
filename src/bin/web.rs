//! Single binary web server: REST API for clan tournaments and their brackets.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT,
//! MAX_BRACKET_SIZE, BRACKET_SEED.

use actix_web::{web::Data, App, HttpServer};
use clan_bracket_web::api::{self, AppState};
use clan_bracket_web::config::AppConfig;
use clan_bracket_web::InMemoryStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let rng = match config.seed {
        Some(seed) => {
            log::info!("Seeding brackets deterministically (seed {})", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let state = Data::new(AppState {
        store: InMemoryStore::new(),
        rng: Mutex::new(rng),
        policy: config.policy(),
    });

    let bind = (config.host.as_str(), config.port);
    log::info!(
        "Starting server at http://{}:{} (max bracket size {})",
        bind.0,
        bind.1,
        config.max_bracket_size
    );

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(bind)?
        .run()
        .await
}
