use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use server::connection::ws_index;
use server::server::spawn_server;

fn allowed_origins() -> Vec<String> {
    match std::env::var("ALLOWED_ORIGINS") {
        Ok(v) => v
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => vec!["http://localhost:3000".to_string()],
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3001);
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
    let origins = allowed_origins();

    let srv_tx = spawn_server();

    log::info!("Listening on {}:{}", bind_addr, port);
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();
        for origin in &origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .data(srv_tx.clone())
            .route("/ws/", web::get().to(ws_index))
    })
    .bind(format!("{}:{}", bind_addr, port))?
    .run()
    .await
}
